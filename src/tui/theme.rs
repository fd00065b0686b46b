// Theme system for the TUI
//
// Color themes selectable from config (`theme = "Nord"`) and cycled at
// runtime with Ctrl+T. Each theme defines colors for every UI element.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
    Monokai,
    Dracula,
    Nord,
    Solarized,
}

impl ThemeKind {
    pub fn all() -> &'static [ThemeKind] {
        &[
            ThemeKind::Dark,
            ThemeKind::Light,
            ThemeKind::Monokai,
            ThemeKind::Dracula,
            ThemeKind::Nord,
            ThemeKind::Solarized,
        ]
    }

    /// Look up a theme by display name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn next(self) -> Self {
        let themes = Self::all();
        let current = themes.iter().position(|&t| t == self).unwrap_or(0);
        themes[(current + 1) % themes.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThemeKind::Dark => "Dark",
            ThemeKind::Light => "Light",
            ThemeKind::Monokai => "Monokai",
            ThemeKind::Dracula => "Dracula",
            ThemeKind::Nord => "Nord",
            ThemeKind::Solarized => "Solarized",
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            ThemeKind::Dark => Theme::dark(),
            ThemeKind::Light => Theme::light(),
            ThemeKind::Monokai => Theme::monokai(),
            ThemeKind::Dracula => Theme::dracula(),
            ThemeKind::Nord => Theme::nord(),
            ThemeKind::Solarized => Theme::solarized(),
        }
    }
}

/// Complete theme definition with all UI colors
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub border_type: BorderType,

    // Base colors
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    // Title and status
    pub title: Color,
    pub status_bar: Color,
    pub highlight: Color,

    // Selection
    pub selected_bg: Color,
    pub selected_fg: Color,

    // Conversation
    pub user: Color,
    pub assistant: Color,
    pub source: Color,
    pub link: Color,
    pub code: Color,

    // Feedback and notices
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    // Log levels
    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,

    // Analytics bars
    pub chart_primary: Color,
    pub chart_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: "Dark",
            border_type: BorderType::Rounded,

            bg: Color::Reset,
            fg: Color::White,
            muted: Color::DarkGray,
            border: Color::Gray,
            border_focused: Color::Cyan,

            title: Color::Cyan,
            status_bar: Color::Green,
            highlight: Color::Cyan,

            selected_bg: Color::DarkGray,
            selected_fg: Color::Yellow,

            user: Color::LightBlue,
            assistant: Color::Green,
            source: Color::Gray,
            link: Color::Cyan,
            code: Color::Yellow,

            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,

            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Blue,
            log_debug: Color::Gray,

            chart_primary: Color::Cyan,
            chart_secondary: Color::Magenta,
        }
    }

    pub fn light() -> Self {
        let goldenrod = Color::Rgb(184, 134, 11);
        Self {
            name: "Light",
            border_type: BorderType::Plain,

            bg: Color::White,
            fg: Color::Black,
            muted: Color::Gray,
            border: Color::DarkGray,
            border_focused: Color::Blue,

            title: Color::Blue,
            status_bar: Color::DarkGray,
            highlight: Color::Blue,

            selected_bg: Color::LightBlue,
            selected_fg: Color::Black,

            user: Color::Blue,
            assistant: Color::Rgb(0, 110, 60),
            source: Color::DarkGray,
            link: Color::Blue,
            code: Color::Magenta,

            success: Color::Green,
            warning: goldenrod,
            error: Color::Red,

            log_error: Color::Red,
            log_warn: goldenrod,
            log_info: Color::Blue,
            log_debug: Color::DarkGray,

            chart_primary: Color::Blue,
            chart_secondary: Color::Magenta,
        }
    }

    pub fn monokai() -> Self {
        let green = Color::Rgb(166, 226, 46);
        let cyan = Color::Rgb(102, 217, 239);
        let yellow = Color::Rgb(230, 219, 116);
        let pink = Color::Rgb(249, 38, 114);
        let purple = Color::Rgb(174, 129, 255);
        let comment = Color::Rgb(117, 113, 94);
        Self {
            name: "Monokai",
            border_type: BorderType::Rounded,

            bg: Color::Rgb(39, 40, 34),
            fg: Color::Rgb(248, 248, 242),
            muted: comment,
            border: comment,
            border_focused: green,

            title: green,
            status_bar: cyan,
            highlight: green,

            selected_bg: Color::Rgb(73, 72, 62),
            selected_fg: yellow,

            user: cyan,
            assistant: green,
            source: comment,
            link: cyan,
            code: yellow,

            success: green,
            warning: yellow,
            error: pink,

            log_error: pink,
            log_warn: yellow,
            log_info: cyan,
            log_debug: comment,

            chart_primary: cyan,
            chart_secondary: purple,
        }
    }

    pub fn dracula() -> Self {
        let cyan = Color::Rgb(139, 233, 253);
        let green = Color::Rgb(80, 250, 123);
        let yellow = Color::Rgb(241, 250, 140);
        let red = Color::Rgb(255, 85, 85);
        let purple = Color::Rgb(189, 147, 249);
        let pink = Color::Rgb(255, 121, 198);
        let comment = Color::Rgb(98, 114, 164);
        Self {
            name: "Dracula",
            border_type: BorderType::Rounded,

            bg: Color::Rgb(40, 42, 54),
            fg: Color::Rgb(248, 248, 242),
            muted: comment,
            border: Color::Rgb(68, 71, 90),
            border_focused: purple,

            title: cyan,
            status_bar: green,
            highlight: purple,

            selected_bg: Color::Rgb(68, 71, 90),
            selected_fg: yellow,

            user: cyan,
            assistant: green,
            source: comment,
            link: pink,
            code: Color::Rgb(255, 184, 108),

            success: green,
            warning: yellow,
            error: red,

            log_error: red,
            log_warn: yellow,
            log_info: cyan,
            log_debug: comment,

            chart_primary: cyan,
            chart_secondary: pink,
        }
    }

    pub fn nord() -> Self {
        let frost = Color::Rgb(136, 192, 208);
        let frost2 = Color::Rgb(129, 161, 193);
        let green = Color::Rgb(163, 190, 140);
        let yellow = Color::Rgb(235, 203, 139);
        let red = Color::Rgb(191, 97, 106);
        let purple = Color::Rgb(180, 142, 173);
        let grey = Color::Rgb(76, 86, 106);
        Self {
            name: "Nord",
            border_type: BorderType::Plain,

            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(236, 239, 244),
            muted: grey,
            border: grey,
            border_focused: frost,

            title: frost,
            status_bar: green,
            highlight: frost,

            selected_bg: Color::Rgb(67, 76, 94),
            selected_fg: yellow,

            user: frost2,
            assistant: green,
            source: grey,
            link: frost,
            code: purple,

            success: green,
            warning: yellow,
            error: red,

            log_error: red,
            log_warn: yellow,
            log_info: frost2,
            log_debug: grey,

            chart_primary: frost,
            chart_secondary: purple,
        }
    }

    /// Solarized dark
    pub fn solarized() -> Self {
        let blue = Color::Rgb(38, 139, 210);
        let cyan = Color::Rgb(42, 161, 152);
        let green = Color::Rgb(133, 153, 0);
        let yellow = Color::Rgb(181, 137, 0);
        let red = Color::Rgb(220, 50, 47);
        let magenta = Color::Rgb(211, 54, 130);
        let base01 = Color::Rgb(88, 110, 117);
        Self {
            name: "Solarized",
            border_type: BorderType::Plain,

            bg: Color::Rgb(0, 43, 54),
            fg: Color::Rgb(131, 148, 150),
            muted: base01,
            border: base01,
            border_focused: blue,

            title: blue,
            status_bar: green,
            highlight: blue,

            selected_bg: Color::Rgb(7, 54, 66),
            selected_fg: yellow,

            user: blue,
            assistant: cyan,
            source: base01,
            link: blue,
            code: magenta,

            success: green,
            warning: yellow,
            error: red,

            log_error: red,
            log_warn: yellow,
            log_info: blue,
            log_debug: base01,

            chart_primary: cyan,
            chart_secondary: magenta,
        }
    }

    // Style helpers

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Border style, brighter when the panel has focus
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in ThemeKind::all() {
            assert_eq!(ThemeKind::from_name(kind.name()), Some(*kind));
            assert_eq!(kind.theme().name, kind.name());
        }
        assert_eq!(ThemeKind::from_name("nord"), Some(ThemeKind::Nord));
        assert_eq!(ThemeKind::from_name("Spy Dark"), None);
    }

    #[test]
    fn cycle_wraps() {
        let mut kind = ThemeKind::Dark;
        for _ in 0..ThemeKind::all().len() {
            kind = kind.next();
        }
        assert_eq!(kind, ThemeKind::Dark);
    }
}
