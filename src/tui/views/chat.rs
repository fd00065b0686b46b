// Chat view
//
// Conversation on the left, bookmark sidebar on the right when the terminal
// is wide enough, input line at the bottom. Message lines are rebuilt each
// frame so wrapping always matches the current width.

use crate::api::{Message, Role};
use crate::format::{self, format_answer};
use crate::state::chat::EXAMPLE_QUESTIONS;
use crate::tui::app::{App, ChatFocus};
use crate::tui::components::bookmark_sidebar;
use crate::tui::components::scrollbar::{render_scrollbar, ScrollbarStyle};
use crate::tui::layout::Breakpoint;
use crate::tui::markdown;
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let bp = Breakpoint::from_width(area.width);

    // Narrow terminals show the sidebar instead of the conversation
    if bp.sidebar_width().is_none() && app.focus == ChatFocus::Bookmarks {
        bookmark_sidebar::render(f, area, app);
        return;
    }

    let (main, sidebar) = match bp.sidebar_width() {
        Some(width) => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(40), Constraint::Length(width)])
                .split(area);
            (chunks[0], Some(chunks[1]))
        }
        None => (area, None),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(main);

    render_messages(f, chunks[0], app);
    render_input(f, chunks[1], app);

    if let Some(sidebar) = sidebar {
        bookmark_sidebar::render(f, sidebar, app);
    }
}

fn role_header(message: &Message, selected: bool, theme: &Theme) -> Line<'static> {
    let (label, color) = match message.role {
        Role::User => ("You", theme.user),
        Role::Assistant => ("Assistant", theme.assistant),
    };
    let marker = if selected { "▶ " } else { "" };
    let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if selected {
        style = style.bg(theme.selected_bg);
    }
    let mut spans = vec![Span::styled(format!("{}{}", marker, label), style)];
    if message.is_assistant() && message.message_id.is_some() && selected {
        spans.push(Span::styled(
            "  b bookmark · +/- feedback · y copy",
            theme.muted_style(),
        ));
    }
    Line::from(spans)
}

fn source_lines(message: &Message, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    if message.sources.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![Line::from(Span::styled(
        "Sources",
        Style::default()
            .fg(theme.source)
            .add_modifier(Modifier::BOLD),
    ))];
    for (i, source) in message.sources.iter().enumerate() {
        let mut text = format!("[{}] {}", i + 1, format::single_line(&format::source_label(source)));
        if let Some(score) = format::relevance(source) {
            text.push(' ');
            text.push_str(&score);
        }
        lines.extend(markdown::render_plain(
            &text,
            width,
            Style::default().fg(theme.source),
        ));
        if let Some(url) = format::source_url(source) {
            lines.push(Line::from(Span::styled(
                format!("    ↗ {}", url),
                Style::default()
                    .fg(theme.link)
                    .add_modifier(Modifier::UNDERLINED),
            )));
        }
    }
    lines
}

fn numbered_questions<'a>(
    title: &str,
    questions: impl Iterator<Item = &'a str>,
    width: usize,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(theme.highlight)
            .add_modifier(Modifier::BOLD),
    ))];
    for (i, question) in questions.take(9).enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", i + 1), Style::default().fg(theme.code)),
            Span::styled(
                format::truncate_width(question, width.saturating_sub(3)),
                Style::default().fg(theme.fg),
            ),
        ]));
    }
    lines
}

/// All conversation lines plus the first line of each message
fn build_lines(app: &App, width: usize) -> (Vec<Line<'static>>, Vec<usize>) {
    let theme = &app.theme;
    let chat = &app.store.chat;
    let selected = match app.focus {
        ChatFocus::Messages => app.message_sel.index(),
        _ => None,
    };

    let mut lines = Vec::new();
    let mut offsets = Vec::with_capacity(chat.messages.len());

    for (i, message) in chat.messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::raw(""));
        }
        offsets.push(lines.len());
        lines.push(role_header(message, selected == Some(i), theme));

        match message.role {
            Role::User => lines.extend(markdown::render_plain(
                &message.content,
                width,
                Style::default().fg(theme.fg),
            )),
            Role::Assistant => lines.extend(markdown::render_markdown(
                &format_answer(&message.content),
                width,
                theme,
            )),
        }

        let sources = source_lines(message, width, theme);
        if !sources.is_empty() {
            lines.push(Line::raw(""));
            lines.extend(sources);
        }

        if !message.related_questions.is_empty() {
            lines.push(Line::raw(""));
            lines.extend(numbered_questions(
                "Related questions",
                message.related_questions.iter().map(String::as_str),
                width,
                theme,
            ));
        }
    }

    if app.is_fresh_chat() {
        lines.push(Line::raw(""));
        lines.extend(numbered_questions(
            "Try asking (press the number, or type your own)",
            EXAMPLE_QUESTIONS.iter().copied(),
            width,
            theme,
        ));
    }

    if chat.request.is_loading() {
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled(
                "Assistant ",
                Style::default()
                    .fg(theme.assistant)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} thinking…", app.spinner_char()),
                theme.muted_style(),
            ),
        ]));
    }

    (lines, offsets)
}

fn render_messages(f: &mut Frame, area: Rect, app: &mut App) {
    let focused = app.focus == ChatFocus::Messages;
    let inner_width = area.width.saturating_sub(4) as usize;
    let viewport = area.height.saturating_sub(2) as usize;

    let (lines, offsets) = build_lines(app, inner_width);
    app.chat_scroll.update_dimensions(lines.len(), viewport);
    if app.reveal_selection {
        if let Some(start) = app.message_sel.index().and_then(|i| offsets.get(i)) {
            app.chat_scroll.ensure_visible(*start);
        }
        app.reveal_selection = false;
    }
    app.message_offsets = offsets;

    let (start, end) = app.chat_scroll.visible_range();
    let visible: Vec<Line> = lines[start..end].to_vec();

    let title = match app.store.chat.session_id {
        Some(id) => {
            let name = app
                .store
                .sessions
                .title_of(id)
                .map(|t| format::truncate_width(t, 40))
                .unwrap_or_else(|| format!("#{}", id));
            format!(" Chat · {} ", name)
        }
        None => " Chat · new conversation ".to_string(),
    };

    let theme = &app.theme;
    let paragraph = Paragraph::new(visible).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.border_style(focused))
            .title(Span::styled(title, theme.title_style())),
    );
    f.render_widget(paragraph, area);
    render_scrollbar(
        f,
        area,
        &app.chat_scroll,
        ScrollbarStyle::Minimal,
        Style::default().fg(theme.border_focused),
    );
}

/// Slice of the input that fits `width` columns with the cursor visible,
/// and the cursor column within it
fn visible_input(text: &str, cursor: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let col = |range: &[char]| -> usize { range.iter().map(|c| c.width().unwrap_or(0)).sum() };

    let mut start = 0;
    while start < cursor && col(&chars[start..cursor]) >= width.max(1) {
        start += 1;
    }

    let mut shown = String::new();
    let mut used = 0;
    for ch in &chars[start..] {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        shown.push(*ch);
        used += w;
    }
    (shown, col(&chars[start..cursor]))
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let focused = app.focus == ChatFocus::Input;
    let input = &app.store.chat.input;
    let width = area.width.saturating_sub(2) as usize;

    let title = if app.store.chat.request.is_loading() {
        " Waiting for answer… "
    } else {
        " Ask a question "
    };

    let (text, cursor_col) = visible_input(input.text(), input.cursor(), width.saturating_sub(1));
    let content = if text.is_empty() && !focused {
        Line::from(Span::styled("Press i to type", theme.muted_style()))
    } else {
        Line::from(Span::styled(text, Style::default().fg(theme.fg)))
    };

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.border_style(focused))
            .title(title),
    );
    f.render_widget(paragraph, area);

    if focused {
        f.set_cursor_position((area.x + 1 + cursor_col as u16, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_shown_whole() {
        assert_eq!(visible_input("git add", 3, 20), ("git add".to_string(), 3));
    }

    #[test]
    fn long_input_scrolls_to_cursor() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let (shown, col) = visible_input(text, 26, 10);
        assert!(shown.ends_with('z'));
        assert!(col <= 10);
        assert_eq!(&text[26 - col..], &shown[..col]);
    }
}
