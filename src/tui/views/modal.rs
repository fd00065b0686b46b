// Modal overlay rendering
//
// Overlays are rendered on top of the main content:
// - Help modal: keyboard shortcuts and current theme
// - Detail modal: full text of a history entry or bookmark
// - Delete confirmation for a session
// - Notification popup for the front of the notification queue

use crate::state::notify::{Level, Notification};
use crate::tui::app::App;
use crate::tui::components::scrollbar::{render_scrollbar, ScrollbarStyle};
use crate::tui::markdown;
use crate::tui::modal::{Detail, Modal};
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render a modal dialog as a centered overlay
pub fn render(f: &mut Frame, modal: &mut Modal, app: &App) {
    match modal {
        Modal::Help => render_help(f, app),
        Modal::Detail(detail) => render_detail(f, detail, &app.theme),
    }
}

/// Calculate centered rect for modal dialog
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Render the help modal overlay
fn render_help(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let key_style = Style::default().fg(theme.code);
    let desc_style = Style::default().fg(theme.fg);
    let header_style = Style::default()
        .fg(theme.highlight)
        .add_modifier(Modifier::BOLD);

    // "    key         description"
    let kb = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<12}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled("  Tabs", header_style)),
        kb("Tab/S-Tab", "Next / previous tab"),
        kb("F1-F4", "Chat, Sessions, History, Analytics"),
        kb("F5", "Refresh current tab"),
        Line::raw(""),
        Line::from(Span::styled("  Chat input", header_style)),
        kb("Enter", "Send question"),
        kb("Ctrl+R", "Cycle recent questions"),
        kb("Ctrl+W/U", "Delete word / clear line"),
        kb("Ctrl+N", "New chat"),
        kb("Esc", "Focus messages"),
        Line::raw(""),
        Line::from(Span::styled("  Chat messages", header_style)),
        kb("j/k", "Select message"),
        kb("1-9", "Use example / related question"),
        kb("b", "Bookmark answer"),
        kb("+ / -", "Helpful / not helpful"),
        kb("y", "Copy answer with sources"),
        kb("s", "Focus bookmarks"),
        kb("i, Enter", "Back to input"),
        Line::raw(""),
        Line::from(Span::styled("  Lists", header_style)),
        kb("j/k, ↑/↓", "Select"),
        kb("Enter", "Open"),
        kb("d", "Delete session / bookmark"),
        kb("n/p, ←/→", "History page"),
        kb("c, 0-4", "History category"),
        Line::raw(""),
        Line::from(Span::styled("  General", header_style)),
        kb("Ctrl+T", "Cycle theme"),
        kb("Ctrl+L", "Toggle logs"),
        kb("Ctrl+O", "Log out"),
        kb("?", "Toggle this help"),
        kb("Ctrl+C, q", "Quit"),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Theme: ", desc_style),
            Span::styled(theme.name, key_style),
        ]),
    ]);

    let height = content.lines.len() as u16 + 2;
    let area = centered_rect(52, height, f.area());
    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(content)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.highlight))
                .border_type(theme.border_type)
                .title(" Help ")
                .title_bottom(Line::from(" Press ? or Esc to close ").centered()),
        );

    f.render_widget(paragraph, area);
}

/// Render the detail modal: markdown with vertical scroll
fn render_detail(f: &mut Frame, detail: &mut Detail, theme: &Theme) {
    // Nearly full screen
    let frame_area = f.area();
    let width = (frame_area.width * 90 / 100).max(40);
    let height = (frame_area.height * 85 / 100).max(10);
    let area = centered_rect(width, height, frame_area);
    f.render_widget(Clear, area);

    let viewport_height = area.height.saturating_sub(2) as usize;
    let viewport_width = area.width.saturating_sub(3) as usize;

    let lines = markdown::render_markdown(&detail.body, viewport_width, theme);
    let total_lines = lines.len();
    detail.scroll.update_dimensions(total_lines, viewport_height);
    let offset = detail.scroll.offset();

    let scroll_info = if total_lines > viewport_height {
        format!(" ({}/{}) ", offset + 1, total_lines)
    } else {
        String::new()
    };

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(theme.fg).bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.highlight))
                .title(format!("{}{}", detail.title, scroll_info))
                .title_bottom(Line::from(" j/k scroll │ y copy │ Esc close ").centered()),
        )
        .scroll((offset as u16, 0));

    f.render_widget(paragraph, area);
    render_scrollbar(
        f,
        area,
        &detail.scroll,
        ScrollbarStyle::Arrows,
        Style::default().fg(theme.highlight),
    );
}

/// Yes/no prompt before a session is deleted
pub fn render_confirm_delete(f: &mut Frame, title: &str, theme: &Theme) {
    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled(
            "Delete this conversation?",
            Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(title.to_string(), theme.muted_style())),
        Line::raw(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(theme.error)),
            Span::styled(" delete   ", Style::default().fg(theme.fg)),
            Span::styled("n", Style::default().fg(theme.highlight)),
            Span::styled(" keep", Style::default().fg(theme.fg)),
        ]),
    ]);

    let area = centered_rect(48, 7, f.area());
    f.render_widget(Clear, area);
    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.error))
                .title(" Delete session "),
        );
    f.render_widget(paragraph, area);
}

/// The front notification; must be dismissed before anything else
pub fn render_notification(
    f: &mut Frame,
    notification: &Notification,
    pending: usize,
    theme: &Theme,
) {
    let (title, accent) = match notification.level {
        Level::Info => (" Notice ", theme.success),
        Level::Error => (" Error ", theme.error),
    };
    let hint = if pending > 1 {
        format!(" Enter to dismiss ({} more) ", pending - 1)
    } else {
        " Enter to dismiss ".to_string()
    };

    let width = 56.min(f.area().width.saturating_sub(4));
    let text_lines = markdown::render_plain(
        &notification.text,
        width.saturating_sub(4) as usize,
        Style::default().fg(theme.fg),
    );
    let height = text_lines.len() as u16 + 4;

    let mut lines = vec![Line::raw("")];
    lines.extend(text_lines);

    let area = centered_rect(width, height, f.area());
    f.render_widget(Clear, area);
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(accent))
                .title(title)
                .title_bottom(Line::from(hint).centered()),
        );
    f.render_widget(paragraph, area);
}
