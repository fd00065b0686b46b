//! Logs panel component
//!
//! Shows the tail of the in-memory log buffer, toggled with Ctrl+L. Follows
//! new entries unless scrolled up with Shift+PageUp.

use super::scrollbar::{render_scrollbar, ScrollbarStyle};
use crate::logging::{LogEntry, LogLevel};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Format a log entry for display
fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "[{}] {:5} {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        entry.message
    )
}

/// Get color style for log level
fn log_level_style(level: &LogLevel, theme: &Theme) -> Style {
    match level {
        LogLevel::Error => Style::default()
            .fg(theme.log_error)
            .add_modifier(Modifier::BOLD),
        LogLevel::Warn => Style::default().fg(theme.log_warn),
        LogLevel::Info => Style::default().fg(theme.log_info),
        LogLevel::Debug | LogLevel::Trace => Style::default().fg(theme.log_debug),
    }
}

/// Render the logs panel from the shared buffer
pub fn render(f: &mut Frame, area: Rect, app: &mut App) {
    let height = area.height.saturating_sub(2) as usize;
    let entries = app.log_buffer.get_all();
    app.log_scroll.update_dimensions(entries.len(), height);

    let (start, end) = app.log_scroll.visible_range();
    let items: Vec<ListItem> = entries[start..end]
        .iter()
        .map(|entry| {
            ListItem::new(format_log_entry(entry)).style(log_level_style(&entry.level, &app.theme))
        })
        .collect();

    let title = if app.log_scroll.auto_follow {
        " Logs "
    } else {
        " Logs [scroll] "
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(app.theme.border_style(false))
            .title(title),
    );

    f.render_widget(list, area);
    render_scrollbar(
        f,
        area,
        &app.log_scroll,
        ScrollbarStyle::Minimal,
        app.theme.muted_style(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn entry_format() {
        let entry = LogEntry {
            timestamp: Local
                .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
                .single()
                .expect("valid time"),
            level: LogLevel::Warn,
            target: "pichat".to_string(),
            message: "Chat request failed".to_string(),
        };
        assert_eq!(
            format_log_entry(&entry),
            "[03:04:05] WARN  Chat request failed"
        );
    }
}
