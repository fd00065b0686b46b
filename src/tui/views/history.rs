// History view - paginated past questions with category filter

use crate::api::{Category, HistoryEntry};
use crate::format::{local_datetime, single_line, truncate_chars, truncate_width, ANSWER_PREVIEW_CHARS};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Display label for a category string the backend sent
fn category_label(raw: &str) -> String {
    match Category::parse(raw) {
        Some(category) => category.label().to_string(),
        None if raw.trim().is_empty() => Category::Unknown.label().to_string(),
        None => raw.to_string(),
    }
}

/// Badge only when the user gave feedback
fn feedback_badge(is_helpful: Option<bool>, theme: &Theme) -> Option<Span<'static>> {
    match is_helpful {
        Some(true) => Some(Span::styled(" 👍 helpful", Style::default().fg(theme.success))),
        Some(false) => Some(Span::styled(" 👎 not helpful", Style::default().fg(theme.warning))),
        None => None,
    }
}

fn entry_item(entry: &HistoryEntry, width: usize, theme: &Theme) -> ListItem<'static> {
    let mut meta = vec![
        Span::styled(
            format!("[{}] ", category_label(&entry.category)),
            Style::default().fg(theme.code),
        ),
        Span::styled(local_datetime(&entry.created_at), theme.muted_style()),
    ];
    meta.extend(feedback_badge(entry.is_helpful, theme));

    let question = Line::from(Span::styled(
        truncate_width(&single_line(&entry.question), width),
        Style::default().fg(theme.user).add_modifier(Modifier::BOLD),
    ));
    let preview = truncate_chars(&single_line(&entry.answer), ANSWER_PREVIEW_CHARS);
    let answer = Line::from(Span::styled(
        truncate_width(&preview, width),
        Style::default().fg(theme.fg),
    ));

    ListItem::new(vec![Line::from(meta), question, answer, Line::raw("")])
}

fn filter_line(app: &App) -> Line<'static> {
    let theme = &app.theme;
    let history = &app.store.history;
    let active = Style::default()
        .fg(theme.highlight)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let inactive = Style::default().fg(theme.fg);

    let mut spans = vec![Span::styled(" Category: ", theme.muted_style())];
    let options = std::iter::once(None).chain(Category::ALL.into_iter().map(Some));
    for (key, option) in options.enumerate() {
        let label = option.map(|c| c.label()).unwrap_or("All");
        let style = if history.category == option {
            active
        } else {
            inactive
        };
        spans.push(Span::styled(format!("{}:{}", key, label), style));
        spans.push(Span::raw("  "));
    }

    if history.pagination.total > 0 {
        spans.push(Span::styled(
            format!(
                "│ {} · page {}",
                history.pagination.range_label(),
                history.pagination.page()
            ),
            theme.muted_style(),
        ));
    }
    Line::from(spans)
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let history = &app.store.history;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);
    f.render_widget(Paragraph::new(filter_line(app)), chunks[0]);

    let arrows = match (history.pagination.has_prev(), history.pagination.has_next()) {
        (true, true) => " ← p  n → ",
        (true, false) => " ← p ",
        (false, true) => " n → ",
        (false, false) => "",
    };
    let title = if history.request.is_loading() {
        format!(" History {} ", app.spinner_char())
    } else {
        " History ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.border_style(true))
        .title(Span::styled(title, theme.title_style()))
        .title_bottom(Line::from(arrows).right_aligned());

    if history.entries.is_empty() {
        let text = if history.request.is_loading() {
            "Loading history…"
        } else if history.category.is_some() {
            "No questions in this category."
        } else {
            "No questions yet."
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, theme.muted_style())).block(block),
            chunks[1],
        );
        return;
    }

    let width = (area.width as usize).saturating_sub(4);
    let items: Vec<ListItem> = history
        .entries
        .iter()
        .map(|entry| entry_item(entry, width, theme))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.selected_bg))
        .highlight_symbol("▌ ");

    let mut state = ListState::default();
    state.select(app.history_sel.index());
    f.render_stateful_widget(list, chunks[1], &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels() {
        assert_eq!(category_label("git"), "Git");
        assert_eq!(category_label("PYTHON"), "Python");
        assert_eq!(category_label(""), "Unknown");
        assert_eq!(category_label("rust"), "rust");
    }

    #[test]
    fn badge_only_with_feedback() {
        let theme = Theme::default();
        assert!(feedback_badge(None, &theme).is_none());
        assert!(feedback_badge(Some(false), &theme).is_some());
    }
}
