// Sessions view - stored conversations, newest first

use crate::format::{local_date, truncate_width};
use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Date plus message count column
const DETAIL_WIDTH: usize = 26;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let state = &app.store.sessions;
    let bp = Breakpoint::from_width(area.width);

    let title = if state.request.is_loading() {
        format!(" Sessions {} ", app.spinner_char())
    } else {
        format!(" Sessions ({}) ", state.sessions.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(theme.border_style(true))
        .title(Span::styled(title, theme.title_style()));

    if state.sessions.is_empty() {
        let text = if state.request.is_loading() {
            "Loading conversations…"
        } else {
            "No conversations yet. Ask something in the Chat tab."
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, theme.muted_style())).block(block),
            area,
        );
        return;
    }

    // Border plus highlight symbol
    let row_width = (area.width as usize).saturating_sub(4);
    let title_width = if bp.show_row_details() {
        row_width.saturating_sub(DETAIL_WIDTH)
    } else {
        row_width
    };

    let items: Vec<ListItem> = state
        .sessions
        .iter()
        .map(|session| {
            let name = if session.title.trim().is_empty() {
                "(untitled)".to_string()
            } else {
                truncate_width(&session.title, title_width)
            };
            let mut spans = vec![Span::styled(
                format!("{:<width$}", name, width = title_width),
                Style::default().fg(theme.fg),
            )];
            if bp.show_row_details() {
                let count = session.message_total();
                let noun = if count == 1 { "message" } else { "messages" };
                spans.push(Span::styled(
                    format!(" {}  {:>3} {}", local_date(&session.created_at), count, noun),
                    theme.muted_style(),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected_style())
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(app.session_sel.index());
    f.render_stateful_widget(list, area, &mut list_state);
}
