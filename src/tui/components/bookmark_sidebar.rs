// Bookmark sidebar component
//
// Saved answers on top, recent questions below. Shown next to the chat on
// wide terminals, or in place of it when focused on a narrow one.

use crate::format::{single_line, truncate_width};
use crate::tui::app::{App, ChatFocus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Rows in the recent questions box, borders included
const RECENT_HEIGHT: u16 = 8;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let focused = app.focus == ChatFocus::Bookmarks;

    let show_recent = !app.store.chat.recent.is_empty() && area.height > RECENT_HEIGHT * 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(if show_recent {
            vec![Constraint::Min(4), Constraint::Length(RECENT_HEIGHT)]
        } else {
            vec![Constraint::Min(4)]
        })
        .split(area);

    // Room for the border and the "▶ " marker
    let text_width = (area.width as usize).saturating_sub(5);

    let bookmarks = &app.store.bookmarks.items;
    let items: Vec<ListItem> = if bookmarks.is_empty() {
        vec![ListItem::new(Span::styled(
            "No bookmarks yet. Press b on an answer.",
            theme.muted_style(),
        ))]
    } else {
        bookmarks
            .iter()
            .map(|b| {
                ListItem::new(Line::from(truncate_width(
                    &single_line(&b.content),
                    text_width,
                )))
            })
            .collect()
    };

    let title = if app.store.bookmarks.request.is_loading() {
        format!(" Bookmarks {} ", app.spinner_char())
    } else {
        format!(" Bookmarks ({}) ", bookmarks.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(theme.border_style(focused))
                .title(title),
        )
        .style(Style::default().fg(theme.fg))
        .highlight_style(theme.selected_style())
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if focused && !bookmarks.is_empty() {
        state.select(app.bookmark_sel.index());
    }
    f.render_stateful_widget(list, chunks[0], &mut state);

    if show_recent {
        let recent: Vec<ListItem> = app
            .store
            .chat
            .recent
            .iter()
            .map(|q| {
                ListItem::new(Span::styled(
                    truncate_width(q, text_width + 2),
                    theme.muted_style(),
                ))
            })
            .collect();
        let list = List::new(recent).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(theme.border_style(false))
                .title(" Recent (^R) "),
        );
        f.render_widget(list, chunks[1]);
    }
}
