// Views module - screen-level rendering logic
//
// Each tab is a full-screen experience within the TUI:
// - Chat: conversation, input line, bookmark sidebar
// - Sessions: stored conversations
// - History: paginated past questions
// - Analytics: usage cards
//
// This module lays out the shell and dispatches to the active tab.

mod analytics;
mod chat;
mod history;
mod modal;
mod sessions;

use super::app::App;
use crate::state::Tab;
use crate::tui::components;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::widgets::Block;
use ratatui::Frame;

/// Height of the logs panel when shown
const LOGS_HEIGHT: u16 = 8;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    f.render_widget(Block::default().style(app.theme.base_style()), f.area());

    let mut constraints = vec![Constraint::Length(3), Constraint::Min(8)];
    if app.show_logs {
        constraints.push(Constraint::Length(LOGS_HEIGHT));
    }
    constraints.push(Constraint::Length(2));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    components::render_title(f, chunks[0], app);

    let content = chunks[1];
    match app.store.tab {
        Tab::Chat => chat::render(f, content, app),
        Tab::Sessions => sessions::render(f, content, app),
        Tab::History => history::render(f, content, app),
        Tab::Analytics => analytics::render(f, content, app),
    }

    if app.show_logs {
        components::render_logs_panel(f, chunks[2], app);
    }
    components::render_status(f, chunks[chunks.len() - 1], app);

    // Take modal temporarily to avoid borrow conflict with app
    if let Some(mut modal_state) = app.modal.take() {
        modal::render(f, &mut modal_state, app);
        app.modal = Some(modal_state);
    }

    if let Some(id) = app.store.sessions.pending_delete {
        let title = app.store.sessions.title_of(id).unwrap_or("this session");
        modal::render_confirm_delete(f, title, &app.theme);
    }

    if let Some(notification) = app.store.notifications.front() {
        modal::render_notification(
            f,
            notification,
            app.store.notifications.len(),
            &app.theme,
        );
    }

    // Toast on top of everything
    if let Some(ref toast) = app.toast {
        toast.render(f, f.area(), &app.theme);
    }

    app.clear_expired_toast();
}
