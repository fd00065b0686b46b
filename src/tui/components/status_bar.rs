// Status bar component
//
// Renders the key hints for whatever has focus, a busy spinner and the
// last request failure of the current tab.

use crate::state::Tab;
use crate::tui::app::{App, ChatFocus};
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Key hints for the focused area, most important first
fn hints(app: &App) -> &'static str {
    match app.store.tab {
        Tab::Chat => match app.focus {
            ChatFocus::Input => "Enter send │ Esc messages │ ^R recent │ ^N new chat",
            ChatFocus::Messages => {
                "j/k select │ 1-9 use question │ b bookmark │ +/- feedback │ y copy │ s bookmarks │ i input"
            }
            ChatFocus::Bookmarks => "j/k select │ Enter open │ y copy │ d delete │ Esc back",
        },
        Tab::Sessions => "j/k select │ Enter open │ d delete │ r refresh",
        Tab::History => "j/k select │ n/p page │ c category │ Enter open │ y copy",
        Tab::Analytics => "r refresh",
    }
}

fn last_error(app: &App) -> Option<&str> {
    let store = &app.store;
    match store.tab {
        Tab::Chat => store.bookmarks.request.error(),
        Tab::Sessions => store.sessions.request.error(),
        Tab::History => store.history.request.error(),
        Tab::Analytics => store.analytics.request.error(),
    }
}

/// Render the status bar
///
/// Narrow terminals drop the global hints and keep only the focused ones.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let bp = Breakpoint::from_width(area.width);

    let mut spans = Vec::new();
    if app.is_busy() {
        spans.push(Span::styled(
            format!(" {} ", app.spinner_char()),
            Style::default().fg(theme.highlight),
        ));
    } else {
        spans.push(Span::raw(" "));
    }

    if let Some(error) = last_error(app) {
        spans.push(Span::styled(format!("⚠ {} │ ", error), theme.error_style()));
    }

    spans.push(Span::styled(
        hints(app),
        Style::default().fg(theme.status_bar),
    ));

    if bp.at_least(Breakpoint::Wide) {
        spans.push(Span::styled(
            " │ Tab switch │ ^T theme │ ^L logs │ ? help │ ^C quit",
            theme.muted_style(),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(theme.border_style(false)),
    );

    f.render_widget(status, area);
}
