// Title bar component
//
// Renders the app name, the tab strip and the backend the client talks to.

use crate::state::Tab;
use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the title bar at the top of the screen
///
/// Shows:
/// - App name
/// - Tabs with their function keys, the active one highlighted
/// - API URL on wide terminals
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let bp = Breakpoint::from_width(area.width);

    let mut spans = vec![Span::styled(" pichat ", theme.title_style())];

    for tab in Tab::ALL {
        spans.push(Span::styled("│", theme.muted_style()));
        let label = if bp.at_least(Breakpoint::Normal) {
            format!(" F{} {} ", tab.index() + 1, tab.title())
        } else {
            format!(" {} ", tab.title())
        };
        let style = if tab == app.store.tab {
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.fg)
        };
        spans.push(Span::styled(label, style));
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.title))
        .title_top(Line::from(" ? ").right_aligned());

    if bp.at_least(Breakpoint::Wide) {
        block = block.title_bottom(
            Line::from(Span::styled(format!(" {} ", app.api_url), theme.muted_style()))
                .right_aligned(),
        );
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
