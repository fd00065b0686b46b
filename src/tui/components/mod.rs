// Components module - reusable UI building blocks
//
// Shell components are rendered in every view:
// - Title bar: App name, tabs, backend URL
// - Status bar: Key hints, busy spinner, last failure
// - Logs panel: Captured log entries (toggled)
//
// Each component is a focused, single-responsibility module.

pub mod bookmark_sidebar;
pub mod formatters;
pub mod logs_panel;
pub mod scrollbar;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use toast::Toast;

use crate::tui::app::App;
use ratatui::{layout::Rect, Frame};

/// Render the title bar (convenience wrapper)
pub fn render_title(f: &mut Frame, area: Rect, app: &App) {
    title_bar::render(f, area, app);
}

/// Render the status bar (convenience wrapper)
pub fn render_status(f: &mut Frame, area: Rect, app: &App) {
    status_bar::render(f, area, app);
}

/// Render the logs panel (convenience wrapper)
pub fn render_logs_panel(f: &mut Frame, area: Rect, app: &mut App) {
    logs_panel::render(f, area, app);
}
