// Modal system for TUI overlays
//
// Self-contained modal dialogs that handle their own input and return actions.
// App just holds Option<Modal>, input routing acts on returned ModalAction.
//
// Notifications and the delete confirmation are not modals here: they are
// driven by store state and take priority over whatever modal is open.

use crossterm::event::KeyCode;

use crate::tui::scroll::ScrollState;

/// Actions returned by modal input handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    Close,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollTop,
    ScrollBottom,
    /// Copy the modal body
    Copy,
}

/// Full text of a history entry or bookmark
#[derive(Debug, Clone)]
pub struct Detail {
    pub title: String,
    /// Markdown
    pub body: String,
    pub scroll: ScrollState,
}

/// Available modal types
#[derive(Debug, Clone)]
pub enum Modal {
    /// Keyboard shortcuts
    Help,
    Detail(Detail),
}

impl Modal {
    pub fn help() -> Self {
        Modal::Help
    }

    pub fn detail(title: impl Into<String>, body: impl Into<String>) -> Self {
        Modal::Detail(Detail {
            title: title.into(),
            body: body.into(),
            scroll: ScrollState::manual(),
        })
    }

    /// Handle keyboard input, return action for caller to execute
    pub fn handle_input(&mut self, key: KeyCode) -> ModalAction {
        match self {
            Modal::Help => match key {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => ModalAction::Close,
                _ => ModalAction::None,
            },
            Modal::Detail(_) => match key {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => ModalAction::Close,
                KeyCode::Up | KeyCode::Char('k') => ModalAction::ScrollUp,
                KeyCode::Down | KeyCode::Char('j') => ModalAction::ScrollDown,
                KeyCode::PageUp => ModalAction::PageUp,
                KeyCode::PageDown | KeyCode::Char(' ') => ModalAction::PageDown,
                KeyCode::Home | KeyCode::Char('g') => ModalAction::ScrollTop,
                KeyCode::End | KeyCode::Char('G') => ModalAction::ScrollBottom,
                KeyCode::Char('y') => ModalAction::Copy,
                _ => ModalAction::None,
            },
        }
    }

    /// Apply a scroll action to the modal's own scroll state
    pub fn scroll(&mut self, action: &ModalAction) {
        let Modal::Detail(detail) = self else {
            return;
        };
        match action {
            ModalAction::ScrollUp => detail.scroll.scroll_up(),
            ModalAction::ScrollDown => detail.scroll.scroll_down(),
            ModalAction::PageUp => detail.scroll.page_up(),
            ModalAction::PageDown => detail.scroll.page_down(),
            ModalAction::ScrollTop => detail.scroll.scroll_to_top(),
            ModalAction::ScrollBottom => detail.scroll.scroll_to_bottom(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_closes_on_question_mark() {
        let mut modal = Modal::help();
        assert_eq!(modal.handle_input(KeyCode::Char('?')), ModalAction::Close);
        assert_eq!(modal.handle_input(KeyCode::Char('j')), ModalAction::None);
    }

    #[test]
    fn detail_scrolls_within_bounds() {
        let mut modal = Modal::detail("Answer", "text");
        if let Modal::Detail(detail) = &mut modal {
            detail.scroll.update_dimensions(30, 10);
        }

        let action = modal.handle_input(KeyCode::Char('j'));
        assert_eq!(action, ModalAction::ScrollDown);
        modal.scroll(&action);
        modal.scroll(&ModalAction::ScrollBottom);

        let Modal::Detail(detail) = &modal else {
            panic!("expected detail modal");
        };
        assert_eq!(detail.scroll.offset(), 20);
        assert_eq!(modal.clone().handle_input(KeyCode::Char('y')), ModalAction::Copy);
    }
}
