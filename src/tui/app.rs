// TUI application state
//
// Wraps the `Store` with everything that only matters on screen: focus,
// list cursors, scroll positions, the open modal and the toast. State
// changes go through `dispatch`, which also hands the resulting commands
// to the runtime.

use super::clipboard;
use super::components::formatters::spinner;
use super::components::Toast;
use super::modal::Modal;
use super::scroll::{ScrollState, Selection};
use super::theme::{Theme, ThemeKind};
use crate::logging::LogBuffer;
use crate::runtime::Runtime;
use crate::state::chat::EXAMPLE_QUESTIONS;
use crate::state::{Action, Store, Tab};

/// Which part of the chat view receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatFocus {
    #[default]
    Input,
    Messages,
    Bookmarks,
}

/// Main application state for the TUI
pub struct App {
    pub store: Store,
    runtime: Runtime,

    pub theme_kind: ThemeKind,
    pub theme: Theme,
    /// Shown in the title bar
    pub api_url: String,

    pub focus: ChatFocus,
    pub message_sel: Selection,
    pub bookmark_sel: Selection,
    pub session_sel: Selection,
    pub history_sel: Selection,

    pub chat_scroll: ScrollState,
    /// First rendered line of each chat message, filled in by the chat view
    pub message_offsets: Vec<usize>,
    /// Bring the selected message into view on the next frame
    pub reveal_selection: bool,
    /// Position in the recent questions list while cycling with Ctrl+R
    recent_cursor: Option<usize>,

    pub modal: Option<Modal>,
    pub toast: Option<Toast>,

    pub log_buffer: LogBuffer,
    pub log_scroll: ScrollState,
    pub show_logs: bool,

    pub should_quit: bool,
    animation_frame: usize,
}

impl App {
    pub fn new(
        store: Store,
        runtime: Runtime,
        theme_kind: ThemeKind,
        api_url: impl Into<String>,
        log_buffer: LogBuffer,
    ) -> Self {
        Self {
            store,
            runtime,
            theme_kind,
            theme: theme_kind.theme(),
            api_url: api_url.into(),
            focus: ChatFocus::Input,
            message_sel: Selection::default(),
            bookmark_sel: Selection::default(),
            session_sel: Selection::default(),
            history_sel: Selection::default(),
            chat_scroll: ScrollState::new(),
            message_offsets: Vec::new(),
            reveal_selection: false,
            recent_cursor: None,
            modal: None,
            toast: None,
            log_buffer,
            log_scroll: ScrollState::new(),
            show_logs: false,
            should_quit: false,
            animation_frame: 0,
        }
    }

    /// Kick off the initial fetches
    pub fn startup(&mut self) {
        let commands = self.store.startup();
        self.runtime.spawn_all(commands);
    }

    /// Apply an action and run whatever it asks for
    pub fn dispatch(&mut self, action: Action) {
        let chat_len = self.store.chat.messages.len();
        let commands = self.store.dispatch(action);
        self.runtime.spawn_all(commands);

        // New messages arrived: follow them unless the user is reading
        if self.store.chat.messages.len() != chat_len && self.focus != ChatFocus::Messages {
            self.message_sel.clear();
            self.chat_scroll.scroll_to_bottom();
        }
        self.clamp_selections();
    }

    fn clamp_selections(&mut self) {
        self.message_sel.clamp(self.store.chat.messages.len());
        self.bookmark_sel.clamp(self.store.bookmarks.items.len());
        self.session_sel.clamp(self.store.sessions.sessions.len());
        self.history_sel.clamp(self.store.history.entries.len());
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        if self.store.tab != tab {
            self.dispatch(Action::SwitchTab(tab));
        }
    }

    /// Fresh conversation with the cursor in the input line
    pub fn new_chat(&mut self) {
        self.dispatch(Action::NewChat);
        self.focus = ChatFocus::Input;
        self.message_sel.clear();
        self.recent_cursor = None;
        self.chat_scroll.scroll_to_bottom();
    }

    /// Put a question into the input line and focus it
    pub fn use_question(&mut self, question: String) {
        self.dispatch(Action::UseQuestion(question));
        self.focus = ChatFocus::Input;
    }

    pub fn submit(&mut self) {
        self.recent_cursor = None;
        self.dispatch(Action::Submit);
    }

    /// Step through recent questions, most recent first, wrapping around
    pub fn cycle_recent(&mut self) {
        let recent = &self.store.chat.recent;
        if recent.is_empty() {
            return;
        }
        let next = match self.recent_cursor {
            Some(i) => (i + 1) % recent.len(),
            None => 0,
        };
        if let Some(question) = recent.get(next) {
            let question = question.to_string();
            self.store.chat.input.set(question);
            self.recent_cursor = Some(next);
        }
    }

    /// Only the greeting is on screen
    pub fn is_fresh_chat(&self) -> bool {
        self.store.chat.messages.len() <= 1 && self.store.chat.session_id.is_none()
    }

    /// The message number keys act on: the selection, else the last answer
    pub fn target_message(&self) -> Option<usize> {
        self.message_sel.index().or_else(|| {
            self.store
                .chat
                .messages
                .iter()
                .rposition(|m| m.is_assistant())
        })
    }

    /// Numbered suggestion `n` (1-based): example questions in a fresh chat,
    /// otherwise related questions of the target message
    pub fn suggestion(&self, n: usize) -> Option<String> {
        let index = n.checked_sub(1)?;
        if self.is_fresh_chat() {
            return EXAMPLE_QUESTIONS.get(index).map(|q| q.to_string());
        }
        let message = self.store.chat.messages.get(self.target_message()?)?;
        message.related_questions.get(index).cloned()
    }

    pub fn select_message(&mut self, down: bool) {
        let len = self.store.chat.messages.len();
        if down {
            self.message_sel.next(len);
        } else {
            self.message_sel.prev(len);
        }
        self.reveal_selection = true;
    }

    pub fn bookmark_target(&mut self) {
        if let Some(index) = self.target_message() {
            self.dispatch(Action::AddBookmark(index));
        }
    }

    pub fn feedback(&mut self, helpful: bool) {
        if let Some(index) = self.target_message() {
            self.dispatch(Action::Feedback { index, helpful });
        }
    }

    // Clipboard

    pub fn copy_target_message(&mut self) {
        let text = self
            .target_message()
            .and_then(|i| self.store.chat.messages.get(i))
            .map(|m| clipboard::with_sources(&m.content, &m.sources));
        if let Some(text) = text {
            self.copy(&text);
        }
    }

    pub fn copy_selected_bookmark(&mut self) {
        let text = self
            .bookmark_sel
            .index()
            .and_then(|i| self.store.bookmarks.get(i))
            .map(|b| clipboard::with_sources(&b.content, &b.sources));
        if let Some(text) = text {
            self.copy(&text);
        }
    }

    pub fn copy_selected_history(&mut self) {
        let text = self
            .history_sel
            .index()
            .and_then(|i| self.store.history.entries.get(i))
            .map(|e| format!("Q: {}\n\nA: {}", e.question, e.answer));
        if let Some(text) = text {
            self.copy(&text);
        }
    }

    pub fn copy(&mut self, text: &str) {
        match clipboard::copy_to_clipboard(text) {
            Ok(()) => self.show_toast("Copied to clipboard"),
            Err(e) => {
                tracing::warn!("Clipboard copy failed: {:#}", e);
                self.toast = Some(Toast::error("Clipboard unavailable"));
            }
        }
    }

    // Modals

    pub fn open_help(&mut self) {
        self.modal = Some(Modal::help());
    }

    pub fn open_history_detail(&mut self) {
        let entry = self
            .history_sel
            .index()
            .and_then(|i| self.store.history.entries.get(i));
        if let Some(entry) = entry {
            let body = format!(
                "**{}**\n\n{}",
                entry.question,
                crate::format::format_answer(&entry.answer)
            );
            self.modal = Some(Modal::detail(" History ", body));
        }
    }

    pub fn open_bookmark_detail(&mut self) {
        let bookmark = self
            .bookmark_sel
            .index()
            .and_then(|i| self.store.bookmarks.get(i));
        if let Some(bookmark) = bookmark {
            let body = clipboard::with_sources(
                &crate::format::format_answer(&bookmark.content),
                &bookmark.sources,
            );
            self.modal = Some(Modal::detail(" Bookmark ", body));
        }
    }

    // Appearance and shell

    pub fn cycle_theme(&mut self) {
        self.theme_kind = self.theme_kind.next();
        self.theme = self.theme_kind.theme();
        self.show_toast(format!("Theme: {}", self.theme_kind.name()));
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        if self.show_logs {
            self.log_scroll.scroll_to_bottom();
        }
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }

    pub fn tick_animation(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> &'static str {
        spinner(self.animation_frame)
    }

    /// Any request the current tab is waiting on
    pub fn is_busy(&self) -> bool {
        let store = &self.store;
        match store.tab {
            Tab::Chat => store.chat.request.is_loading() || store.bookmarks.request.is_loading(),
            Tab::Sessions => store.sessions.request.is_loading(),
            Tab::History => store.history.request.is_loading(),
            Tab::Analytics => store.analytics.request.is_loading(),
        }
    }
}
