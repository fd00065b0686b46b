// Application state container
//
// All view state lives in `Store`. User intents and API results both arrive
// as `Action`s; `dispatch` updates state and returns the `Command`s (API
// calls) to run. Commands are executed elsewhere and report back as Actions,
// so nothing here does I/O.

pub mod analytics;
pub mod bookmarks;
pub mod chat;
pub mod history;
pub mod input;
pub mod notify;
pub mod request;
pub mod sessions;

use crate::api::{
    AnalyticsSnapshot, Bookmark, BookmarkId, Category, ChatReply, HistoryPage, HistoryQuery,
    Message, MessageId, Session, SessionId, Source,
};

use analytics::AnalyticsState;
use bookmarks::BookmarksState;
use chat::ChatState;
use history::HistoryState;
use notify::NotificationQueue;
use sessions::SessionsState;

/// Top-level views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Chat,
    Sessions,
    History,
    Analytics,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Chat, Tab::Sessions, Tab::History, Tab::Analytics];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Sessions => "Sessions",
            Tab::History => "History",
            Tab::Analytics => "Analytics",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Chat => 0,
            Tab::Sessions => 1,
            Tab::History => 2,
            Tab::Analytics => 3,
        }
    }

    pub fn next(&self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// API work requested by a state change
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SendChat {
        message: String,
        session_id: Option<SessionId>,
        generation: u64,
    },
    FetchSessions,
    LoadSession(SessionId),
    DeleteSession(SessionId),
    FetchHistory(HistoryQuery),
    FetchAnalytics {
        days: u32,
    },
    FetchBookmarks,
    AddBookmark {
        content: String,
        sources: Vec<Source>,
    },
    DeleteBookmark(BookmarkId),
    SendFeedback {
        message_id: MessageId,
        helpful: bool,
    },
    Logout,
}

/// Everything that can change the state
///
/// API results carry the failure as a short display string.
#[derive(Debug, Clone)]
pub enum Action {
    // User intents
    SwitchTab(Tab),
    Refresh,
    Submit,
    NewChat,
    UseQuestion(String),
    LoadSession(SessionId),
    RequestDeleteSession(SessionId),
    ConfirmDelete,
    CancelDelete,
    NextPage,
    PrevPage,
    CycleCategory,
    SetCategory(Option<Category>),
    /// Bookmark the chat message at this index
    AddBookmark(usize),
    DeleteBookmark(BookmarkId),
    /// Rate the chat message at this index
    Feedback {
        index: usize,
        helpful: bool,
    },
    DismissNotification,
    Logout,

    // API results
    ChatReplied {
        generation: u64,
        result: Result<ChatReply, String>,
    },
    SessionsLoaded(Result<Vec<Session>, String>),
    SessionLoaded {
        id: SessionId,
        result: Result<Session, String>,
    },
    SessionDeleted {
        id: SessionId,
        result: Result<(), String>,
    },
    HistoryLoaded {
        query: HistoryQuery,
        result: Result<HistoryPage, String>,
    },
    AnalyticsLoaded(Result<AnalyticsSnapshot, String>),
    BookmarksLoaded(Result<Vec<Bookmark>, String>),
    BookmarkAdded(Result<(), String>),
    BookmarkDeleted(Result<(), String>),
    FeedbackSent {
        helpful: bool,
        result: Result<(), String>,
    },
    LoggedOut(Result<(), String>),
}

/// Sizes and windows the views use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    pub history_page_size: u64,
    pub analytics_days: u32,
    pub recent_questions: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            history_page_size: 20,
            analytics_days: 30,
            recent_questions: 10,
        }
    }
}

pub struct Store {
    pub tab: Tab,
    pub chat: ChatState,
    pub sessions: SessionsState,
    pub history: HistoryState,
    pub analytics: AnalyticsState,
    pub bookmarks: BookmarksState,
    pub notifications: NotificationQueue,
}

impl Store {
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            tab: Tab::Chat,
            chat: ChatState::new(settings.recent_questions),
            sessions: SessionsState::default(),
            history: HistoryState::new(settings.history_page_size),
            analytics: AnalyticsState::new(settings.analytics_days),
            bookmarks: BookmarksState::default(),
            notifications: NotificationQueue::default(),
        }
    }

    /// Commands to run once when the UI comes up
    pub fn startup(&mut self) -> Vec<Command> {
        vec![self.bookmarks.fetch()]
    }

    /// Fetch whatever the given tab shows
    fn activate(&mut self, tab: Tab) -> Vec<Command> {
        match tab {
            Tab::Chat => Vec::new(),
            Tab::Sessions => vec![self.sessions.fetch()],
            Tab::History => vec![self.history.fetch()],
            Tab::Analytics => vec![self.analytics.fetch()],
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::SwitchTab(tab) => {
                self.tab = tab;
                self.activate(tab)
            }
            Action::Refresh => match self.tab {
                Tab::Chat => vec![self.bookmarks.fetch()],
                tab => self.activate(tab),
            },

            // Chat
            Action::Submit => {
                let text = self.chat.input.text().to_string();
                self.chat.submit(&text).into_iter().collect()
            }
            Action::NewChat => {
                self.chat.new_chat();
                self.tab = Tab::Chat;
                Vec::new()
            }
            Action::UseQuestion(question) => {
                self.chat.use_question(&question);
                self.tab = Tab::Chat;
                Vec::new()
            }
            Action::ChatReplied { generation, result } => {
                self.chat.apply_reply(generation, result);
                Vec::new()
            }

            // Sessions
            Action::LoadSession(id) => vec![self.sessions.load(id)],
            Action::SessionLoaded { id, result } => {
                match result {
                    Ok(session) => {
                        let messages: Vec<Message> =
                            session.messages.into_iter().map(Message::from).collect();
                        tracing::info!(session_id = %id, messages = messages.len(), "Session loaded");
                        self.chat.load_session(id, messages);
                        self.tab = Tab::Chat;
                    }
                    Err(e) => {
                        tracing::warn!(session_id = %id, "Failed to load session: {}", e);
                        self.notifications.error("Failed to load session.");
                    }
                }
                Vec::new()
            }
            Action::RequestDeleteSession(id) => {
                self.sessions.request_delete(id);
                Vec::new()
            }
            Action::ConfirmDelete => self.sessions.confirm().into_iter().collect(),
            Action::CancelDelete => {
                self.sessions.cancel();
                Vec::new()
            }
            Action::SessionDeleted { id, result } => match result {
                Ok(()) => {
                    tracing::info!(session_id = %id, "Session deleted");
                    // The open conversation no longer exists on the server
                    if self.chat.session_id == Some(id) {
                        self.chat.new_chat();
                    }
                    vec![self.sessions.fetch()]
                }
                Err(e) => {
                    tracing::warn!(session_id = %id, "Failed to delete session: {}", e);
                    self.notifications.error("Failed to delete session.");
                    Vec::new()
                }
            },
            Action::SessionsLoaded(result) => {
                self.sessions.apply_list(result);
                Vec::new()
            }

            // History
            Action::NextPage => self.history.next_page().into_iter().collect(),
            Action::PrevPage => self.history.prev_page().into_iter().collect(),
            Action::CycleCategory => vec![self.history.cycle_category()],
            Action::SetCategory(category) => vec![self.history.set_category(category)],
            Action::HistoryLoaded { query, result } => {
                self.history.apply(query, result);
                Vec::new()
            }

            // Analytics
            Action::AnalyticsLoaded(result) => {
                self.analytics.apply(result);
                Vec::new()
            }

            // Bookmarks
            Action::AddBookmark(index) => self
                .chat
                .messages
                .get(index)
                .and_then(|message| self.bookmarks.add(message))
                .into_iter()
                .collect(),
            Action::DeleteBookmark(id) => vec![self.bookmarks.delete(id)],
            Action::BookmarksLoaded(result) => {
                self.bookmarks.apply_list(result);
                Vec::new()
            }
            Action::BookmarkAdded(result) => match result {
                Ok(()) => {
                    self.notifications.info("Added to bookmarks.");
                    vec![self.bookmarks.fetch()]
                }
                Err(e) => {
                    tracing::warn!("Failed to add bookmark: {}", e);
                    self.notifications.error("Failed to add bookmark.");
                    Vec::new()
                }
            },
            Action::BookmarkDeleted(result) => match result {
                Ok(()) => vec![self.bookmarks.fetch()],
                Err(e) => {
                    tracing::warn!("Failed to delete bookmark: {}", e);
                    self.notifications.error("Failed to delete bookmark.");
                    Vec::new()
                }
            },

            // Feedback
            Action::Feedback { index, helpful } => {
                let target = self
                    .chat
                    .messages
                    .get(index)
                    .filter(|m| m.is_assistant())
                    .and_then(|m| m.message_id);
                match target {
                    Some(message_id) => vec![Command::SendFeedback {
                        message_id,
                        helpful,
                    }],
                    None => {
                        tracing::debug!(index, "Message has no id, feedback not sent");
                        Vec::new()
                    }
                }
            }
            Action::FeedbackSent { helpful, result } => {
                match result {
                    Ok(()) if helpful => self.notifications.info("Saved your feedback: helpful."),
                    Ok(()) => self.notifications.info("Saved your feedback."),
                    Err(e) => {
                        tracing::warn!("Failed to save feedback: {}", e);
                        self.notifications.error("Failed to save feedback.");
                    }
                }
                Vec::new()
            }

            Action::DismissNotification => {
                self.notifications.dismiss();
                Vec::new()
            }

            // Logout
            Action::Logout => vec![Command::Logout],
            Action::LoggedOut(result) => {
                self.reset();
                match result {
                    Ok(()) => self
                        .notifications
                        .info("Logged out. Run `pichat login` to sign in again."),
                    Err(e) => self.notifications.error(format!(
                        "Logged out, but the stored credentials could not be removed: {}",
                        e
                    )),
                }
                Vec::new()
            }
        }
    }

    /// Forget everything fetched for the previous user
    fn reset(&mut self) {
        self.chat.new_chat();
        self.sessions.clear();
        self.history.clear();
        self.analytics.clear();
        self.bookmarks.clear();
        self.tab = Tab::Chat;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatData, SessionMessage, Role};
    use chrono::Utc;

    fn store() -> Store {
        Store::new(StoreSettings::default())
    }

    fn stored_session(id: i64) -> Session {
        Session {
            id: SessionId(id),
            title: "git?".to_string(),
            created_at: Utc::now(),
            updated_at: None,
            message_count: None,
            last_message: None,
            messages: vec![
                SessionMessage {
                    id: Some(MessageId(1)),
                    role: Role::User,
                    content: "git?".to_string(),
                    sources: Vec::new(),
                },
                SessionMessage {
                    id: Some(MessageId(2)),
                    role: Role::Assistant,
                    content: "Use git.".to_string(),
                    sources: Vec::new(),
                },
            ],
        }
    }

    fn answered(store: &mut Store, message_id: Option<i64>) {
        store.chat.input.set("q");
        store.dispatch(Action::Submit);
        store.dispatch(Action::ChatReplied {
            generation: store.chat.generation(),
            result: Ok(ChatReply {
                success: true,
                session_id: Some(SessionId(1)),
                message_id: message_id.map(MessageId),
                data: Some(ChatData {
                    response: "a".to_string(),
                    ..Default::default()
                }),
                error: None,
            }),
        });
    }

    #[test]
    fn startup_fetches_bookmarks() {
        let mut store = store();
        assert_eq!(store.startup(), vec![Command::FetchBookmarks]);
    }

    #[test]
    fn tab_activation_fetches_its_data() {
        let mut store = store();
        assert_eq!(
            store.dispatch(Action::SwitchTab(Tab::Sessions)),
            vec![Command::FetchSessions]
        );
        assert_eq!(
            store.dispatch(Action::SwitchTab(Tab::Analytics)),
            vec![Command::FetchAnalytics { days: 30 }]
        );
        assert!(matches!(
            store.dispatch(Action::SwitchTab(Tab::History)).as_slice(),
            [Command::FetchHistory(_)]
        ));
        assert!(store.dispatch(Action::SwitchTab(Tab::Chat)).is_empty());
        assert_eq!(store.dispatch(Action::Refresh), vec![Command::FetchBookmarks]);
    }

    #[test]
    fn blank_submit_issues_nothing() {
        let mut store = store();
        store.chat.input.set("   ");
        assert!(store.dispatch(Action::Submit).is_empty());
        assert_eq!(store.chat.messages.len(), 1);
    }

    #[test]
    fn loading_a_session_replaces_messages_and_switches_to_chat() {
        let mut store = store();
        store.dispatch(Action::SwitchTab(Tab::Sessions));
        assert_eq!(
            store.dispatch(Action::LoadSession(SessionId(5))),
            vec![Command::LoadSession(SessionId(5))]
        );

        store.dispatch(Action::SessionLoaded {
            id: SessionId(5),
            result: Ok(stored_session(5)),
        });
        assert_eq!(store.tab, Tab::Chat);
        assert_eq!(store.chat.session_id, Some(SessionId(5)));
        assert_eq!(store.chat.messages.len(), 2);
        assert_eq!(store.chat.messages[1].message_id, Some(MessageId(2)));
    }

    #[test]
    fn replacing_the_conversation_keeps_the_send_in_flight() {
        let mut store = store();
        store.chat.input.set("first");
        let sent = store.dispatch(Action::Submit);
        let [Command::SendChat { generation, .. }] = sent.as_slice() else {
            panic!("expected one SendChat, got {:?}", sent);
        };
        let first = *generation;

        store.dispatch(Action::NewChat);
        store.chat.input.set("second");
        assert!(store.dispatch(Action::Submit).is_empty());

        store.dispatch(Action::SessionLoaded {
            id: SessionId(5),
            result: Ok(stored_session(5)),
        });
        store.chat.input.set("third");
        assert!(store.dispatch(Action::Submit).is_empty());
        assert_eq!(store.chat.messages.len(), 2);

        // The late reply is dropped but frees the line
        store.dispatch(Action::ChatReplied {
            generation: first,
            result: Ok(ChatReply::default()),
        });
        assert_eq!(store.chat.messages.len(), 2);
        assert!(matches!(
            store.dispatch(Action::Submit).as_slice(),
            [Command::SendChat {
                session_id: Some(SessionId(5)),
                ..
            }]
        ));
    }

    #[test]
    fn failed_session_load_notifies_and_keeps_chat() {
        let mut store = store();
        store.dispatch(Action::SwitchTab(Tab::Sessions));
        store.dispatch(Action::SessionLoaded {
            id: SessionId(5),
            result: Err("HTTP 404".to_string()),
        });
        assert_eq!(store.tab, Tab::Sessions);
        assert_eq!(store.chat.messages.len(), 1);
        assert_eq!(
            store.notifications.front().map(|n| n.text.as_str()),
            Some("Failed to load session.")
        );
    }

    #[test]
    fn session_delete_confirms_then_refetches() {
        let mut store = store();
        assert!(store
            .dispatch(Action::RequestDeleteSession(SessionId(3)))
            .is_empty());
        assert_eq!(
            store.dispatch(Action::ConfirmDelete),
            vec![Command::DeleteSession(SessionId(3))]
        );
        assert_eq!(
            store.dispatch(Action::SessionDeleted {
                id: SessionId(3),
                result: Ok(()),
            }),
            vec![Command::FetchSessions]
        );

        let commands = store.dispatch(Action::SessionDeleted {
            id: SessionId(3),
            result: Err("HTTP 500".to_string()),
        });
        assert!(commands.is_empty());
        assert_eq!(
            store.notifications.front().map(|n| n.text.as_str()),
            Some("Failed to delete session.")
        );
    }

    #[test]
    fn deleting_the_open_session_starts_a_new_chat() {
        let mut store = store();
        answered(&mut store, Some(10));
        assert_eq!(store.chat.session_id, Some(SessionId(1)));

        store.dispatch(Action::SessionDeleted {
            id: SessionId(1),
            result: Ok(()),
        });
        assert_eq!(store.chat.session_id, None);
    }

    #[test]
    fn bookmark_add_and_delete_refetch() {
        let mut store = store();
        answered(&mut store, Some(10));
        let answer_index = store.chat.messages.len() - 1;

        assert!(store.dispatch(Action::AddBookmark(0)).len() == 1);
        // The question itself cannot be bookmarked
        assert!(store
            .dispatch(Action::AddBookmark(answer_index - 1))
            .is_empty());
        assert!(store.dispatch(Action::AddBookmark(99)).is_empty());

        assert_eq!(
            store.dispatch(Action::BookmarkAdded(Ok(()))),
            vec![Command::FetchBookmarks]
        );
        assert_eq!(
            store.notifications.front().map(|n| n.text.as_str()),
            Some("Added to bookmarks.")
        );

        assert_eq!(
            store.dispatch(Action::DeleteBookmark(BookmarkId(4))),
            vec![Command::DeleteBookmark(BookmarkId(4))]
        );
        assert_eq!(
            store.dispatch(Action::BookmarkDeleted(Ok(()))),
            vec![Command::FetchBookmarks]
        );
        store.dispatch(Action::BookmarksLoaded(Ok(Vec::new())));
        assert!(store.bookmarks.items.is_empty());

        assert!(store
            .dispatch(Action::BookmarkDeleted(Err("HTTP 404".to_string())))
            .is_empty());
    }

    #[test]
    fn feedback_needs_a_message_id() {
        let mut store = store();
        answered(&mut store, None);
        let last = store.chat.messages.len() - 1;
        assert!(store
            .dispatch(Action::Feedback {
                index: last,
                helpful: true
            })
            .is_empty());

        answered(&mut store, Some(42));
        let last = store.chat.messages.len() - 1;
        assert_eq!(
            store.dispatch(Action::Feedback {
                index: last,
                helpful: false
            }),
            vec![Command::SendFeedback {
                message_id: MessageId(42),
                helpful: false
            }]
        );

        store.dispatch(Action::FeedbackSent {
            helpful: true,
            result: Ok(()),
        });
        assert_eq!(
            store.notifications.front().map(|n| n.text.as_str()),
            Some("Saved your feedback: helpful.")
        );
    }

    #[test]
    fn history_paging_through_store() {
        let mut store = store();
        store.dispatch(Action::SwitchTab(Tab::History));
        let query = store.history.query();
        store.dispatch(Action::HistoryLoaded {
            query,
            result: Ok(HistoryPage {
                results: Vec::new(),
                count: 45,
            }),
        });

        assert!(store.dispatch(Action::PrevPage).is_empty());
        assert_eq!(store.dispatch(Action::NextPage).len(), 1);
        assert_eq!(store.history.pagination.offset, 20);

        let commands = store.dispatch(Action::SetCategory(Some(Category::Python)));
        assert_eq!(store.history.pagination.offset, 0);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn logout_resets_everything() {
        let mut store = store();
        answered(&mut store, Some(1));
        store.dispatch(Action::SwitchTab(Tab::Sessions));
        store.dispatch(Action::SessionsLoaded(Ok(vec![stored_session(1)])));

        assert_eq!(store.dispatch(Action::Logout), vec![Command::Logout]);
        store.dispatch(Action::LoggedOut(Ok(())));

        assert_eq!(store.tab, Tab::Chat);
        assert_eq!(store.chat.messages.len(), 1);
        assert_eq!(store.chat.session_id, None);
        assert!(store.sessions.sessions.is_empty());
        assert_eq!(store.notifications.len(), 1);
    }

    #[test]
    fn tab_cycling_wraps() {
        assert_eq!(Tab::Analytics.next(), Tab::Chat);
        assert_eq!(Tab::Chat.prev(), Tab::Analytics);
    }
}
