// Command executor
//
// Runs each `Command` on its own tokio task against the API and sends the
// outcome back to the UI loop as an `Action`. Commands are independent: none
// is cancelled or retried, and list fetches may overlap.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError};
use crate::auth::{self, CredentialStore};
use crate::state::{Action, Command};

#[derive(Clone)]
pub struct Runtime {
    client: Arc<ApiClient>,
    credentials: CredentialStore,
    tx: mpsc::UnboundedSender<Action>,
}

impl Runtime {
    pub fn new(
        client: Arc<ApiClient>,
        credentials: CredentialStore,
        tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            client,
            credentials,
            tx,
        }
    }

    pub fn spawn_all(&self, commands: Vec<Command>) {
        for command in commands {
            self.spawn(command);
        }
    }

    pub fn spawn(&self, command: Command) {
        let client = self.client.clone();
        let credentials = self.credentials.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let action = execute(&client, &credentials, command).await;
            // Receiver gone means the UI is shutting down
            if tx.send(action).is_err() {
                tracing::debug!("UI closed before a command finished");
            }
        });
    }
}

fn summarize<T>(result: Result<T, ApiError>) -> Result<T, String> {
    result.map_err(|e| {
        tracing::debug!("API call failed: {}", e);
        e.summary()
    })
}

/// Run one command to completion and describe the outcome
pub async fn execute(
    client: &ApiClient,
    credentials: &CredentialStore,
    command: Command,
) -> Action {
    match command {
        Command::SendChat {
            message,
            session_id,
            generation,
        } => Action::ChatReplied {
            generation,
            result: summarize(client.chat(&message, session_id).await),
        },
        Command::FetchSessions => Action::SessionsLoaded(summarize(client.sessions().await)),
        Command::LoadSession(id) => Action::SessionLoaded {
            id,
            result: summarize(client.session(id).await),
        },
        Command::DeleteSession(id) => Action::SessionDeleted {
            id,
            result: summarize(client.delete_session(id).await),
        },
        Command::FetchHistory(query) => Action::HistoryLoaded {
            query,
            result: summarize(client.history(&query).await),
        },
        Command::FetchAnalytics { days } => {
            Action::AnalyticsLoaded(summarize(client.analytics(days).await))
        }
        Command::FetchBookmarks => Action::BookmarksLoaded(summarize(client.bookmarks().await)),
        Command::AddBookmark { content, sources } => {
            Action::BookmarkAdded(summarize(client.add_bookmark(&content, &sources).await))
        }
        Command::DeleteBookmark(id) => {
            Action::BookmarkDeleted(summarize(client.delete_bookmark(id).await))
        }
        Command::SendFeedback {
            message_id,
            helpful,
        } => Action::FeedbackSent {
            helpful,
            result: summarize(client.feedback(message_id, helpful).await),
        },
        Command::Logout => Action::LoggedOut(
            auth::logout(client, credentials)
                .await
                .map_err(|e| format!("{:#}", e)),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{self, DemoConfig, DemoServer};
    use crate::state::{Store, StoreSettings, Tab};
    use std::time::Duration;

    async fn start() -> (DemoServer, ApiClient, tempfile::TempDir) {
        let server = demo::serve("127.0.0.1:0".parse().unwrap(), DemoConfig::default())
            .await
            .unwrap();
        let client = ApiClient::new(
            &server.api_url(),
            Some(demo::DEMO_ACCESS_TOKEN.to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        (server, client, tempfile::tempdir().unwrap())
    }

    /// Drive the store until no commands remain
    async fn settle(
        store: &mut Store,
        client: &ApiClient,
        creds: &CredentialStore,
        mut pending: Vec<Command>,
    ) {
        while let Some(command) = pending.pop() {
            let action = execute(client, creds, command).await;
            pending.extend(store.dispatch(action));
        }
    }

    #[tokio::test]
    async fn chat_round_trip_through_store() {
        let (server, client, dir) = start().await;
        let creds = CredentialStore::new(dir.path().join("credentials.json"));
        let mut store = Store::new(StoreSettings::default());

        store.chat.input.set("How do I stage files in git?");
        let commands = store.dispatch(Action::Submit);
        settle(&mut store, &client, &creds, commands).await;

        assert!(store.chat.session_id.is_some());
        let answer = store.chat.messages.last().unwrap();
        assert!(answer.is_assistant());
        assert!(answer.message_id.is_some());
        assert!(!answer.sources.is_empty());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn bookmark_then_sessions_tab() {
        let (server, client, dir) = start().await;
        let creds = CredentialStore::new(dir.path().join("credentials.json"));
        let mut store = Store::new(StoreSettings::default());

        store.chat.input.set("python venv?");
        let commands = store.dispatch(Action::Submit);
        settle(&mut store, &client, &creds, commands).await;

        let last = store.chat.messages.len() - 1;
        let commands = store.dispatch(Action::AddBookmark(last));
        settle(&mut store, &client, &creds, commands).await;
        assert_eq!(store.bookmarks.items.len(), 1);

        let commands = store.dispatch(Action::SwitchTab(Tab::Sessions));
        settle(&mut store, &client, &creds, commands).await;
        assert_eq!(store.sessions.sessions.len(), 1);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn transport_failure_becomes_apology() {
        let dir = tempfile::tempdir().unwrap();
        let creds = CredentialStore::new(dir.path().join("credentials.json"));
        let client = ApiClient::new(
            "http://127.0.0.1:9/api",
            Some("t".to_string()),
            Some(Duration::from_secs(2)),
        )
        .unwrap();
        let mut store = Store::new(StoreSettings::default());

        store.chat.input.set("hello");
        let commands = store.dispatch(Action::Submit);
        settle(&mut store, &client, &creds, commands).await;

        assert_eq!(
            store.chat.messages.last().unwrap().content,
            crate::state::chat::FAILURE_APOLOGY
        );
        assert!(!store.chat.request.is_loading());
    }
}
