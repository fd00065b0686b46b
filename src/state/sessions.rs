// Session list state

use super::request::RequestState;
use super::Command;
use crate::api::{Session, SessionId};

#[derive(Debug, Default)]
pub struct SessionsState {
    pub sessions: Vec<Session>,
    pub request: RequestState,
    /// Session waiting for the user to confirm deletion
    pub pending_delete: Option<SessionId>,
}

impl SessionsState {
    pub fn fetch(&mut self) -> Command {
        self.request.start();
        Command::FetchSessions
    }

    pub fn apply_list(&mut self, result: Result<Vec<Session>, String>) {
        self.request.settle(&result);
        match result {
            Ok(sessions) => self.sessions = sessions,
            Err(e) => tracing::warn!("Failed to fetch sessions: {}", e),
        }
    }

    pub fn load(&self, id: SessionId) -> Command {
        Command::LoadSession(id)
    }

    /// Ask before deleting; nothing is sent until `confirm`
    pub fn request_delete(&mut self, id: SessionId) {
        self.pending_delete = Some(id);
    }

    pub fn confirm(&mut self) -> Option<Command> {
        self.pending_delete.take().map(Command::DeleteSession)
    }

    pub fn cancel(&mut self) {
        self.pending_delete = None;
    }

    pub fn title_of(&self, id: SessionId) -> Option<&str> {
        self.sessions
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.title.as_str())
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.pending_delete = None;
        self.request = RequestState::Idle;
    }
}
