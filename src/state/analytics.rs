// Analytics tab state

use super::request::RequestState;
use super::Command;
use crate::api::AnalyticsSnapshot;

#[derive(Debug)]
pub struct AnalyticsState {
    pub snapshot: Option<AnalyticsSnapshot>,
    pub request: RequestState,
    /// Look-back window sent with every fetch
    pub days: u32,
}

impl AnalyticsState {
    pub fn new(days: u32) -> Self {
        Self {
            snapshot: None,
            request: RequestState::Idle,
            days,
        }
    }

    pub fn fetch(&mut self) -> Command {
        self.request.start();
        Command::FetchAnalytics { days: self.days }
    }

    pub fn apply(&mut self, result: Result<AnalyticsSnapshot, String>) {
        self.request.settle(&result);
        match result {
            Ok(snapshot) => self.snapshot = Some(snapshot),
            Err(e) => tracing::warn!("Failed to fetch analytics: {}", e),
        }
    }

    /// Snapshot to render; placeholder until one with data arrives
    pub fn ready(&self) -> Option<&AnalyticsSnapshot> {
        self.snapshot.as_ref().filter(|s| s.has_data)
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
        self.request = RequestState::Idle;
    }
}
