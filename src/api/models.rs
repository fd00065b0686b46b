// Wire and domain types for the chatbot API
//
// These mirror the JSON the backend sends. Almost every field is optional or
// defaulted because the backend omits keys freely (list vs detail serializers,
// error bodies, sessions created before a field existed).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Identifiers
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Backend-persisted conversation thread
    SessionId
);
id_type!(
    /// Stored chat message (target of feedback)
    MessageId
);
id_type!(
    /// Saved answer
    BookmarkId
);

// ─────────────────────────────────────────────────────────────────────────────
// Messages and sources
// ─────────────────────────────────────────────────────────────────────────────

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A retrieval snippet attached to an assistant answer
///
/// Older answers store plain strings; newer ones store objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Snippet(String),
    Detailed(SourceDetail),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// String or number depending on the retriever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Relevance in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A message in the local conversation view
///
/// Created on send/receive and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub related_questions: Vec<String>,
    #[serde(default)]
    pub message_id: Option<MessageId>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
            related_questions: Vec::new(),
            message_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources: Vec::new(),
            related_questions: Vec::new(),
            message_id: None,
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// Body of POST /chatbot/chat/
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    /// Sent as `null` when starting a new session
    pub session_id: Option<SessionId>,
}

/// Response of POST /chatbot/chat/
///
/// Failures come back in the same envelope with `success: false`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub message_id: Option<MessageId>,
    #[serde(default)]
    pub data: Option<ChatData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatData {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub related_questions: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────────────────────

/// A conversation thread
///
/// The list endpoint sends `message_count`/`last_message` and no messages;
/// the detail endpoint sends `messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub id: SessionId,
    #[serde(default)]
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_count: Option<u32>,
    #[serde(default)]
    pub last_message: Option<LastMessage>,
    #[serde(default)]
    pub messages: Vec<SessionMessage>,
}

impl Session {
    /// Number of messages, whichever shape the backend sent
    pub fn message_total(&self) -> usize {
        match self.message_count {
            Some(count) => count as usize,
            None => self.messages.len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastMessage {
    pub role: Role,
    pub content: String,
}

/// A message as stored in a session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionMessage {
    #[serde(default)]
    pub id: Option<MessageId>,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl From<SessionMessage> for Message {
    fn from(stored: SessionMessage) -> Self {
        Self {
            role: stored.role,
            content: stored.content,
            sources: stored.sources,
            related_questions: Vec::new(),
            message_id: stored.id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// History
// ─────────────────────────────────────────────────────────────────────────────

/// Topic buckets the backend classifies questions into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Git,
    Python,
    General,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Git,
        Category::Python,
        Category::General,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Git => "git",
            Category::Python => "python",
            Category::General => "general",
            Category::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Git => "Git",
            Category::Python => "Python",
            Category::General => "General",
            Category::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Cycle through "all" (None) and every category
    pub fn cycle(current: Option<Category>) -> Option<Category> {
        match current {
            None => Some(Category::Git),
            Some(Category::Git) => Some(Category::Python),
            Some(Category::Python) => Some(Category::General),
            Some(Category::General) => Some(Category::Unknown),
            Some(Category::Unknown) => None,
        }
    }
}

/// One past question/answer exchange
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub id: MessageId,
    pub question: String,
    pub answer: String,
    /// Kept as text: the backend may add categories before we do
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
    /// None = no feedback given
    #[serde(default)]
    pub is_helpful: Option<bool>,
}

/// Response of GET /chatbot/history/
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub results: Vec<HistoryEntry>,
    #[serde(default)]
    pub count: u64,
}

/// Query parameters of GET /chatbot/history/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub limit: u64,
    pub offset: u64,
    pub category: Option<Category>,
}

impl HistoryQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(category) = self.category {
            params.push(("category", category.as_str().to_string()));
        }
        params
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bookmarks
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookmarkRequest<'a> {
    pub content: &'a str,
    pub sources: &'a [Source],
}

// ─────────────────────────────────────────────────────────────────────────────
// Analytics
// ─────────────────────────────────────────────────────────────────────────────

/// Precomputed usage statistics
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalyticsSnapshot {
    #[serde(default)]
    pub has_data: bool,
    #[serde(default)]
    pub peak_time: Option<PeakTime>,
    #[serde(default)]
    pub favorite_category: Option<FavoriteCategory>,
    #[serde(default)]
    pub weekly_stats: Option<WeeklyStats>,
    #[serde(default)]
    pub category_stats: Option<BTreeMap<String, CategoryStat>>,
    #[serde(default)]
    pub total_questions: u64,
    /// Seconds
    #[serde(default)]
    pub avg_response_time: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PeakTime {
    pub label: String,
    pub hour_range: String,
    #[serde(default)]
    pub usage_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FavoriteCategory {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeeklyStats {
    #[serde(default)]
    pub this_week: u64,
    /// Percent change against the previous week
    #[serde(default)]
    pub growth: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryStat {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub percentage: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelopes and small bodies
// ─────────────────────────────────────────────────────────────────────────────

/// `{ "data": ... }` wrapper used by list/detail endpoints
///
/// A missing or null `data` decodes as `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Option<T>,
}

/// Error body shapes: `{error}`, `{message}`, or DRF's `{detail}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.detail).or(self.message)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest {
    pub message_id: MessageId,
    pub is_helpful: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest<'a> {
    pub refresh: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_accept_strings_and_objects() {
        let json = r#"[
            "plain snippet",
            {"content": "git add stages files", "chunk_id": 17, "url": "https://git-scm.com", "score": 0.87},
            {"chunk_id": "c-42"}
        ]"#;
        let sources: Vec<Source> = serde_json::from_str(json).unwrap();

        assert_eq!(sources[0], Source::Snippet("plain snippet".to_string()));
        match &sources[1] {
            Source::Detailed(detail) => {
                assert_eq!(detail.url.as_deref(), Some("https://git-scm.com"));
                assert_eq!(detail.score, Some(0.87));
            }
            other => panic!("expected detailed source, got {:?}", other),
        }
        match &sources[2] {
            Source::Detailed(detail) => assert!(detail.content.is_none()),
            other => panic!("expected detailed source, got {:?}", other),
        }
    }

    #[test]
    fn chat_reply_defaults_missing_fields() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"success": true, "session_id": 3, "message_id": 9, "data": {"response": "hi"}}"#,
        )
        .unwrap();
        let data = reply.data.unwrap();
        assert_eq!(reply.session_id, Some(SessionId(3)));
        assert!(data.sources.is_empty());
        assert!(data.related_questions.is_empty());

        let failure: ChatReply =
            serde_json::from_str(r#"{"success": false, "error": "no session"}"#).unwrap();
        assert!(!failure.success);
        assert_eq!(failure.error.as_deref(), Some("no session"));
    }

    #[test]
    fn session_list_and_detail_shapes() {
        let listed: Session = serde_json::from_str(
            r#"{"id": 1, "title": "git?", "message_count": 4,
                "last_message": {"role": "assistant", "content": "..."},
                "created_at": "2024-03-01T09:30:00.123456+09:00",
                "updated_at": "2024-03-01T09:31:00Z"}"#,
        )
        .unwrap();
        assert_eq!(listed.message_total(), 4);
        assert!(listed.messages.is_empty());

        let detail: Session = serde_json::from_str(
            r#"{"id": 1, "title": "git?", "created_at": "2024-03-01T00:30:00Z",
                "messages": [
                    {"id": 10, "role": "user", "content": "git?", "sources": []},
                    {"id": 11, "role": "assistant", "content": "Use git.", "sources": ["doc"], "metadata": {}}
                ]}"#,
        )
        .unwrap();
        assert_eq!(detail.message_total(), 2);
        let message: Message = detail.messages[1].clone().into();
        assert_eq!(message.message_id, Some(MessageId(11)));
        assert!(message.is_assistant());
    }

    #[test]
    fn history_query_omits_empty_category() {
        let unfiltered = HistoryQuery {
            limit: 20,
            offset: 40,
            category: None,
        };
        assert_eq!(
            unfiltered.to_params(),
            vec![("limit", "20".to_string()), ("offset", "40".to_string())]
        );

        let filtered = HistoryQuery {
            category: Some(Category::Python),
            ..unfiltered
        };
        assert!(filtered
            .to_params()
            .contains(&("category", "python".to_string())));
    }

    #[test]
    fn history_entry_tri_state_feedback() {
        let page: HistoryPage = serde_json::from_str(
            r#"{"count": 2, "results": [
                {"id": 1, "question": "q", "answer": "a", "category": "git",
                 "created_at": "2024-03-01T00:00:00Z", "is_helpful": null},
                {"id": 2, "question": "q", "answer": "a", "category": "git",
                 "created_at": "2024-03-01T00:00:00Z", "is_helpful": false}
            ]}"#,
        )
        .unwrap();
        assert_eq!(page.results[0].is_helpful, None);
        assert_eq!(page.results[1].is_helpful, Some(false));
    }

    #[test]
    fn analytics_without_data() {
        let snapshot: AnalyticsSnapshot = serde_json::from_str(r#"{"has_data": false}"#).unwrap();
        assert!(!snapshot.has_data);
        assert!(snapshot.peak_time.is_none());
        assert!(snapshot.category_stats.is_none());
    }

    #[test]
    fn category_cycle_visits_all_and_returns_to_unfiltered() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            current = Category::cycle(current);
            seen.push(current);
        }
        assert_eq!(seen.last(), Some(&None));
        assert_eq!(seen.iter().flatten().count(), 4);
        assert_eq!(Category::parse(" Python "), Some(Category::Python));
        assert_eq!(Category::parse("rust"), None);
    }

    #[test]
    fn error_body_prefers_error_then_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": "Authentication credentials were not provided."}"#)
                .unwrap();
        assert_eq!(
            body.into_message().as_deref(),
            Some("Authentication credentials were not provided.")
        );
    }
}
