// Demo backend: an in-memory stand-in for the chatbot API
//
// Serves every endpoint the client talks to, so the TUI (and the client
// tests) can run without the real service. There is no retrieval here:
// answers are canned per topic, categorized with a few keywords.
//
// Run with: pichat demo

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Timelike, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::{Category, Role, Source, SourceDetail};

/// Token the `demo` command logs in with. Any non-empty bearer is accepted.
pub const DEMO_ACCESS_TOKEN: &str = "demo-access-token";
pub const DEMO_REFRESH_TOKEN: &str = "demo-refresh-token";

/// Session titles are the first message, cut to this many characters
const TITLE_CHARS: usize = 100;
/// `last_message` previews in the session list
const PREVIEW_CHARS: usize = 100;
const DEFAULT_HISTORY_LIMIT: usize = 20;
const DEFAULT_ANALYTICS_DAYS: i64 = 30;

#[derive(Debug, Clone, Default)]
pub struct DemoConfig {
    /// Artificial delay before each chat answer
    pub latency: Duration,
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct StoredMessage {
    id: i64,
    role: Role,
    content: String,
    sources: Vec<Source>,
    category: Category,
    is_helpful: Option<bool>,
    response_secs: f64,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct StoredSession {
    id: i64,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    messages: Vec<StoredMessage>,
}

#[derive(Debug)]
struct StoredBookmark {
    id: i64,
    content: String,
    sources: Vec<Source>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Store {
    next_id: i64,
    sessions: BTreeMap<i64, StoredSession>,
    bookmarks: Vec<StoredBookmark>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Question/answer pairs, newest first
    fn exchanges(&self) -> Vec<(&StoredMessage, &StoredMessage)> {
        let mut pairs: Vec<_> = self
            .sessions
            .values()
            .flat_map(|s| {
                s.messages.windows(2).filter_map(|w| {
                    (w[0].role == Role::User && w[1].role == Role::Assistant)
                        .then_some((&w[0], &w[1]))
                })
            })
            .collect();
        pairs.sort_by(|a, b| b.1.id.cmp(&a.1.id));
        pairs
    }

    fn find_message_mut(&mut self, id: i64) -> Option<&mut StoredMessage> {
        self.sessions
            .values_mut()
            .flat_map(|s| s.messages.iter_mut())
            .find(|m| m.id == id)
    }
}

#[derive(Clone)]
struct DemoState {
    store: Arc<Mutex<Store>>,
    latency: Duration,
}

impl DemoState {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Store>, DemoError> {
        self.store
            .lock()
            .map_err(|e| DemoError::Internal(format!("store lock poisoned: {}", e)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum DemoError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for DemoError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            DemoError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({"detail": "Authentication credentials were not provided."}),
            ),
            DemoError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({"success": false, "error": msg}),
            ),
            DemoError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({"success": false, "error": msg}),
            ),
            DemoError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"success": false, "error": msg}),
            ),
        };

        tracing::debug!("Demo API error: {} - {}", status, body);

        (status, Json(body)).into_response()
    }
}

fn authorize(headers: &HeaderMap) -> Result<(), DemoError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or_default();
    if token.is_empty() {
        return Err(DemoError::Unauthorized);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Server lifecycle
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to a running demo backend
pub struct DemoServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl DemoServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL to hand to `ApiClient`
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Stop accepting requests and wait for the server task to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.handle).await {
            tracing::warn!("Demo server task ended abnormally: {}", e);
        }
    }
}

/// Bind `addr` (port 0 picks a free port) and serve in a background task
pub async fn serve(addr: SocketAddr, config: DemoConfig) -> Result<DemoServer> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind demo backend to {}", addr))?;
    let addr = listener
        .local_addr()
        .context("Failed to read demo backend address")?;

    let state = DemoState {
        store: Arc::new(Mutex::new(Store::default())),
        latency: config.latency,
    };
    let app = router(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!("Demo backend stopped: {}", e);
        }
    });

    tracing::info!("Demo backend listening on http://{}/api", addr);

    Ok(DemoServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        handle,
    })
}

fn router(state: DemoState) -> Router {
    let api = Router::new()
        .route("/auth/logout/", post(logout))
        .route("/chatbot/chat/", post(chat))
        .route("/chatbot/sessions/", get(list_sessions))
        .route("/chatbot/sessions/:id/", get(get_session))
        .route("/chatbot/sessions/:id/delete/", delete(delete_session))
        .route("/chatbot/bookmarks/", get(list_bookmarks))
        .route("/chatbot/bookmark/", post(create_bookmark))
        .route("/chatbot/bookmark/:id/", delete(delete_bookmark))
        .route("/chatbot/history/", get(history))
        .route("/chatbot/analytics/", get(analytics))
        .route("/chatbot/feedback/", post(feedback));

    Router::new().nest("/api", api).with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LogoutBody {
    #[serde(default)]
    refresh: Option<String>,
}

async fn logout(Json(body): Json<LogoutBody>) -> Result<Json<Value>, DemoError> {
    if body.refresh.as_deref().map_or(true, str::is_empty) {
        return Err(DemoError::BadRequest("Refresh token is required.".to_string()));
    }
    Ok(Json(json!({"success": true})))
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    session_id: Option<i64>,
}

async fn chat(
    State(state): State<DemoState>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> Result<Json<Value>, DemoError> {
    authorize(&headers)?;
    let started = Instant::now();

    let message = body.message.trim().to_string();
    if message.is_empty() {
        return Err(DemoError::BadRequest("Message is required.".to_string()));
    }
    if let Some(id) = body.session_id {
        let known = state.lock()?.sessions.contains_key(&id);
        if !known {
            return Err(DemoError::NotFound("Session not found.".to_string()));
        }
    }

    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }

    let category = categorize(&message);
    let answer = canned_answer(category);
    let response_secs = started.elapsed().as_secs_f64();

    let mut store = state.lock()?;
    let now = Utc::now();
    let session_id = match body.session_id {
        Some(id) => id,
        None => {
            let id = store.next_id();
            let title = message.chars().take(TITLE_CHARS).collect();
            store.sessions.insert(
                id,
                StoredSession {
                    id,
                    title,
                    created_at: now,
                    updated_at: now,
                    messages: Vec::new(),
                },
            );
            tracing::debug!(session_id = id, "Demo session created");
            id
        }
    };
    let user_id = store.next_id();
    let assistant_id = store.next_id();

    // Deleted between the check and now
    let session = store
        .sessions
        .get_mut(&session_id)
        .ok_or_else(|| DemoError::NotFound("Session not found.".to_string()))?;
    session.updated_at = now;
    session.messages.push(StoredMessage {
        id: user_id,
        role: Role::User,
        content: message,
        sources: Vec::new(),
        category,
        is_helpful: None,
        response_secs: 0.0,
        created_at: now,
    });
    session.messages.push(StoredMessage {
        id: assistant_id,
        role: Role::Assistant,
        content: answer.text.to_string(),
        sources: answer.sources.clone(),
        category,
        is_helpful: None,
        response_secs,
        created_at: now,
    });

    Ok(Json(json!({
        "success": true,
        "session_id": session_id,
        "message_id": assistant_id,
        "data": {
            "response": answer.text,
            "sources": answer.sources,
            "related_questions": answer.related,
        }
    })))
}

async fn list_sessions(
    State(state): State<DemoState>,
    headers: HeaderMap,
) -> Result<Json<Value>, DemoError> {
    authorize(&headers)?;
    let store = state.lock()?;

    let mut sessions: Vec<&StoredSession> = store.sessions.values().collect();
    sessions.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));

    let data: Vec<Value> = sessions
        .into_iter()
        .map(|s| {
            let last = s.messages.last().map(|m| {
                json!({
                    "role": m.role,
                    "content": m.content.chars().take(PREVIEW_CHARS).collect::<String>(),
                    "created_at": m.created_at,
                })
            });
            json!({
                "id": s.id,
                "title": s.title,
                "message_count": s.messages.len(),
                "last_message": last,
                "created_at": s.created_at,
                "updated_at": s.updated_at,
            })
        })
        .collect();

    Ok(Json(json!({"success": true, "data": data})))
}

async fn get_session(
    State(state): State<DemoState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, DemoError> {
    authorize(&headers)?;
    let store = state.lock()?;
    let session = store
        .sessions
        .get(&id)
        .ok_or_else(|| DemoError::NotFound("Session not found.".to_string()))?;

    let messages: Vec<Value> = session
        .messages
        .iter()
        .map(|m| {
            json!({
                "id": m.id,
                "role": m.role,
                "content": m.content,
                "sources": m.sources,
                "metadata": {},
                "created_at": m.created_at,
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": session.id,
            "title": session.title,
            "messages": messages,
            "message_count": session.messages.len(),
            "created_at": session.created_at,
            "updated_at": session.updated_at,
        }
    })))
}

async fn delete_session(
    State(state): State<DemoState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, DemoError> {
    authorize(&headers)?;
    state
        .lock()?
        .sessions
        .remove(&id)
        .ok_or_else(|| DemoError::NotFound("Session not found.".to_string()))?;
    tracing::debug!(session_id = id, "Demo session deleted");
    Ok(Json(json!({"success": true, "message": "Session deleted."})))
}

fn bookmark_json(b: &StoredBookmark) -> Value {
    json!({
        "id": b.id,
        "content": b.content,
        "sources": b.sources,
        "created_at": b.created_at,
    })
}

async fn list_bookmarks(
    State(state): State<DemoState>,
    headers: HeaderMap,
) -> Result<Json<Value>, DemoError> {
    authorize(&headers)?;
    let store = state.lock()?;
    // Newest first
    let data: Vec<Value> = store.bookmarks.iter().rev().map(bookmark_json).collect();
    Ok(Json(json!({"success": true, "data": data})))
}

#[derive(Debug, Deserialize)]
struct BookmarkBody {
    #[serde(default)]
    content: String,
    #[serde(default)]
    sources: Vec<Source>,
}

async fn create_bookmark(
    State(state): State<DemoState>,
    headers: HeaderMap,
    Json(body): Json<BookmarkBody>,
) -> Result<impl IntoResponse, DemoError> {
    authorize(&headers)?;
    if body.content.trim().is_empty() {
        return Err(DemoError::BadRequest("Content is required.".to_string()));
    }

    let mut store = state.lock()?;
    let id = store.next_id();
    let bookmark = StoredBookmark {
        id,
        content: body.content,
        sources: body.sources,
        created_at: Utc::now(),
    };
    let data = bookmark_json(&bookmark);
    store.bookmarks.push(bookmark);

    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "data": data})),
    ))
}

async fn delete_bookmark(
    State(state): State<DemoState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, DemoError> {
    authorize(&headers)?;
    let mut store = state.lock()?;
    let index = store
        .bookmarks
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| DemoError::NotFound("Bookmark not found.".to_string()))?;
    store.bookmarks.remove(index);
    Ok(Json(json!({"success": true, "message": "Bookmark deleted."})))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    offset: Option<usize>,
    #[serde(default)]
    category: Option<String>,
}

async fn history(
    State(state): State<DemoState>,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Value>, DemoError> {
    authorize(&headers)?;
    let store = state.lock()?;

    let filter = params.category.as_deref().filter(|c| !c.is_empty());
    let matching: Vec<_> = store
        .exchanges()
        .into_iter()
        .filter(|(_, answer)| filter.map_or(true, |c| answer.category.as_str() == c))
        .collect();

    let results: Vec<Value> = matching
        .iter()
        .skip(params.offset.unwrap_or(0))
        .take(params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .map(|(question, answer)| {
            json!({
                "id": answer.id,
                "question": question.content,
                "answer": answer.content,
                "category": answer.category.as_str(),
                "created_at": answer.created_at,
                "is_helpful": answer.is_helpful,
            })
        })
        .collect();

    Ok(Json(json!({"count": matching.len(), "results": results})))
}

#[derive(Debug, Deserialize)]
struct AnalyticsParams {
    #[serde(default)]
    days: Option<i64>,
}

async fn analytics(
    State(state): State<DemoState>,
    headers: HeaderMap,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<Value>, DemoError> {
    authorize(&headers)?;
    let store = state.lock()?;
    let days = params.days.unwrap_or(DEFAULT_ANALYTICS_DAYS).max(1);
    let answers: Vec<&StoredMessage> = store.exchanges().into_iter().map(|(_, a)| a).collect();
    Ok(Json(summarize(&answers, days, Utc::now())))
}

#[derive(Debug, Deserialize)]
struct FeedbackBody {
    message_id: i64,
    is_helpful: bool,
}

async fn feedback(
    State(state): State<DemoState>,
    headers: HeaderMap,
    Json(body): Json<FeedbackBody>,
) -> Result<Json<Value>, DemoError> {
    authorize(&headers)?;
    let mut store = state.lock()?;
    let message = store
        .find_message_mut(body.message_id)
        .filter(|m| m.role == Role::Assistant)
        .ok_or_else(|| DemoError::NotFound("Message not found.".to_string()))?;
    message.is_helpful = Some(body.is_helpful);
    Ok(Json(json!({"success": true})))
}

// ─────────────────────────────────────────────────────────────────────────────
// Canned content
// ─────────────────────────────────────────────────────────────────────────────

fn categorize(question: &str) -> Category {
    const GIT: [&str; 8] = [
        "git", "commit", "branch", "merge", "rebase", "stash", "checkout", "clone",
    ];
    const PYTHON: [&str; 8] = [
        "python", "pip", "venv", "django", "decorator", "list comprehension", "def ", "import",
    ];

    let lower = question.to_lowercase();
    if GIT.iter().any(|k| lower.contains(k)) {
        Category::Git
    } else if PYTHON.iter().any(|k| lower.contains(k)) {
        Category::Python
    } else if lower.chars().any(char::is_alphabetic) {
        Category::General
    } else {
        Category::Unknown
    }
}

struct Answer {
    text: &'static str,
    sources: Vec<Source>,
    related: Vec<&'static str>,
}

fn detailed(content: &str, chunk_id: &str, url: &str, score: f64) -> Source {
    Source::Detailed(SourceDetail {
        content: Some(content.to_string()),
        chunk_id: Some(Value::String(chunk_id.to_string())),
        url: Some(url.to_string()),
        score: Some(score),
    })
}

fn canned_answer(category: Category) -> Answer {
    match category {
        Category::Git => Answer {
            text: "Stage your changes with **git add** before committing. \
                   - `git add <file>` stages a single file. \
                   - `git add .` stages everything under the current directory. \
                   1. Check what is staged with `git status`. \
                   2. Record it with `git commit -m \"message\"`. \
                   📚 References: Pro Git, chapter 2",
            sources: vec![
                detailed(
                    "git-add - Add file contents to the index. This command updates the index \
                     using the current content found in the working tree, to prepare the \
                     content staged for the next commit.",
                    "git-add-0",
                    "https://git-scm.com/docs/git-add",
                    0.91,
                ),
                Source::Snippet("Pro Git 2.2: Recording Changes to the Repository".to_string()),
            ],
            related: vec![
                "How do I unstage a file?",
                "What does git commit --amend do?",
                "How do I see what is staged?",
            ],
        },
        Category::Python => Answer {
            text: "A virtual environment keeps each project's packages separate. \
                   Step 1: create it with `python -m venv .venv`. \
                   Step 2: activate it. \
                   - On Linux and macOS run `source .venv/bin/activate`. \
                   - On Windows run `.venv\\Scripts\\activate`. \
                   Then install packages with `pip install`.",
            sources: vec![detailed(
                "venv - Creation of virtual environments",
                "py-venv-3",
                "https://docs.python.org/3/library/venv.html",
                0.84,
            )],
            related: vec![
                "How do I freeze my dependencies?",
                "What is the difference between pip and pipx?",
            ],
        },
        Category::General => Answer {
            text: "I can help with Git and Python questions. \
                   Try asking how to stage files, undo a commit, or set up a virtual environment.",
            sources: Vec::new(),
            related: vec!["How do I undo the last commit?"],
        },
        Category::Unknown => Answer {
            text: "I could not work out what you meant. Could you rephrase the question?",
            sources: Vec::new(),
            related: Vec::new(),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Analytics
// ─────────────────────────────────────────────────────────────────────────────

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn day_part(hour: u32) -> &'static str {
    match hour {
        6..=11 => "Morning",
        12..=17 => "Afternoon",
        18..=23 => "Evening",
        _ => "Night",
    }
}

/// Build the analytics payload from answered questions
fn summarize(answers: &[&StoredMessage], days: i64, now: DateTime<Utc>) -> Value {
    let window_start = now - chrono::Duration::days(days);
    let in_window: Vec<&StoredMessage> = answers
        .iter()
        .copied()
        .filter(|m| m.created_at >= window_start)
        .collect();

    if in_window.is_empty() {
        return json!({"has_data": false});
    }
    let total = in_window.len();

    let mut by_hour = [0u64; 24];
    for m in &in_window {
        by_hour[m.created_at.hour() as usize] += 1;
    }
    // Earliest hour wins ties
    let (peak_hour, peak_count) = by_hour
        .iter()
        .enumerate()
        .fold((0, 0), |best, (h, &c)| if c > best.1 { (h, c) } else { best });

    let mut category_stats = serde_json::Map::new();
    let mut favorite: Option<(Category, usize)> = None;
    for category in Category::ALL {
        let count = in_window.iter().filter(|m| m.category == category).count();
        if count == 0 {
            continue;
        }
        if favorite.map_or(true, |(_, best)| count > best) {
            favorite = Some((category, count));
        }
        category_stats.insert(
            category.as_str().to_string(),
            json!({
                "count": count,
                "percentage": round1(count as f64 * 100.0 / total as f64),
            }),
        );
    }

    let week_ago = now - chrono::Duration::days(7);
    let two_weeks_ago = now - chrono::Duration::days(14);
    let this_week = answers.iter().filter(|m| m.created_at >= week_ago).count();
    let last_week = answers
        .iter()
        .filter(|m| m.created_at >= two_weeks_ago && m.created_at < week_ago)
        .count();
    let growth = match (this_week, last_week) {
        (0, 0) => 0.0,
        (_, 0) => 100.0,
        (this, last) => round1((this as f64 - last as f64) * 100.0 / last as f64),
    };

    let avg_response = in_window.iter().map(|m| m.response_secs).sum::<f64>() / total as f64;

    json!({
        "has_data": true,
        "peak_time": {
            "label": day_part(peak_hour as u32),
            "hour_range": format!("{:02}:00-{:02}:00", peak_hour, (peak_hour + 1) % 24),
            "usage_count": peak_count,
        },
        "favorite_category": favorite.map(|(c, _)| json!({"name": c.as_str()})),
        "weekly_stats": {"this_week": this_week, "growth": growth},
        "category_stats": category_stats,
        "total_questions": total,
        "avg_response_time": (avg_response * 100.0).round() / 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AnalyticsSnapshot;

    fn answer(id: i64, category: Category, created_at: DateTime<Utc>) -> StoredMessage {
        StoredMessage {
            id,
            role: Role::Assistant,
            content: String::new(),
            sources: Vec::new(),
            category,
            is_helpful: None,
            response_secs: 1.5,
            created_at,
        }
    }

    #[test]
    fn categorizes_by_keyword() {
        assert_eq!(categorize("How do I stage files in git?"), Category::Git);
        assert_eq!(categorize("python decorators?"), Category::Python);
        assert_eq!(categorize("What is a closure?"), Category::General);
        assert_eq!(categorize("???"), Category::Unknown);
    }

    #[test]
    fn empty_window_has_no_data() {
        let now = Utc::now();
        let old = answer(1, Category::Git, now - chrono::Duration::days(40));
        let value = summarize(&[&old], 30, now);
        assert_eq!(value, json!({"has_data": false}));
    }

    #[test]
    fn summary_decodes_as_snapshot() {
        let now = Utc::now();
        let a = answer(1, Category::Git, now);
        let b = answer(2, Category::Git, now);
        let c = answer(3, Category::Python, now - chrono::Duration::days(8));

        let snapshot: AnalyticsSnapshot =
            serde_json::from_value(summarize(&[&a, &b, &c], 30, now)).unwrap();
        assert!(snapshot.has_data);
        assert_eq!(snapshot.total_questions, 3);
        assert_eq!(snapshot.favorite_category.unwrap().name, "git");

        let weekly = snapshot.weekly_stats.unwrap();
        assert_eq!(weekly.this_week, 2);
        assert_eq!(weekly.growth, 100.0);

        let stats = snapshot.category_stats.unwrap();
        assert_eq!(stats["git"].count, 2);
        assert_eq!(stats["python"].percentage, 33.3);
        assert_eq!(snapshot.avg_response_time, 1.5);
    }

    #[test]
    fn exchanges_pair_questions_with_answers() {
        let now = Utc::now();
        let mut store = Store::default();
        let question = StoredMessage {
            role: Role::User,
            content: "git?".to_string(),
            ..answer(1, Category::Git, now)
        };
        store.sessions.insert(
            7,
            StoredSession {
                id: 7,
                title: "git?".to_string(),
                created_at: now,
                updated_at: now,
                messages: vec![question, answer(2, Category::Git, now)],
            },
        );

        let pairs = store.exchanges();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.content, "git?");
        assert_eq!(pairs[0].1.id, 2);
    }
}
