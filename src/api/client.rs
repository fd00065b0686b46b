//! HTTP client for the chatbot REST API
//!
//! One shared `reqwest::Client` with connection pooling. The bearer token can
//! be swapped at runtime (login/logout) without rebuilding the client.

use std::sync::RwLock;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::models::{
    AnalyticsSnapshot, Bookmark, BookmarkId, BookmarkRequest, ChatReply, ChatRequest,
    DataEnvelope, ErrorBody, FeedbackRequest, HistoryPage, HistoryQuery, LogoutRequest,
    MessageId, Session, SessionId, Source,
};

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Build a client for `base_url` (e.g. `http://127.0.0.1:8000/api`)
    ///
    /// `timeout` of `None` means requests wait indefinitely.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        // Url::join drops the last path segment unless the base ends in '/'
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = Url::parse(&normalized)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("pichat/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(4);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base,
            token: RwLock::new(token.filter(|t| !t.is_empty())),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token.filter(|t| !t.is_empty());
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        tracing::debug!(method = %method, url = %url, "API request");

        let mut request = self.http.request(method, url);
        let token = self.token.read().ok().and_then(|t| t.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    /// Send and return status plus raw body
    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "API response");
        Ok((status, body.to_vec()))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let (status, body) = self.execute(request).await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send and ignore whatever body comes back on success
    async fn send_unit(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let (status, body) = self.execute(request).await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Endpoints
    // ─────────────────────────────────────────────────────────────────────

    /// POST /auth/logout/
    pub async fn logout(&self, refresh: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "auth/logout/")?
            .json(&LogoutRequest { refresh });
        self.send_unit(request).await
    }

    /// POST /chatbot/chat/
    ///
    /// The backend reports expected failures as `{success: false, error}`
    /// with a 4xx/5xx status; those come back as `Ok` so the caller can show
    /// the server's text.
    pub async fn chat(
        &self,
        message: &str,
        session_id: Option<SessionId>,
    ) -> Result<ChatReply, ApiError> {
        let request = self
            .request(Method::POST, "chatbot/chat/")?
            .json(&ChatRequest {
                message,
                session_id,
            });
        let (status, body) = self.execute(request).await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }
        match serde_json::from_slice::<ChatReply>(&body) {
            Ok(mut reply) if reply.error.is_some() || !reply.success => {
                reply.success = false;
                Ok(reply)
            }
            _ => Err(status_error(status, &body)),
        }
    }

    /// GET /chatbot/bookmarks/
    pub async fn bookmarks(&self) -> Result<Vec<Bookmark>, ApiError> {
        let request = self.request(Method::GET, "chatbot/bookmarks/")?;
        let envelope: DataEnvelope<Vec<Bookmark>> = self.send_json(request).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// POST /chatbot/bookmark/
    pub async fn add_bookmark(&self, content: &str, sources: &[Source]) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "chatbot/bookmark/")?
            .json(&BookmarkRequest { content, sources });
        self.send_unit(request).await
    }

    /// DELETE /chatbot/bookmark/{id}/
    pub async fn delete_bookmark(&self, id: BookmarkId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("chatbot/bookmark/{}/", id))?;
        self.send_unit(request).await
    }

    /// GET /chatbot/sessions/
    pub async fn sessions(&self) -> Result<Vec<Session>, ApiError> {
        let request = self.request(Method::GET, "chatbot/sessions/")?;
        let envelope: DataEnvelope<Vec<Session>> = self.send_json(request).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// GET /chatbot/sessions/{id}/
    pub async fn session(&self, id: SessionId) -> Result<Session, ApiError> {
        let request = self.request(Method::GET, &format!("chatbot/sessions/{}/", id))?;
        let envelope: DataEnvelope<Session> = self.send_json(request).await?;
        envelope.data.ok_or(ApiError::MissingField("data"))
    }

    /// DELETE /chatbot/sessions/{id}/delete/
    pub async fn delete_session(&self, id: SessionId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("chatbot/sessions/{}/delete/", id))?;
        self.send_unit(request).await
    }

    /// GET /chatbot/history/
    pub async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage, ApiError> {
        let request = self
            .request(Method::GET, "chatbot/history/")?
            .query(&query.to_params());
        self.send_json(request).await
    }

    /// GET /chatbot/analytics/?days=N
    pub async fn analytics(&self, days: u32) -> Result<AnalyticsSnapshot, ApiError> {
        let request = self
            .request(Method::GET, "chatbot/analytics/")?
            .query(&[("days", days)]);
        self.send_json(request).await
    }

    /// POST /chatbot/feedback/
    pub async fn feedback(&self, message_id: MessageId, is_helpful: bool) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "chatbot/feedback/")?
            .json(&FeedbackRequest {
                message_id,
                is_helpful,
            });
        self.send_unit(request).await
    }
}

/// Turn a non-success response into `ApiError::Status`, keeping the
/// server's message when the body has one
fn status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body);
            text.trim().chars().take(200).collect()
        });
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Category, Role};
    use crate::demo::{self, DemoServer};

    async fn start() -> (DemoServer, ApiClient) {
        let server = demo::serve("127.0.0.1:0".parse().unwrap(), demo::DemoConfig::default())
            .await
            .unwrap();
        let client = ApiClient::new(
            &server.api_url(),
            Some(demo::DEMO_ACCESS_TOKEN.to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        (server, client)
    }

    #[test]
    fn joins_paths_under_base_path() {
        let client = ApiClient::new("http://localhost:8000/api", None, None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/");
        assert_eq!(
            client.url("/chatbot/sessions/7/").unwrap().as_str(),
            "http://localhost:8000/api/chatbot/sessions/7/"
        );
    }

    #[test]
    fn rejects_unparsable_base() {
        let err = ApiClient::new("not a url", None, None).err().unwrap();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn status_error_reads_json_or_text() {
        let err = status_error(StatusCode::NOT_FOUND, br#"{"success":false,"error":"gone"}"#);
        assert_eq!(err.summary(), "gone");

        let err = status_error(StatusCode::BAD_GATEWAY, b"upstream down\n");
        assert_eq!(err.summary(), "upstream down");
    }

    #[tokio::test]
    async fn chat_binds_session_and_continues_it() {
        let (server, client) = start().await;

        let first = client.chat("How do I stage files in git?", None).await.unwrap();
        assert!(first.success);
        let session_id = first.session_id.unwrap();
        assert!(first.message_id.is_some());
        assert!(!first.data.unwrap().response.is_empty());

        let second = client
            .chat("And commit them?", Some(session_id))
            .await
            .unwrap();
        assert_eq!(second.session_id, Some(session_id));

        let session = client.session(session_id).await.unwrap();
        assert_eq!(session.messages.len(), 4);
        assert_eq!(session.messages[0].role, Role::User);
        assert_eq!(session.title, "How do I stage files in git?");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn chat_failures_come_back_as_replies() {
        let (server, client) = start().await;

        let reply = client.chat("hello", Some(SessionId(999))).await.unwrap();
        assert!(!reply.success);
        assert!(reply.error.is_some());

        let reply = client.chat("   ", None).await.unwrap();
        assert!(!reply.success);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn missing_token_is_a_status_error() {
        let (server, client) = start().await;
        client.set_token(None);
        assert!(!client.has_token());

        let err = client.sessions().await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn bookmark_round_trip() {
        let (server, client) = start().await;
        assert!(client.bookmarks().await.unwrap().is_empty());

        client
            .add_bookmark("Use git add.", &[Source::Snippet("git docs".to_string())])
            .await
            .unwrap();
        let bookmarks = client.bookmarks().await.unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].sources.len(), 1);

        client.delete_bookmark(bookmarks[0].id).await.unwrap();
        assert!(client.bookmarks().await.unwrap().is_empty());

        let err = client.delete_bookmark(bookmarks[0].id).await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn sessions_list_and_delete() {
        let (server, client) = start().await;
        let reply = client.chat("What is a python list?", None).await.unwrap();
        let id = reply.session_id.unwrap();

        let sessions = client.sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].message_total(), 2);

        client.delete_session(id).await.unwrap();
        assert!(client.sessions().await.unwrap().is_empty());
        assert_eq!(client.session(id).await.unwrap_err().status(), Some(404));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn history_filters_and_paginates() {
        let (server, client) = start().await;
        for question in ["git rebase?", "git stash?", "python venv?"] {
            client.chat(question, None).await.unwrap();
        }

        let all = client
            .history(&HistoryQuery {
                limit: 2,
                offset: 0,
                category: None,
            })
            .await
            .unwrap();
        assert_eq!(all.count, 3);
        assert_eq!(all.results.len(), 2);

        let git = client
            .history(&HistoryQuery {
                limit: 20,
                offset: 0,
                category: Some(Category::Git),
            })
            .await
            .unwrap();
        assert_eq!(git.count, 2);
        assert!(git.results.iter().all(|e| e.category == "git"));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn feedback_shows_up_in_history() {
        let (server, client) = start().await;
        let reply = client.chat("git log?", None).await.unwrap();
        client
            .feedback(reply.message_id.unwrap(), true)
            .await
            .unwrap();

        let page = client
            .history(&HistoryQuery {
                limit: 20,
                offset: 0,
                category: None,
            })
            .await
            .unwrap();
        assert_eq!(page.results[0].is_helpful, Some(true));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn analytics_reports_data_after_first_question() {
        let (server, client) = start().await;
        assert!(!client.analytics(30).await.unwrap().has_data);

        client.chat("python decorators?", None).await.unwrap();
        let snapshot = client.analytics(30).await.unwrap();
        assert!(snapshot.has_data);
        assert_eq!(snapshot.total_questions, 1);
        assert_eq!(
            snapshot.favorite_category.map(|c| c.name),
            Some("python".to_string())
        );

        server.shutdown().await;
    }

    #[tokio::test]
    async fn logout_accepts_refresh_token() {
        let (server, client) = start().await;
        client.logout("refresh-token").await.unwrap();
        server.shutdown().await;
    }
}
