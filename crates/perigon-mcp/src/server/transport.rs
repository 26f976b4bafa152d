//! HTTP transport.
//!
//! One router serves the MCP transports (streamable HTTP on `/mcp`, legacy
//! SSE on `/sse` + `/message`), the direct tool and chat endpoints under
//! `/api`, and health probes. MCP sessions keep a ring buffer of events so a
//! reconnecting SSE client can resume with `Last-Event-ID`.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::api::{self, ApiError};
use super::auth::Credential;
use super::protocol::{JsonRpcRequest, JsonRpcResponse, codes, handle_request};
use super::rate_limit::RequestCounter;
use super::session::{BufferedEvent, McpConnection, Session, SessionManager};
use crate::chat::{ChatService, OpenAiCompatibleModel};
use crate::client::PerigonClient;
use crate::config::{Config, api as api_config};
use crate::error::DispatchError;
use crate::tools::{ToolContext, ToolRegistry};

/// Session header of the streamable HTTP transport.
const SESSION_HEADER: &str = "Mcp-Session-Id";

/// Shared state for HTTP handlers.
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    /// Client without a credential; each request gets a keyed copy.
    pub client: PerigonClient,
    pub sessions: SessionManager,
    pub counter: Option<RequestCounter>,
    pub chat: Option<ChatService>,
    /// Public base URL used in the legacy `endpoint` event.
    pub base_url: String,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built.
    pub fn new(config: &Config, base_url: String) -> anyhow::Result<Self> {
        let registry = Arc::new(ToolRegistry::new());
        let client = PerigonClient::new(config)?;

        let chat = match &config.llm {
            Some(llm) => {
                let model = OpenAiCompatibleModel::new(llm)?;
                tracing::info!(model = %llm.model, "Chat endpoint enabled");
                Some(ChatService::new(Arc::new(model), Arc::clone(&registry), llm.max_steps))
            }
            None => None,
        };

        let counter = config
            .rate_limit_per_minute
            .map(|limit| RequestCounter::new(limit, api_config::RATE_WINDOW));

        Ok(Self {
            registry,
            client,
            sessions: SessionManager::new(),
            counter,
            chat,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Replace the chat service.
    #[must_use]
    pub fn with_chat(mut self, chat: ChatService) -> Self {
        self.chat = Some(chat);
        self
    }

    /// Tool context that calls the API with the caller's key.
    #[must_use]
    pub fn context_for(&self, credential: &Credential) -> ToolContext {
        ToolContext::new(self.client.with_api_key(credential.api_key()))
    }

    /// Count one request against the caller's window.
    ///
    /// # Errors
    ///
    /// Returns a 429 [`ApiError`] when the window is exhausted.
    pub async fn count_request(&self, credential: &Credential) -> Result<(), ApiError> {
        self.count_for(&credential.fingerprint()).await
    }

    async fn count_for(&self, owner: &str) -> Result<(), ApiError> {
        let Some(counter) = &self.counter else {
            return Ok(());
        };
        counter.check(owner).await.map_err(|retry_after| {
            tracing::info!(owner, "Request counter exceeded");
            ApiError::rate_limited(retry_after)
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("base_url", &self.base_url)
            .field("chat", &self.chat.is_some())
            .field("counter", &self.counter.is_some())
            .finish_non_exhaustive()
    }
}

/// Session id from the query string (legacy transport, browser clients).
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Streamable HTTP transport
        .route("/mcp", post(handle_mcp_post).get(handle_mcp_get).delete(handle_mcp_delete))
        // Legacy SSE transport
        .route("/sse", get(handle_sse_legacy))
        .route("/message", post(handle_message_post))
        .route("/sessions", get(handle_sessions_list))
        .route("/api/tools", get(api::list_tools).post(api::call_tool))
        .route("/api/chat", post(api::chat))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "perigon-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ready",
        "service": "perigon-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.session_count().await,
        "tools": state.registry.list().len(),
        "chat": state.chat.is_some()
    }))
}

async fn handle_sessions_list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({"count": state.sessions.session_count().await}))
}

fn auth_required(id: Option<serde_json::Value>) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(JsonRpcResponse::dispatch_error(id, &DispatchError::AuthenticationRequired)),
    )
        .into_response()
}

fn session_id(headers: &HeaderMap, query: SessionQuery) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or(query.session_id)
}

fn last_event_id(headers: &HeaderMap) -> u64 {
    headers
        .get("Last-Event-ID")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn with_session_header(mut response: Response, session: &Session) -> Response {
    if let Ok(value) = HeaderValue::from_str(&session.id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

/// Find the caller's session or open one.
///
/// A known session id is enough to continue a session; a credential that
/// belongs to someone else is rejected. New sessions need a credential.
async fn resolve_session(
    state: &AppState,
    session_id: Option<&str>,
    credential: Option<&Credential>,
) -> Option<Arc<Session>> {
    if let Some(id) = session_id {
        if let Some(session) = state.sessions.get_session(id).await {
            return match credential {
                Some(c) if c.fingerprint() != session.owner => {
                    tracing::warn!(session_id = %id, "Credential does not match session owner");
                    None
                }
                _ => Some(session),
            };
        }
        tracing::debug!(session_id = %id, "Unknown session id");
    }

    let credential = credential?;
    let connection = McpConnection::new(state.context_for(credential));
    Some(state.sessions.create_session(credential.fingerprint(), connection).await)
}

async fn dispatch(
    state: &AppState,
    session: &Session,
    req: &JsonRpcRequest,
) -> Result<Option<JsonRpcResponse>, ApiError> {
    tracing::debug!(session_id = %session.id, method = %req.method, "Handling MCP request");
    if req.method == "tools/call" {
        state.count_for(&session.owner).await?;
    }
    Ok(handle_request(req, &state.registry, &session.connection).await)
}

fn parse_error(rejection: &JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(JsonRpcResponse::error(None, codes::PARSE_ERROR, rejection.body_text())),
    )
        .into_response()
}

/// POST /mcp: one JSON-RPC message, answered inline.
async fn handle_mcp_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    credential: Option<Credential>,
    body: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return parse_error(&rejection),
    };

    let id = session_id(&headers, query);
    let Some(session) = resolve_session(&state, id.as_deref(), credential.as_ref()).await else {
        return auth_required(req.id);
    };

    let response = match dispatch(&state, &session, &req).await {
        Ok(Some(response)) => {
            if req.method == "tools/call" {
                if let Ok(data) = serde_json::to_string(&response) {
                    session.push_event("message", data).await;
                }
            }
            Json(response).into_response()
        }
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        Err(err) => err.into_response(),
    };

    with_session_header(response, &session)
}

/// DELETE /mcp: close a session.
async fn handle_mcp_delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
) -> StatusCode {
    match session_id(&headers, query) {
        Some(id) if state.sessions.remove_session(&id).await => StatusCode::NO_CONTENT,
        _ => StatusCode::NOT_FOUND,
    }
}

/// POST /message: legacy transport; the response is delivered on the SSE stream.
async fn handle_message_post(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    credential: Option<Credential>,
    body: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return parse_error(&rejection),
    };

    let Some(id) = query.session_id else {
        return (StatusCode::BAD_REQUEST, "Missing sessionId").into_response();
    };
    let Some(session) = state.sessions.get_session(&id).await else {
        return (StatusCode::NOT_FOUND, "Unknown session").into_response();
    };
    if credential.is_some_and(|c| c.fingerprint() != session.owner) {
        return auth_required(req.id);
    }

    match dispatch(&state, &session, &req).await {
        Ok(Some(response)) => match serde_json::to_string(&response) {
            Ok(data) => {
                session.push_event("message", data).await;
                StatusCode::ACCEPTED.into_response()
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize response");
                ApiError::internal().into_response()
            }
        },
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        Err(err) => err.into_response(),
    }
}

fn sse_response<S>(stream: S) -> Response
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    (
        [
            ("X-Accel-Buffering", "no"),
            ("Cache-Control", "no-cache, no-store, must-revalidate"),
        ],
        Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping")),
    )
        .into_response()
}

/// GET /mcp: SSE stream of session events with `Last-Event-ID` replay.
async fn handle_mcp_get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
    credential: Option<Credential>,
) -> Response {
    let last_event_id = last_event_id(&headers);
    let id = session_id(&headers, query);
    let Some(session) = resolve_session(&state, id.as_deref(), credential.as_ref()).await else {
        return auth_required(None);
    };

    tracing::info!(session_id = %session.id, last_event_id, "New SSE stream connection");

    let stream = build_sse_stream(Arc::clone(&session), last_event_id).await;
    with_session_header(sse_response(stream), &session)
}

/// Replay missed events, then follow live ones.
async fn build_sse_stream(
    session: Arc<Session>,
    last_event_id: u64,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let missed = session.events_after(last_event_id).await;
    let replay = stream::iter(missed.into_iter().map(|e| {
        tracing::debug!(event_id = e.id, "Replaying missed event");
        Ok::<_, Infallible>(e.to_sse_event())
    }));

    let live = BroadcastStream::new(session.subscribe()).filter_map(
        |result: Result<BufferedEvent, _>| async move {
            match result {
                Ok(event) => Some(Ok(event.to_sse_event())),
                Err(e) => {
                    tracing::debug!(error = %e, "Broadcast lag, client will catch up");
                    None
                }
            }
        },
    );

    replay.chain(live)
}

/// GET /sse: legacy transport. Opens a session and announces its POST endpoint.
async fn handle_sse_legacy(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    credential: Option<Credential>,
) -> Response {
    let Some(credential) = credential else {
        return ApiError::from(DispatchError::AuthenticationRequired).into_response();
    };

    let connection = McpConnection::new(state.context_for(&credential));
    let session = state.sessions.create_session(credential.fingerprint(), connection).await;
    let endpoint = format!("{}/message?sessionId={}", state.base_url, session.id);

    tracing::info!(
        session_id = %session.id,
        last_event_id = last_event_id(&headers),
        "New legacy SSE connection"
    );

    // The endpoint event is buffered too, so it is replayed first.
    session.push_event("endpoint", endpoint).await;

    let stream = build_sse_stream(Arc::clone(&session), 0).await;
    sse_response(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("from-header"));
        let query = SessionQuery { session_id: Some("from-query".into()) };
        assert_eq!(session_id(&headers, query).as_deref(), Some("from-header"));

        let query = SessionQuery { session_id: Some("from-query".into()) };
        assert_eq!(session_id(&HeaderMap::new(), query).as_deref(), Some("from-query"));
    }

    #[test]
    fn test_last_event_id_defaults_to_zero() {
        let mut headers = HeaderMap::new();
        assert_eq!(last_event_id(&headers), 0);
        headers.insert("Last-Event-ID", HeaderValue::from_static("42"));
        assert_eq!(last_event_id(&headers), 42);
    }
}
