//! Direct tool endpoint and chat endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::auth::Credential;
use super::transport::AppState;
use crate::chat::ChatRequest;
use crate::error::DispatchError;

/// JSON error body: `{error, code, details?}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
    retry_after: Option<Duration>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl ApiError {
    /// Error with a status, a stable code and a human-readable message.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), details: None, retry_after: None }
    }

    /// 400 `BAD_REQUEST`, used for malformed bodies.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Request counter exceeded; `retry_after` becomes the `Retry-After` header.
    #[must_use]
    pub fn rate_limited(retry_after: Duration) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::new(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", "Too many requests")
        }
    }

    /// 503 `CHAT_UNAVAILABLE`: no LLM provider is configured.
    #[must_use]
    pub fn chat_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "CHAT_UNAVAILABLE",
            "Chat is not configured on this server",
        )
    }

    /// 500 `INTERNAL_ERROR`; details stay in the logs.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal server error")
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            details: err.field_errors().map(|fields| json!(fields)),
            ..Self::new(status, err.code(), err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: &self.message, code: self.code, details: self.details.as_ref() };
        let mut response = (self.status, Json(body)).into_response();
        if let Some(retry_after) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after.as_secs().max(1)));
        }
        response
    }
}

/// Body of `POST /api/tools`.
#[derive(Debug, Deserialize)]
pub struct ToolCallRequest {
    /// Tool name, e.g. `search_news_articles`.
    pub tool: String,
    /// Raw arguments; omitted means `{}`.
    #[serde(default)]
    pub args: Value,
}

/// `GET /api/tools`: the full catalog.
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<Value> {
    let tools: Vec<Value> = state
        .registry
        .list()
        .into_iter()
        .map(|t| json!({"name": t.name, "description": t.description, "args": t.input_schema}))
        .collect();
    Json(json!({"tools": tools}))
}

/// `POST /api/tools`: execute one tool with the caller's credential.
///
/// The result is the envelope's text; tool failures arrive as `Error: ...`
/// text with a 200 status.
pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    body: Result<Json<ToolCallRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body?;
    state.count_request(&credential).await?;

    let ctx = state.context_for(&credential);
    let output = state.registry.execute(&request.tool, &request.args, &ctx).await?;
    Ok(Json(json!({"result": output.as_text()})))
}

/// `POST /api/chat`: run a conversation and stream its events.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Some(service) = state.chat.as_ref() else {
        return Err(ApiError::chat_unavailable());
    };
    let Json(request) = body?;
    if request.messages.is_empty() {
        return Err(ApiError::bad_request("messages must not be empty"));
    }
    state.count_request(&credential).await?;

    tracing::info!(
        owner = %credential.fingerprint(),
        messages = request.messages.len(),
        "Starting chat"
    );

    let today = chrono::Utc::now().date_naive();
    let events = service
        .stream(state.context_for(&credential), request.messages, today)
        .map(|event| Event::default().event(event.name()).json_data(&event));

    Ok((
        [("X-Accel-Buffering", "no"), ("Cache-Control", "no-cache, no-store, must-revalidate")],
        Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping")),
    )
        .into_response())
}
