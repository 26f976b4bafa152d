//! Error types for the Perigon MCP server.
//!
//! Three layers, each a `thiserror` enum:
//! - [`ClientError`]: the outbound HTTP call to the Perigon API failed.
//! - [`ToolError`]: a tool handler failed; rendered into an `Error:` envelope.
//! - [`DispatchError`]: the call never reached a handler (unknown tool,
//!   invalid arguments) or the caller must re-authenticate.

use std::time::Duration;

use serde::Serialize;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the Perigon API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Credential missing, invalid or lacking access (401/403 response)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(status: u16, message: impl Into<String>) -> Self {
        Self::Unauthorized { status, message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if the credential was rejected upstream.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from tool handler execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Error from the API client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal tool logic error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if the upstream API rejected the caller's credential.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Client(err) if err.is_unauthorized())
    }

    /// Convert to a short user-facing message (without the `Error:` prefix).
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(ClientError::RateLimited { retry_after }) => {
                format!(
                    "Rate limited by the Perigon API. Please wait {}s before retrying.",
                    retry_after.as_secs()
                )
            }
            Self::Client(ClientError::BadRequest { message }) => {
                format!("The Perigon API rejected the request: {message}")
            }
            Self::Client(ClientError::NotFound { resource }) => {
                format!("Not found: {resource}")
            }
            Self::Client(ClientError::Server { status, .. }) => {
                format!("The Perigon API is unavailable (status {status}). Try again later.")
            }
            Self::Client(ClientError::Http(_) | ClientError::Middleware(_)) => {
                "Could not reach the Perigon API.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears in the tool's input schema.
    pub field: String,
    /// What is wrong with the supplied value.
    pub problem: String,
}

impl FieldError {
    /// Create a field error.
    #[must_use]
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self { field: field.into(), problem: problem.into() }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Errors raised before (or instead of) producing an envelope.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    /// No tool with this name is registered (or visible to the caller).
    #[error("Unknown tool: {name}")]
    UnknownTool {
        /// Requested tool name
        name: String,
    },

    /// Arguments failed schema validation.
    #[error("Invalid arguments: {}", join_field_errors(.0))]
    InvalidArguments(Vec<FieldError>),

    /// The caller has no credential, or the upstream API rejected it.
    #[error("Authentication required")]
    AuthenticationRequired,
}

impl DispatchError {
    /// Create an unknown tool error.
    #[must_use]
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    /// Stable machine-readable code for transport error bodies.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownTool { .. } => "TOOL_NOT_FOUND",
            Self::InvalidArguments(_) => "INVALID_ARGUMENTS",
            Self::AuthenticationRequired => "AUTH_REQUIRED",
        }
    }

    /// HTTP status used by the direct tool endpoint.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::UnknownTool { .. } => 404,
            Self::InvalidArguments(_) => 400,
            Self::AuthenticationRequired => 401,
        }
    }

    /// Field-level details, if any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::InvalidArguments(errors) => Some(errors),
            _ => None,
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Errors from the chat model provider.
#[derive(thiserror::Error, Debug)]
pub enum ChatError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("Model provider error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Malformed provider response
    #[error("Failed to parse model response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Provider returned no choices
    #[error("Model returned an empty reply")]
    EmptyReply,
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
