//! One-shot repair of failed model tool calls.
//!
//! | failure            | repair                                              |
//! |--------------------|-----------------------------------------------------|
//! | unknown tool       | none; the call fails                                |
//! | invalid arguments  | regenerate arguments for the same tool, retry once  |
//! | execution error    | feed the error back, execute one replacement call   |

use serde_json::{Value, json};

use super::model::{ChatMessage, ToolCall};
use crate::error::{DispatchError, FieldError};

/// What to do with a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    /// Give up on this call.
    None,
    /// Ask for corrected arguments to the same tool.
    RegenerateArguments,
    /// Ask for a replacement call after showing the error.
    RetryWithError,
}

impl RepairStrategy {
    /// Strategy for a dispatch failure.
    #[must_use]
    pub const fn for_dispatch(err: &DispatchError) -> Self {
        match err {
            DispatchError::InvalidArguments(_) => Self::RegenerateArguments,
            DispatchError::UnknownTool { .. } | DispatchError::AuthenticationRequired => Self::None,
        }
    }
}

/// Why a tool call did not produce a result.
#[derive(Debug)]
pub enum CallFailure {
    /// Rejected before reaching a handler.
    Dispatch(DispatchError),
    /// The handler ran and returned an `Error:` envelope.
    Execution(String),
}

impl CallFailure {
    /// Repair to attempt for this failure.
    #[must_use]
    pub const fn strategy(&self) -> RepairStrategy {
        match self {
            Self::Dispatch(err) => RepairStrategy::for_dispatch(err),
            Self::Execution(_) => RepairStrategy::RetryWithError,
        }
    }

    /// Text reported to the model and the client.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Dispatch(err) => err.to_string(),
            Self::Execution(text) => text.clone(),
        }
    }
}

/// Messages asking the model to fix arguments for `call`.
///
/// The conversation is standalone: the model sees only the schema, the
/// rejected arguments and the field errors.
#[must_use]
pub fn argument_repair_messages(
    call: &ToolCall,
    schema: &Value,
    errors: &[FieldError],
) -> Vec<ChatMessage> {
    let problems: Vec<String> = errors.iter().map(ToString::to_string).collect();
    let request = json!({
        "tool": call.name,
        "schema": schema,
        "arguments": call.arguments,
        "errors": problems,
    });

    vec![
        ChatMessage::system(
            "You correct tool call arguments. Reply with a single JSON object containing \
             the corrected arguments and nothing else.",
        ),
        ChatMessage::user(request.to_string()),
    ]
}

/// History extended with a failed call and its error, asking for a replacement.
///
/// `history` ends before the assistant turn that issued `call`; the turn is
/// replayed with only this call so every tool call in the request is answered.
#[must_use]
pub fn error_retry_messages(history: &[ChatMessage], call: &ToolCall, error: &str) -> Vec<ChatMessage> {
    let mut messages = history.to_vec();
    messages.push(ChatMessage::assistant("", vec![call.clone()]));
    messages.push(ChatMessage::tool(&call.id, error));
    messages.push(ChatMessage::user(format!(
        "The call to {} failed. Issue exactly one corrected tool call.",
        call.name
    )));
    messages
}

/// Extract a JSON object from a model reply, tolerating code fences.
#[must_use]
pub fn parse_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    if let Ok(value @ Value::Object(_)) = serde_json::from_str(body) {
        return Some(value);
    }

    // Prose around the object: take the outermost braces.
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    match serde_json::from_str(body.get(start..=end)?) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}
