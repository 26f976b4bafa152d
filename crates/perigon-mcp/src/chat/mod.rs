//! LLM chat over the tool catalog.
//!
//! A bounded step loop: each step asks the model for a turn, runs any tool
//! calls it requests (with one repair attempt per call), and feeds the
//! results back. Progress is streamed as [`ChatEvent`]s.

pub mod model;
pub mod prompt;
pub mod repair;

use std::sync::Arc;

use chrono::NaiveDate;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use model::{ChatMessage, ChatModel, ModelReply, OpenAiCompatibleModel, Role, ToolCall, ToolDeclaration};
use repair::{CallFailure, RepairStrategy, argument_repair_messages, error_retry_messages, parse_json_object};

use crate::error::DispatchError;
use crate::tools::{ToolContext, ToolName, ToolRegistry};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, oldest first. The system prompt is added server-side.
    pub messages: Vec<ChatMessage>,
}

/// Why the step loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model answered without requesting tools.
    Stop,
    /// The step budget ran out.
    MaxSteps,
}

/// One streamed chat event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChatEvent {
    /// Assistant text for the current step.
    Text {
        /// The text.
        text: String,
    },
    /// The model requested a tool call.
    ToolCall {
        /// Call id, shared by the matching result or error.
        id: String,
        /// Tool name.
        name: String,
        /// Arguments as the model sent them.
        args: Value,
    },
    /// A call (possibly repaired) succeeded.
    ToolResult {
        /// Call id.
        id: String,
        /// Tool name.
        name: String,
        /// Envelope text.
        result: String,
    },
    /// A call failed, after at most one repair.
    ToolError {
        /// Call id.
        id: String,
        /// Tool name.
        name: String,
        /// Failure message fed back to the model.
        error: String,
    },
    /// The loop ended.
    Finish {
        /// Why it ended.
        reason: FinishReason,
        /// Model turns used.
        steps: usize,
    },
    /// The model provider failed; the stream ends.
    Error {
        /// Provider error.
        message: String,
    },
}

impl ChatEvent {
    /// SSE event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::ToolCall { .. } => "tool-call",
            Self::ToolResult { .. } => "tool-result",
            Self::ToolError { .. } => "tool-error",
            Self::Finish { .. } => "finish",
            Self::Error { .. } => "error",
        }
    }
}

/// Runs conversations against a [`ChatModel`] with the full tool catalog.
#[derive(Clone)]
pub struct ChatService {
    model: Arc<dyn ChatModel>,
    registry: Arc<ToolRegistry>,
    max_steps: usize,
}

impl ChatService {
    /// Create a service; `max_steps` is at least 1.
    #[must_use]
    pub fn new(model: Arc<dyn ChatModel>, registry: Arc<ToolRegistry>, max_steps: usize) -> Self {
        Self { model, registry, max_steps: max_steps.max(1) }
    }

    fn declarations(&self) -> Vec<ToolDeclaration> {
        self.registry
            .list()
            .into_iter()
            .map(|info| ToolDeclaration {
                name: info.name.to_string(),
                description: info.description.to_string(),
                parameters: info.input_schema,
            })
            .collect()
    }

    /// Stream a conversation. Tool calls run with `ctx`'s credential.
    pub fn stream(
        &self,
        ctx: ToolContext,
        messages: Vec<ChatMessage>,
        today: NaiveDate,
    ) -> impl Stream<Item = ChatEvent> + Send + 'static {
        let service = self.clone();

        async_stream::stream! {
            let declarations = service.declarations();
            let mut conversation = Vec::with_capacity(messages.len() + 1);
            conversation.push(ChatMessage::system(prompt::system_prompt(today)));
            conversation.extend(messages);

            for step in 1..=service.max_steps {
                let reply = match service.model.complete(&conversation, &declarations).await {
                    Ok(reply) => reply,
                    Err(err) => {
                        tracing::warn!(step, error = %err, "Model turn failed");
                        yield ChatEvent::Error { message: err.to_string() };
                        return;
                    }
                };

                if !reply.text.is_empty() {
                    yield ChatEvent::Text { text: reply.text.clone() };
                }
                if reply.tool_calls.is_empty() {
                    yield ChatEvent::Finish { reason: FinishReason::Stop, steps: step };
                    return;
                }

                let history_len = conversation.len();
                conversation.push(ChatMessage::assistant(reply.text, reply.tool_calls.clone()));

                for call in reply.tool_calls {
                    yield ChatEvent::ToolCall {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        args: call.arguments.clone(),
                    };

                    let history = &conversation[..history_len];
                    let content = match service.run_call(&ctx, history, &declarations, &call).await {
                        Ok(result) => {
                            yield ChatEvent::ToolResult {
                                id: call.id.clone(),
                                name: call.name.clone(),
                                result: result.clone(),
                            };
                            result
                        }
                        Err(error) => {
                            yield ChatEvent::ToolError {
                                id: call.id.clone(),
                                name: call.name.clone(),
                                error: error.clone(),
                            };
                            error
                        }
                    };
                    conversation.push(ChatMessage::tool(call.id, content));
                }
            }

            tracing::info!(max_steps = service.max_steps, "Chat step budget exhausted");
            yield ChatEvent::Finish { reason: FinishReason::MaxSteps, steps: service.max_steps };
        }
    }

    /// Execute a call, repairing it at most once.
    async fn run_call(
        &self,
        ctx: &ToolContext,
        history: &[ChatMessage],
        declarations: &[ToolDeclaration],
        call: &ToolCall,
    ) -> Result<String, String> {
        let failure = match self.attempt(ctx, call).await {
            Ok(text) => return Ok(text),
            Err(failure) => failure,
        };

        let strategy = failure.strategy();
        tracing::debug!(tool = %call.name, ?strategy, "Tool call failed");

        let replacement = match strategy {
            RepairStrategy::None => None,
            RepairStrategy::RegenerateArguments => self.regenerate_arguments(call, &failure).await,
            RepairStrategy::RetryWithError => {
                self.replacement_call(history, declarations, call, &failure.message()).await
            }
        };

        let Some(replacement) = replacement else {
            return Err(failure.message());
        };

        tracing::info!(tool = %replacement.name, ?strategy, "Retrying repaired tool call");
        self.attempt(ctx, &replacement).await.map_err(|f| f.message())
    }

    async fn attempt(&self, ctx: &ToolContext, call: &ToolCall) -> Result<String, CallFailure> {
        match self.registry.execute(&call.name, &call.arguments, ctx).await {
            Ok(output) if output.is_error() => Err(CallFailure::Execution(output.as_text())),
            Ok(output) => Ok(output.as_text()),
            Err(err) => Err(CallFailure::Dispatch(err)),
        }
    }

    async fn regenerate_arguments(&self, call: &ToolCall, failure: &CallFailure) -> Option<ToolCall> {
        let CallFailure::Dispatch(DispatchError::InvalidArguments(errors)) = failure else {
            return None;
        };
        let tool: ToolName = call.name.parse().ok()?;
        let schema = self.registry.schema(tool)?.json_schema();

        let reply = self
            .model
            .complete(&argument_repair_messages(call, &schema, errors), &[])
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "Argument repair request failed"))
            .ok()?;

        // Accept either a bare JSON object or a call to the same tool.
        let arguments = parse_json_object(&reply.text).or_else(|| {
            reply.tool_calls.into_iter().find(|c| c.name == call.name).map(|c| c.arguments)
        })?;

        Some(ToolCall { id: call.id.clone(), name: call.name.clone(), arguments })
    }

    async fn replacement_call(
        &self,
        history: &[ChatMessage],
        declarations: &[ToolDeclaration],
        call: &ToolCall,
        error: &str,
    ) -> Option<ToolCall> {
        let reply = self
            .model
            .complete(&error_retry_messages(history, call, error), declarations)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "Retry request failed"))
            .ok()?;

        let mut replacement = reply.tool_calls.into_iter().next()?;
        replacement.id.clone_from(&call.id);
        Some(replacement)
    }
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService").field("max_steps", &self.max_steps).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = ChatEvent::ToolCall {
            id: "c1".into(),
            name: "search_sources".into(),
            args: serde_json::json!({}),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tool-call");
        assert_eq!(json["name"], "search_sources");
        assert_eq!(event.name(), "tool-call");

        let finish = ChatEvent::Finish { reason: FinishReason::MaxSteps, steps: 5 };
        assert_eq!(serde_json::to_value(&finish).unwrap()["reason"], "max_steps");
    }
}
