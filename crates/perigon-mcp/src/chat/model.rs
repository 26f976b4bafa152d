//! Chat model abstraction and an OpenAI-compatible implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::LlmConfig;
use crate::error::ChatError;

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), tool_calls: Vec::new(), tool_call_id: None }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    /// Assistant turn, possibly requesting tool calls.
    #[must_use]
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self { tool_calls, ..Self::plain(Role::Assistant, content) }
    }

    /// Result of a tool call, linked by call id.
    #[must_use]
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { tool_call_id: Some(call_id.into()), ..Self::plain(Role::Tool, content) }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Arguments as the model produced them; not yet validated.
    pub arguments: Value,
}

/// A tool offered to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments.
    pub parameters: Value,
}

/// One model turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

/// A chat completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce the next assistant turn.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDeclaration],
    ) -> Result<ModelReply, ChatError>;
}

/// Chat completions over the OpenAI wire format.
pub struct OpenAiCompatibleModel {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatibleModel {
    /// Build a model client from LLM settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .user_agent(concat!("perigon-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

impl std::fmt::Debug for OpenAiCompatibleModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleModel")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

#[derive(Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

fn function_kind() -> String {
    "function".to_string()
}

impl From<&ToolCall> for WireToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            kind: function_kind(),
            function: WireFunction { name: call.name.clone(), arguments: call.arguments.to_string() },
        }
    }
}

impl From<WireToolCall> for ToolCall {
    fn from(call: WireToolCall) -> Self {
        // Unparseable arguments are kept as a string so validation reports them.
        let arguments = if call.function.arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(&call.function.arguments)
                .unwrap_or(Value::String(call.function.arguments))
        };
        Self { id: call.id, name: call.function.name, arguments }
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDeclaration],
    ) -> Result<ModelReply, ChatError> {
        let wire_messages: Vec<WireMessage<'_>> = messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: &m.content,
                tool_calls: m.tool_calls.iter().map(WireToolCall::from).collect(),
                tool_call_id: m.tool_call_id.as_deref(),
            })
            .collect();

        let mut body = json!({"model": self.model, "messages": wire_messages});
        if !tools.is_empty() {
            body["tools"] = tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
        }

        let started = std::time::Instant::now();
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
            tracing::warn!(status = status.as_u16(), "Model provider request failed");
            return Err(ChatError::Status { status: status.as_u16(), message });
        }

        let bytes = response.bytes().await?;
        let completion: Completion = serde_json::from_slice(&bytes)?;
        let message = completion.choices.into_iter().next().ok_or(ChatError::EmptyReply)?.message;

        tracing::debug!(
            model = %self.model,
            tool_calls = message.tool_calls.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Model turn completed"
        );

        Ok(ModelReply {
            text: message.content.unwrap_or_default(),
            tool_calls: message.tool_calls.into_iter().map(ToolCall::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_arguments_parse() {
        let wire = WireToolCall {
            id: "c1".into(),
            kind: function_kind(),
            function: WireFunction {
                name: "search_news_articles".into(),
                arguments: r#"{"query":"tesla"}"#.into(),
            },
        };
        let call = ToolCall::from(wire);
        assert_eq!(call.arguments["query"], "tesla");
    }

    #[test]
    fn test_malformed_arguments_kept_as_string() {
        let wire = WireToolCall {
            id: "c1".into(),
            kind: function_kind(),
            function: WireFunction { name: "x".into(), arguments: "{not json".into() },
        };
        assert_eq!(ToolCall::from(wire).arguments, Value::String("{not json".into()));
    }

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::tool("c1", "done");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("c1"));
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, json!({"role": "user", "content": "hi"}));
    }
}
