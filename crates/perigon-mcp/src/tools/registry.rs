//! Tool catalog and the execution adapter shared by every transport.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{McpTool, ToolCategory, ToolContext, ToolName, register_all_tools};
use crate::error::DispatchError;
use crate::schema::{Schema, Validated};

/// One content block of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
}

/// Uniform tool result envelope: `{"content":[{"type":"text","text":...}]}`.
///
/// Handler failures use the same shape with text starting with `Error:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Content blocks (always exactly one text block).
    pub content: Vec<Content>,
}

impl ToolOutput {
    /// Successful result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { content: vec![Content::Text { text: text.into() }] }
    }

    /// Failed result; the message is prefixed with `Error: `.
    #[must_use]
    pub fn error(message: impl AsRef<str>) -> Self {
        Self::text(format!("Error: {}", message.as_ref()))
    }

    /// All text blocks joined.
    #[must_use]
    pub fn as_text(&self) -> String {
        self.content
            .iter()
            .map(|Content::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether this envelope reports a handler failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.content.first(), Some(Content::Text { text }) if text.starts_with("Error:"))
    }
}

/// Catalog entry as shown to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    /// Tool name.
    pub name: ToolName,
    /// Tool description.
    pub description: &'static str,
    /// Tool family.
    pub category: ToolCategory,
    /// JSON Schema of the arguments.
    pub input_schema: Value,
}

struct Entry {
    tool: Box<dyn McpTool>,
    schema: Schema,
}

/// Immutable catalog of every tool, built once at startup.
pub struct ToolRegistry {
    entries: Vec<Entry>,
}

impl ToolRegistry {
    /// Build the registry with every tool.
    #[must_use]
    pub fn new() -> Self {
        let entries = register_all_tools()
            .into_iter()
            .map(|tool| {
                let schema = tool.schema();
                Entry { tool, schema }
            })
            .collect();
        Self { entries }
    }

    fn entry(&self, name: ToolName) -> Option<&Entry> {
        self.entries.iter().find(|e| e.tool.name() == name)
    }

    fn info(entry: &Entry) -> ToolInfo {
        ToolInfo {
            name: entry.tool.name(),
            description: entry.tool.description(),
            category: entry.tool.name().category(),
            input_schema: entry.schema.json_schema(),
        }
    }

    /// Every tool, in catalog order.
    #[must_use]
    pub fn list(&self) -> Vec<ToolInfo> {
        self.entries.iter().map(Self::info).collect()
    }

    /// Only the given tools, in catalog order.
    #[must_use]
    pub fn list_visible(&self, visible: &[ToolName]) -> Vec<ToolInfo> {
        self.entries
            .iter()
            .filter(|e| visible.contains(&e.tool.name()))
            .map(Self::info)
            .collect()
    }

    /// Look up one tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownTool`] if no tool has this name.
    pub fn get(&self, name: &str) -> Result<ToolInfo, DispatchError> {
        let tool: ToolName = name.parse()?;
        self.entry(tool).map(Self::info).ok_or_else(|| DispatchError::unknown_tool(name))
    }

    /// Input schema of a tool.
    #[must_use]
    pub fn schema(&self, name: ToolName) -> Option<&Schema> {
        self.entry(name).map(|e| &e.schema)
    }

    /// Resolve a name and validate arguments without executing.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownTool`] or [`DispatchError::InvalidArguments`].
    pub fn validate(&self, name: &str, args: &Value) -> Result<(ToolName, Validated), DispatchError> {
        let tool: ToolName = name.parse()?;
        let entry = self.entry(tool).ok_or_else(|| DispatchError::unknown_tool(name))?;
        let validated = entry.schema.validate(args).map_err(DispatchError::InvalidArguments)?;
        Ok((tool, validated))
    }

    /// Validate and execute a tool call.
    ///
    /// Handler failures come back as an `Error:` envelope; only dispatch
    /// problems and rejected credentials are returned as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] for unknown tools, invalid arguments, or an
    /// upstream 401/403.
    pub async fn execute(
        &self,
        name: &str,
        args: &Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, DispatchError> {
        let (tool, validated) = self.validate(name, args)?;
        let entry = self.entry(tool).ok_or_else(|| DispatchError::unknown_tool(name))?;

        let started = Instant::now();
        let result = entry.tool.execute(ctx, validated).await;
        let elapsed_ms = started.elapsed().as_millis();

        match result {
            Ok(text) => {
                tracing::info!(tool = %tool, elapsed_ms, "Tool executed");
                Ok(ToolOutput::text(text))
            }
            Err(err) if err.is_unauthorized() => {
                tracing::warn!(tool = %tool, error = %err, "Credential rejected upstream");
                Err(DispatchError::AuthenticationRequired)
            }
            Err(err) => {
                tracing::warn!(tool = %tool, elapsed_ms, error = %err, "Tool failed");
                Ok(ToolOutput::error(err.to_user_message()))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.entries.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_complete() {
        let registry = ToolRegistry::new();
        let names: Vec<ToolName> = registry.list().iter().map(|t| t.name).collect();
        assert_eq!(names, ToolName::all());
        for info in registry.list() {
            assert!(!info.description.is_empty());
            assert_eq!(info.input_schema["type"], "object");
        }
    }

    #[test]
    fn test_get_unknown() {
        let registry = ToolRegistry::new();
        assert!(matches!(
            registry.get("search_everything"),
            Err(DispatchError::UnknownTool { .. })
        ));
        assert_eq!(registry.get("search_sources").unwrap().name, ToolName::SearchSources);
    }

    #[test]
    fn test_envelope_shape() {
        let ok = ToolOutput::text("Got 1 articles (page 1 of 1)");
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"content": [{"type": "text", "text": "Got 1 articles (page 1 of 1)"}]})
        );
        assert!(!ok.is_error());

        let err = ToolOutput::error("Could not reach the Perigon API.");
        assert_eq!(err.as_text(), "Error: Could not reach the Perigon API.");
        assert!(err.is_error());
    }

    #[test]
    fn test_validate_reports_fields() {
        let registry = ToolRegistry::new();
        let err = registry
            .validate("search_news_articles", &serde_json::json!({"from": "yesterday", "size": "x"}))
            .unwrap_err();
        let fields: Vec<&str> =
            err.field_errors().unwrap().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["from", "size"]);
    }
}
