//! MCP tool implementations.
//!
//! Each tool:
//! 1. Declares its input [`Schema`] (validated before `execute` runs)
//! 2. Calls the Perigon API client
//! 3. Formats results as compact pseudo-XML text

mod names;
mod registry;
mod search;
mod use_cases;

pub use names::{ToolCategory, ToolName};
pub use registry::{Content, ToolInfo, ToolOutput, ToolRegistry};

use crate::client::PerigonClient;
use crate::error::ToolResult;
use crate::schema::{Schema, Validated};

/// Tool execution context.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// API client carrying the caller's credential.
    pub client: PerigonClient,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub const fn new(client: PerigonClient) -> Self {
        Self { client }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Canonical tool name.
    fn name(&self) -> ToolName;

    /// Tool description for LLMs.
    fn description(&self) -> &'static str;

    /// Input schema. Arguments passed to [`McpTool::execute`] have already
    /// been validated against it.
    fn schema(&self) -> Schema;

    /// Execute the tool with validated input.
    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String>;
}

/// Build the tool for a name.
///
/// Exhaustive over [`ToolName`]: a new name without a handler does not compile.
#[must_use]
pub fn build_tool(name: ToolName) -> Box<dyn McpTool> {
    match name {
        ToolName::SearchNewsArticles => Box::new(search::SearchNewsArticles),
        ToolName::SearchNewsStories => Box::new(search::SearchNewsStories),
        ToolName::SearchJournalists => Box::new(search::SearchJournalists),
        ToolName::SearchSources => Box::new(search::SearchSources),
        ToolName::SearchPeople => Box::new(search::SearchPeople),
        ToolName::SearchCompanies => Box::new(search::SearchCompanies),
        ToolName::SearchTopics => Box::new(search::SearchTopics),
        ToolName::SearchWikipedia => Box::new(search::SearchWikipedia),
        ToolName::SearchWikipediaVector => Box::new(search::SearchWikipediaVector),
        ToolName::GetCompanyNews => Box::new(use_cases::GetCompanyNews),
        ToolName::GetPersonNews => Box::new(use_cases::GetPersonNews),
        ToolName::GetTopHeadlines => Box::new(use_cases::GetTopHeadlines),
        ToolName::GetLocationNews => Box::new(use_cases::GetLocationNews),
    }
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    ToolName::all().iter().copied().map(build_tool).collect()
}
