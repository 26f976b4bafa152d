//! Perigon MCP Server
//!
//! Exposes the Perigon news API as a catalog of LLM-callable tools: nine
//! search tools (articles, stories, journalists, sources, people, companies,
//! topics, Wikipedia) and four use-case tools that combine an entity lookup
//! with a news search.
//!
//! The catalog is served three ways:
//!
//! - **MCP** over stdio, streamable HTTP and legacy SSE, with the tool list
//!   gated by the caller's API key scopes
//! - **`/api/tools`** for direct execution
//! - **`/api/chat`**, an LLM conversation that calls tools and streams events
//!
//! # Example
//!
//! ```no_run
//! use perigon_mcp::{PerigonClient, ToolContext, ToolRegistry, config::Config};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = PerigonClient::new(&config)?;
//!     let registry = ToolRegistry::new();
//!
//!     let output = registry
//!         .execute("search_news_articles", &json!({"query": "chip exports"}), &ToolContext::new(client))
//!         .await?;
//!     println!("{}", output.as_text());
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod gating;
pub mod models;
pub mod schema;
pub mod server;
pub mod tools;

pub use client::PerigonClient;
pub use config::Config;
pub use error::{ClientError, DispatchError, ToolError};
pub use tools::{ToolContext, ToolName, ToolOutput, ToolRegistry};
