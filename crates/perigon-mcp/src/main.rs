//! Perigon MCP Server - Entry Point
//!
//! Provides both stdio (for desktop MCP clients) and HTTP transports.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use perigon_mcp::config::{Config, LlmConfig, validate_base_url};
use perigon_mcp::server::McpServer;

#[derive(Parser, Debug)]
#[command(name = "perigon-mcp")]
#[command(about = "MCP server and tool API for the Perigon news API")]
#[command(version)]
struct Cli {
    /// Perigon API key for the stdio transport (HTTP callers send their own)
    #[arg(long, env = "PERIGON_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio")]
    transport: Transport,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Public base URL for SSE endpoint announcements
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// Perigon API base URL
    #[arg(long, env = "PERIGON_API_URL")]
    perigon_api_url: Option<String>,

    /// Requests per credential per minute on the HTTP transport
    #[arg(long, env = "RATE_LIMIT_PER_MINUTE")]
    rate_limit_per_minute: Option<u32>,

    /// OpenAI-compatible base URL for the chat endpoint
    #[arg(long, env = "LLM_BASE_URL", default_value = LlmConfig::OPENAI_BASE_URL)]
    llm_base_url: String,

    /// API key for the chat model provider
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    /// Chat model name
    #[arg(long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    llm_model: String,

    /// Maximum model round-trips per chat request
    #[arg(long, env = "LLM_MAX_STEPS", default_value_t = LlmConfig::DEFAULT_MAX_STEPS)]
    llm_max_steps: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output
    #[default]
    Stdio,
    /// HTTP with Server-Sent Events
    Http,
}

impl Cli {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config::new(self.api_key.clone());

        if let Some(url) = &self.perigon_api_url {
            config.perigon_api_url = validate_base_url(url)?;
        }
        config.rate_limit_per_minute = self.rate_limit_per_minute;

        if let Some(api_key) = &self.llm_api_key {
            let mut llm =
                LlmConfig::new(validate_base_url(&self.llm_base_url)?, api_key, &self.llm_model);
            llm.max_steps = self.llm_max_steps;
            config.llm = Some(llm);
        }

        Ok(config)
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout carries the stdio protocol, so logs go to stderr.
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting Perigon MCP server"
    );

    let server = McpServer::new(cli.config()?);

    match cli.transport {
        Transport::Stdio => {
            server.run_stdio().await?;
        }
        Transport::Http => {
            tracing::info!(port = cli.port, base_url = ?cli.base_url, "Running in HTTP mode");
            server.run_http(cli.port, cli.base_url).await?;
        }
    }

    Ok(())
}
