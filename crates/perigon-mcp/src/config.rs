//! Configuration for the Perigon MCP server.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Perigon v1 API.
    pub const PERIGON_API: &str = "https://api.perigon.io/v1";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Window of the per-credential request counter.
    pub const RATE_WINDOW: Duration = Duration::from_secs(60);
}

/// LLM settings for the chat endpoint (OpenAI-compatible chat completions).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,

    /// Provider API key.
    pub api_key: String,

    /// Model name.
    pub model: String,

    /// Upper bound on model round-trips per chat request.
    pub max_steps: usize,
}

impl LlmConfig {
    /// Default number of model round-trips per chat request.
    pub const DEFAULT_MAX_STEPS: usize = 5;

    /// Provider used when no base URL is given.
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

    /// Create LLM settings with the default step budget.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Perigon API key used by the stdio transport (HTTP callers bring their own).
    pub api_key: Option<String>,

    /// Base URL for the Perigon API (overridable for mock servers).
    pub perigon_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Requests allowed per credential per window; `None` disables the counter.
    pub rate_limit_per_minute: Option<u32>,

    /// Chat endpoint LLM settings; the endpoint answers 503 when absent.
    pub llm: Option<LlmConfig>,
}

impl Config {
    /// Create a new configuration with an optional stdio API key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            perigon_api_url: api::PERIGON_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit_per_minute: None,
            llm: None,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            perigon_api_url: format!("{}/v1", base_url.trim_end_matches('/')),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_per_minute: None,
            llm: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `PERIGON_API_KEY`, `PERIGON_API_URL`, `RATE_LIMIT_PER_MINUTE`
    /// and the `LLM_*` chat settings (chat is enabled by `LLM_API_KEY`).
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(std::env::var("PERIGON_API_KEY").ok());

        if let Ok(url) = std::env::var("PERIGON_API_URL") {
            config.perigon_api_url = validate_base_url(&url)?;
        }

        if let Ok(limit) = std::env::var("RATE_LIMIT_PER_MINUTE") {
            config.rate_limit_per_minute = Some(limit.parse()?);
        }

        if let Ok(api_key) = std::env::var("LLM_API_KEY") {
            let base_url = std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| LlmConfig::OPENAI_BASE_URL.to_string());
            let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
            config.llm = Some(LlmConfig::new(validate_base_url(&base_url)?, api_key, model));
        }

        Ok(config)
    }

    /// Check if a stdio API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Parse a base URL and return it without a trailing slash.
pub fn validate_base_url(raw: &str) -> anyhow::Result<String> {
    let parsed = url::Url::parse(raw)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("unsupported URL scheme '{}' in {raw}", parsed.scheme());
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(!config.has_api_key());
        assert_eq!(config.perigon_api_url, api::PERIGON_API);
        assert!(config.rate_limit_per_minute.is_none());
    }

    #[test]
    fn test_config_for_testing_appends_version() {
        let config = Config::for_testing("http://127.0.0.1:4000/");
        assert_eq!(config.perigon_api_url, "http://127.0.0.1:4000/v1");
    }

    #[test]
    fn test_validate_base_url() {
        assert_eq!(validate_base_url("https://api.example.com/v1/").unwrap(), "https://api.example.com/v1");
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }
}
