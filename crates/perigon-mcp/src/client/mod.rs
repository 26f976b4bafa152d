//! Perigon API client.
//!
//! Provides an async HTTP client with:
//! - Connection pooling via reqwest
//! - Request logging middleware
//! - Per-request API key (one shared pool, many callers)

mod middleware;
mod params;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;

pub use middleware::RequestLogger;
pub use params::QueryParams;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Article, ArticleSearchInput, Company, CompanySearchInput, Introspection, Journalist,
    JournalistSearchInput, PeopleSearchInput, Person, ScoredWikiPage, SearchResponse, Source,
    SourceSearchInput, Story, StorySearchInput, Topic, TopicSearchInput, WikiPage,
    WikipediaSearchInput, WikipediaVectorInput,
};

/// Header carrying the Perigon API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Perigon API client.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct PerigonClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// API key sent with every request.
    api_key: Option<String>,

    /// API base URL (ends in `/v1`).
    base_url: String,
}

impl PerigonClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let client = ClientBuilder::new(client).with(RequestLogger).build();

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.perigon_api_url.trim_end_matches('/').to_string(),
        })
    }

    /// A client sharing this pool but authenticating with another key.
    #[must_use]
    pub fn with_api_key(&self, api_key: impl Into<String>) -> Self {
        Self { api_key: Some(api_key.into()), ..self.clone() }
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search news articles.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_articles(
        &self,
        input: &ArticleSearchInput,
    ) -> ClientResult<SearchResponse<Article>> {
        self.get("/all", &input.to_params()).await
    }

    /// Search story clusters.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_stories(
        &self,
        input: &StorySearchInput,
    ) -> ClientResult<SearchResponse<Story>> {
        self.get("/stories/all", &input.to_params()).await
    }

    /// Search journalists.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_journalists(
        &self,
        input: &JournalistSearchInput,
    ) -> ClientResult<SearchResponse<Journalist>> {
        self.get("/journalists/all", &input.to_params()).await
    }

    /// Search news sources.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_sources(
        &self,
        input: &SourceSearchInput,
    ) -> ClientResult<SearchResponse<Source>> {
        self.get("/sources/all", &input.to_params()).await
    }

    /// Search people.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_people(
        &self,
        input: &PeopleSearchInput,
    ) -> ClientResult<SearchResponse<Person>> {
        self.get("/people/all", &input.to_params()).await
    }

    /// Search companies.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_companies(
        &self,
        input: &CompanySearchInput,
    ) -> ClientResult<SearchResponse<Company>> {
        self.get("/companies/all", &input.to_params()).await
    }

    /// Search topics.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_topics(
        &self,
        input: &TopicSearchInput,
    ) -> ClientResult<SearchResponse<Topic>> {
        self.get("/topics", &input.to_params()).await
    }

    /// Keyword search over Wikipedia pages.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_wikipedia(
        &self,
        input: &WikipediaSearchInput,
    ) -> ClientResult<SearchResponse<WikiPage>> {
        self.get("/wikipedia/all", &input.to_params()).await
    }

    /// Semantic search over Wikipedia pages.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_wikipedia_vector(
        &self,
        input: &WikipediaVectorInput,
    ) -> ClientResult<SearchResponse<ScoredWikiPage>> {
        self.post("/vector/wikipedia/all", &input.to_body()).await
    }

    /// Scopes granted to the current key.
    ///
    /// # Errors
    ///
    /// Returns error on API failure, including an unauthorized key.
    pub async fn introspect(&self) -> ClientResult<Introspection> {
        self.get("/auth/introspect", &QueryParams::new()).await
    }

    fn api_key(&self) -> ClientResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ClientError::unauthorized(401, "no Perigon API key provided"))
    }

    /// Make a GET request.
    async fn get<T>(&self, path: &str, params: &QueryParams) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, self.api_key()?)
            .query(params.as_slice())
            .send()
            .await?;

        let response = Self::handle_response(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    /// Make a POST request with a JSON body.
    async fn post<T>(&self, path: &str, body: &serde_json::Value) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key()?)
            .json(body)
            .send()
            .await?;

        let response = Self::handle_response(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            401 | 403 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::unauthorized(status.as_u16(), text))
            }
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 | 422 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

impl std::fmt::Debug for PerigonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerigonClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.has_api_key())
            .finish()
    }
}
