//! Typed tool inputs.
//!
//! Each struct is deserialized from arguments that already passed the tool's
//! [`Schema`](crate::schema::Schema), so defaults are filled in and strings
//! are normalized. Field names mirror the schema (camelCase).

use serde::{Deserialize, Serialize};

use crate::client::QueryParams;

/// Page selection. `page` is 1-based on every tool surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub size: u32,
}

impl Pagination {
    /// Page index as the Perigon API expects it (0-based).
    #[must_use]
    pub const fn api_page(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    fn apply(&self, params: &mut QueryParams) {
        params.push("page", self.api_page()).push("size", self.size);
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

/// Optional date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Lower bound (inclusive).
    #[serde(default)]
    pub from: Option<String>,
    /// Upper bound (inclusive).
    #[serde(default)]
    pub to: Option<String>,
}

impl DateRange {
    fn apply(&self, params: &mut QueryParams) {
        params.opt("from", self.from.as_deref()).opt("to", self.to.as_deref());
    }
}

/// Location filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilter {
    /// Lower-case country codes.
    #[serde(default)]
    pub countries: Vec<String>,
    /// Upper-case US state codes.
    #[serde(default)]
    pub states: Vec<String>,
    /// City names.
    #[serde(default)]
    pub cities: Vec<String>,
}

impl LocationFilter {
    fn apply(&self, params: &mut QueryParams) {
        params.all("country", &self.countries).all("state", &self.states).all("city", &self.cities);
    }
}

/// Input for `search_news_articles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSearchInput {
    /// Boolean search over title, description and content.
    #[serde(default)]
    pub query: Option<String>,
    /// Boolean search over titles only.
    #[serde(default)]
    pub title: Option<String>,
    /// Publisher domains.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Category names.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Language code.
    #[serde(default)]
    pub language: Option<String>,
    /// `date` or `relevance`.
    #[serde(default = "default_article_sort")]
    pub sort_by: String,
    /// Include syndicated copies.
    #[serde(default)]
    pub show_reprints: bool,
    /// Story cluster filter.
    #[serde(default)]
    pub cluster_id: Option<String>,
    /// Company ID filter (set by company news).
    #[serde(default)]
    pub company_id: Option<String>,
    /// Company name filter.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Person Wikidata ID filter (set by person news).
    #[serde(default)]
    pub person_wikidata_id: Option<String>,
    /// Person name filter.
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(flatten)]
    pub date_range: DateRange,
    #[serde(flatten)]
    pub location: LocationFilter,
    #[serde(flatten)]
    pub pagination: Pagination,
}

fn default_article_sort() -> String {
    "date".to_string()
}

impl Default for ArticleSearchInput {
    fn default() -> Self {
        Self {
            query: None,
            title: None,
            sources: Vec::new(),
            categories: Vec::new(),
            language: None,
            sort_by: default_article_sort(),
            show_reprints: false,
            cluster_id: None,
            company_id: None,
            company_name: None,
            person_wikidata_id: None,
            person_name: None,
            date_range: DateRange::default(),
            location: LocationFilter::default(),
            pagination: Pagination::default(),
        }
    }
}

impl ArticleSearchInput {
    /// Perigon query parameters.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .opt("q", self.query.as_deref())
            .opt("title", self.title.as_deref())
            .all("source", &self.sources)
            .all("category", &self.categories)
            .opt("language", self.language.as_deref())
            .push("sortBy", &self.sort_by)
            .push("showReprints", self.show_reprints)
            .opt("clusterId", self.cluster_id.as_deref())
            .opt("companyId", self.company_id.as_deref())
            .opt("companyName", self.company_name.as_deref())
            .opt("personWikidataId", self.person_wikidata_id.as_deref())
            .opt("personName", self.person_name.as_deref());
        self.date_range.apply(&mut params);
        self.location.apply(&mut params);
        self.pagination.apply(&mut params);
        params
    }
}

/// Input for `search_news_stories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySearchInput {
    /// Boolean search over story names and summaries.
    #[serde(default)]
    pub query: Option<String>,
    /// Story name search.
    #[serde(default)]
    pub name: Option<String>,
    /// Topic filter.
    #[serde(default)]
    pub topic: Option<String>,
    /// Category filter.
    #[serde(default)]
    pub category: Option<String>,
    /// `createdAt`, `updatedAt` or `count`.
    #[serde(default = "default_story_sort")]
    pub sort_by: String,
    /// Minimum distinct sources.
    #[serde(default)]
    pub min_unique_sources: Option<u32>,
    #[serde(flatten)]
    pub date_range: DateRange,
    #[serde(flatten)]
    pub location: LocationFilter,
    #[serde(flatten)]
    pub pagination: Pagination,
}

fn default_story_sort() -> String {
    "createdAt".to_string()
}

impl Default for StorySearchInput {
    fn default() -> Self {
        Self {
            query: None,
            name: None,
            topic: None,
            category: None,
            sort_by: default_story_sort(),
            min_unique_sources: None,
            date_range: DateRange::default(),
            location: LocationFilter::default(),
            pagination: Pagination::default(),
        }
    }
}

impl StorySearchInput {
    /// Perigon query parameters.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .opt("q", self.query.as_deref())
            .opt("name", self.name.as_deref())
            .opt("topic", self.topic.as_deref())
            .opt("category", self.category.as_deref())
            .push("sortBy", &self.sort_by)
            .opt("minUniqueSources", self.min_unique_sources);
        self.date_range.apply(&mut params);
        self.location.apply(&mut params);
        self.pagination.apply(&mut params);
        params
    }
}

/// Input for `search_journalists`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalistSearchInput {
    /// Search over names and bios.
    #[serde(default)]
    pub query: Option<String>,
    /// Name search.
    #[serde(default)]
    pub name: Option<String>,
    /// Twitter handle.
    #[serde(default)]
    pub twitter: Option<String>,
    /// Domains the journalist writes for.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Topic filter.
    #[serde(default)]
    pub topic: Option<String>,
    /// Category filter.
    #[serde(default)]
    pub category: Option<String>,
    /// Country filter.
    #[serde(default)]
    pub country: Option<String>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl JournalistSearchInput {
    /// Perigon query parameters.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .opt("q", self.query.as_deref())
            .opt("name", self.name.as_deref())
            .opt("twitter", self.twitter.as_deref())
            .all("source", &self.sources)
            .opt("topic", self.topic.as_deref())
            .opt("category", self.category.as_deref())
            .opt("country", self.country.as_deref());
        self.pagination.apply(&mut params);
        params
    }
}

/// Input for `search_sources`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSearchInput {
    /// Domains.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Publisher name.
    #[serde(default)]
    pub name: Option<String>,
    /// Category filter.
    #[serde(default)]
    pub category: Option<String>,
    /// Country filter.
    #[serde(default)]
    pub country: Option<String>,
    /// `globalRank`, `monthlyVisits` or `avgMonthlyPosts`.
    #[serde(default = "default_source_sort")]
    pub sort_by: String,
    #[serde(flatten)]
    pub pagination: Pagination,
}

fn default_source_sort() -> String {
    "globalRank".to_string()
}

impl SourceSearchInput {
    /// Perigon query parameters.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .all("domain", &self.domains)
            .opt("name", self.name.as_deref())
            .opt("category", self.category.as_deref())
            .opt("country", self.country.as_deref())
            .push("sortBy", &self.sort_by);
        self.pagination.apply(&mut params);
        params
    }
}

/// Input for `search_people`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeopleSearchInput {
    /// Name search.
    #[serde(default)]
    pub name: Option<String>,
    /// Wikidata IDs.
    #[serde(default)]
    pub wikidata_ids: Vec<String>,
    /// Occupation label.
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl PeopleSearchInput {
    /// Perigon query parameters.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .opt("name", self.name.as_deref())
            .all("wikidataId", &self.wikidata_ids)
            .opt("occupationLabel", self.occupation.as_deref());
        self.pagination.apply(&mut params);
        params
    }
}

/// Input for `search_companies`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySearchInput {
    /// Search over names, alt names and descriptions.
    #[serde(default)]
    pub query: Option<String>,
    /// Name search.
    #[serde(default)]
    pub name: Option<String>,
    /// Web domains.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Stock symbols.
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Industry.
    #[serde(default)]
    pub industry: Option<String>,
    /// Country.
    #[serde(default)]
    pub country: Option<String>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl CompanySearchInput {
    /// Perigon query parameters.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .opt("q", self.query.as_deref())
            .opt("name", self.name.as_deref())
            .all("domain", &self.domains)
            .all("symbol", &self.symbols)
            .opt("industry", self.industry.as_deref())
            .opt("country", self.country.as_deref());
        self.pagination.apply(&mut params);
        params
    }
}

/// Input for `search_topics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSearchInput {
    /// Topic name.
    #[serde(default)]
    pub name: Option<String>,
    /// Category.
    #[serde(default)]
    pub category: Option<String>,
    /// Subcategory.
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl TopicSearchInput {
    /// Perigon query parameters.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .opt("name", self.name.as_deref())
            .opt("category", self.category.as_deref())
            .opt("subcategory", self.subcategory.as_deref());
        self.pagination.apply(&mut params);
        params
    }
}

/// Input for `search_wikipedia`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikipediaSearchInput {
    /// Boolean search over page content.
    #[serde(default)]
    pub query: Option<String>,
    /// Page title search.
    #[serde(default)]
    pub title: Option<String>,
    /// Wiki language code, e.g. `enwiki`.
    #[serde(default)]
    pub wiki_code: Option<String>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl WikipediaSearchInput {
    /// Perigon query parameters.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .opt("q", self.query.as_deref())
            .opt("title", self.title.as_deref())
            .opt("wikiCode", self.wiki_code.as_deref());
        self.pagination.apply(&mut params);
        params
    }
}

/// Input for `search_wikipedia_vector`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikipediaVectorInput {
    /// Natural-language prompt.
    pub prompt: String,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl WikipediaVectorInput {
    /// JSON body for the vector endpoint.
    #[must_use]
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "prompt": self.prompt,
            "page": self.pagination.api_page(),
            "size": self.pagination.size,
        })
    }
}

/// Input for `get_company_news`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyNewsInput {
    /// Company name to resolve.
    pub company_name: String,
    /// Optional extra query narrowing the coverage.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(flatten)]
    pub date_range: DateRange,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Input for `get_person_news`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonNewsInput {
    /// Person name to resolve.
    pub person_name: String,
    /// Optional extra query narrowing the coverage.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(flatten)]
    pub date_range: DateRange,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Input for `get_top_headlines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHeadlinesInput {
    /// Topic to resolve and filter by.
    #[serde(default)]
    pub topic: Option<String>,
    /// Category filter.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(flatten)]
    pub date_range: DateRange,
    #[serde(flatten)]
    pub location: LocationFilter,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Input for `get_location_news`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationNewsInput {
    /// Free-text location (city name, US state code or country code).
    pub location: String,
    /// Optional extra query.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(flatten)]
    pub date_range: DateRange,
    #[serde(flatten)]
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_article_params_use_zero_based_page() {
        let input: ArticleSearchInput = serde_json::from_value(json!({
            "query": "inflation AND rate",
            "countries": ["us", "gb"],
            "from": "2024-01-01",
            "page": 3,
            "size": 25
        }))
        .unwrap();

        let params = input.to_params();
        assert_eq!(params.first("q"), Some("inflation AND rate"));
        assert_eq!(params.values("country"), vec!["us", "gb"]);
        assert_eq!(params.first("from"), Some("2024-01-01"));
        assert_eq!(params.first("to"), None);
        assert_eq!(params.first("page"), Some("2"));
        assert_eq!(params.first("size"), Some("25"));
        assert_eq!(params.first("sortBy"), Some("date"));
        assert_eq!(params.first("showReprints"), Some("false"));
    }

    #[test]
    fn test_vector_body() {
        let input: WikipediaVectorInput =
            serde_json::from_value(json!({"prompt": "fusion power", "page": 1, "size": 5})).unwrap();
        assert_eq!(input.to_body(), json!({"prompt": "fusion power", "page": 0, "size": 5}));
    }

    #[test]
    fn test_pagination_api_page() {
        assert_eq!(Pagination { page: 1, size: 10 }.api_page(), 0);
        assert_eq!(Pagination { page: 0, size: 10 }.api_page(), 0);
    }
}
