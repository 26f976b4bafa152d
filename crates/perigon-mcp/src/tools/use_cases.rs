//! Use-case tools: an optional enrichment lookup followed by a primary search.
//!
//! Enrichment is best effort and typed as `Option`; a failed lookup is logged
//! and the tool falls back to name-based filters. The primary search is a
//! `Result` and its failure is the tool's failure.

use std::future::Future;

use super::{McpTool, ToolContext, ToolName};
use crate::error::{ClientResult, ToolResult};
use crate::formatters::{
    self, Block, NO_RESULTS, format_article, format_company, format_person, format_story,
    format_topic,
};
use crate::models::{
    ArticleSearchInput, CompanyNewsInput, CompanySearchInput, LocationFilter, LocationNewsInput,
    Pagination, PeopleSearchInput, PersonNewsInput, SearchResponse, StorySearchInput,
    TopHeadlinesInput, TopicSearchInput,
};
use crate::schema::fragments::{date_range, location, pagination, search_field, text_field};
use crate::schema::{FieldSpec, LocationKind, Schema, Validated, resolve_location};

/// Stories shown as context for location news.
const CONTEXT_STORIES: u32 = 3;

/// Default look-back window of top headlines, in days.
const HEADLINES_DAYS: i64 = 7;

/// Single best match for entity resolution.
const BEST_MATCH: Pagination = Pagination { page: 1, size: 1 };

/// Run an enrichment lookup, turning failure into `None`.
async fn enrich<T>(lookup: &'static str, call: impl Future<Output = ClientResult<T>>) -> Option<T> {
    match call.await {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(lookup, error = %err, "Enrichment lookup failed, continuing without it");
            None
        }
    }
}

/// Prefix formatted results with a context block; empty results stay bare.
fn with_context<T>(
    context: Option<String>,
    response: &SearchResponse<T>,
    item_type: &str,
    pagination: &Pagination,
    render: impl Fn(&T) -> String,
) -> String {
    if response.is_empty() {
        return NO_RESULTS.to_string();
    }
    let results = formatters::format_results(response, item_type, pagination, render);
    match context {
        Some(context) => format!("{context}\n\n{results}"),
        None => results,
    }
}

/// Recent coverage of one company.
pub struct GetCompanyNews;

#[async_trait::async_trait]
impl McpTool for GetCompanyNews {
    fn name(&self) -> ToolName {
        ToolName::GetCompanyNews
    }

    fn description(&self) -> &'static str {
        "Get recent news about a company. Resolves the company by name first so that \
         coverage is matched by entity, not just by keyword, and includes a short company \
         profile with the results."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(text_field("companyName", "Company name, e.g. \"Nvidia\".").required())
            .field(search_field(
                "query",
                "Optional keywords to narrow the coverage, e.g. \"earnings\".",
            ))
            .fragment(date_range())
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: CompanyNewsInput = input.into_input()?;

        let lookup = CompanySearchInput {
            name: Some(params.company_name.clone()),
            pagination: BEST_MATCH,
            ..CompanySearchInput::default()
        };
        let company = enrich("company", ctx.client.search_companies(&lookup))
            .await
            .and_then(|found| found.results.into_iter().next());

        let mut search = ArticleSearchInput {
            query: params.query,
            date_range: params.date_range,
            pagination: params.pagination,
            ..ArticleSearchInput::default()
        };
        match &company {
            Some(company) => search.company_id = Some(company.id.clone()),
            None => search.company_name = Some(params.company_name),
        }

        let articles = ctx.client.search_articles(&search).await?;
        Ok(with_context(
            company.as_ref().map(format_company),
            &articles,
            "articles",
            &search.pagination,
            format_article,
        ))
    }
}

/// Recent coverage of one person.
pub struct GetPersonNews;

#[async_trait::async_trait]
impl McpTool for GetPersonNews {
    fn name(&self) -> ToolName {
        ToolName::GetPersonNews
    }

    fn description(&self) -> &'static str {
        "Get recent news about a person. Resolves the person to a Wikidata entity first so \
         that namesakes are not mixed in, and includes a short profile with the results."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(text_field("personName", "Person name, e.g. \"Christine Lagarde\".").required())
            .field(search_field(
                "query",
                "Optional keywords to narrow the coverage, e.g. \"interest rates\".",
            ))
            .fragment(date_range())
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: PersonNewsInput = input.into_input()?;

        let lookup = PeopleSearchInput {
            name: Some(params.person_name.clone()),
            pagination: BEST_MATCH,
            ..PeopleSearchInput::default()
        };
        let person = enrich("person", ctx.client.search_people(&lookup))
            .await
            .and_then(|found| found.results.into_iter().next())
            .filter(|person| !person.wikidata_id.is_empty());

        let mut search = ArticleSearchInput {
            query: params.query,
            date_range: params.date_range,
            pagination: params.pagination,
            ..ArticleSearchInput::default()
        };
        match &person {
            Some(person) => search.person_wikidata_id = Some(person.wikidata_id.clone()),
            None => search.person_name = Some(params.person_name),
        }

        let articles = ctx.client.search_articles(&search).await?;
        Ok(with_context(
            person.as_ref().map(format_person),
            &articles,
            "articles",
            &search.pagination,
            format_article,
        ))
    }
}

/// Most widely covered stories.
pub struct GetTopHeadlines;

#[async_trait::async_trait]
impl McpTool for GetTopHeadlines {
    fn name(&self) -> ToolName {
        ToolName::GetTopHeadlines
    }

    fn description(&self) -> &'static str {
        "Get the top headlines: the stories covered by the most distinct sources, \
         optionally for one topic or category. Covers the last 7 days unless a date range \
         is given."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(text_field("topic", "Optional topic, e.g. \"Artificial Intelligence\"."))
            .field(text_field("category", "Optional category, e.g. \"Business\"."))
            .field(
                FieldSpec::date(
                    "from",
                    "Start of the window. ISO-8601 or yyyy-mm-dd. Defaults to 7 days ago.",
                )
                .default_days_ago(HEADLINES_DAYS),
            )
            .field(FieldSpec::date("to", "End of the window. ISO-8601 or yyyy-mm-dd."))
            .fragment(location())
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: TopHeadlinesInput = input.into_input()?;

        let topic = match &params.topic {
            Some(name) => {
                let lookup = TopicSearchInput {
                    name: Some(name.clone()),
                    pagination: BEST_MATCH,
                    ..TopicSearchInput::default()
                };
                enrich("topic", ctx.client.search_topics(&lookup))
                    .await
                    .and_then(|found| found.results.into_iter().next())
            }
            None => None,
        };

        let search = StorySearchInput {
            topic: topic.as_ref().and_then(|t| t.name.clone()).or(params.topic),
            category: params.category,
            sort_by: "count".to_string(),
            date_range: params.date_range,
            location: params.location,
            pagination: params.pagination,
            ..StorySearchInput::default()
        };

        let stories = ctx.client.search_stories(&search).await?;
        Ok(with_context(
            topic.as_ref().map(format_topic),
            &stories,
            "stories",
            &search.pagination,
            format_story,
        ))
    }
}

/// News for a place.
pub struct GetLocationNews;

#[async_trait::async_trait]
impl McpTool for GetLocationNews {
    fn name(&self) -> ToolName {
        ToolName::GetLocationNews
    }

    fn description(&self) -> &'static str {
        "Get recent news for a place. Accepts a city name (\"Austin\"), a two-letter US \
         state code (\"TX\") or a two-letter country code (\"gb\"), and includes the top \
         local stories as context."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(
                text_field(
                    "location",
                    "City name, two-letter US state code or two-letter country code.",
                )
                .required(),
            )
            .field(search_field("query", "Optional keywords to narrow the coverage."))
            .fragment(date_range())
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: LocationNewsInput = input.into_input()?;
        let place = resolve_location(&params.location);

        let filter = match place.kind {
            LocationKind::State => LocationFilter {
                countries: vec!["us".to_string()],
                states: vec![place.value.clone()],
                cities: Vec::new(),
            },
            LocationKind::Country => {
                LocationFilter { countries: vec![place.value.clone()], ..LocationFilter::default() }
            }
            LocationKind::City => {
                LocationFilter { cities: vec![place.value.clone()], ..LocationFilter::default() }
            }
        };

        let lookup = StorySearchInput {
            sort_by: "count".to_string(),
            date_range: params.date_range.clone(),
            location: filter.clone(),
            pagination: Pagination { page: 1, size: CONTEXT_STORIES },
            ..StorySearchInput::default()
        };
        let stories = enrich("location stories", ctx.client.search_stories(&lookup)).await;

        let mut context = Block::new("location").attr("type", place.kind).attr("value", &place.value);
        if let Some(stories) = &stories {
            context = context.list(
                "topStories",
                stories.results.iter().filter_map(|s| s.name.as_deref()),
            );
        }

        let search = ArticleSearchInput {
            query: params.query,
            date_range: params.date_range,
            location: filter,
            pagination: params.pagination,
            ..ArticleSearchInput::default()
        };

        let articles = ctx.client.search_articles(&search).await?;
        Ok(with_context(
            Some(context.render()),
            &articles,
            "articles",
            &search.pagination,
            format_article,
        ))
    }
}
