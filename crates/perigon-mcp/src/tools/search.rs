//! Search tools: one per Perigon search endpoint.

use serde_json::json;

use super::{McpTool, ToolContext, ToolName};
use crate::error::ToolResult;
use crate::formatters::{
    self, format_article, format_company, format_journalist, format_person,
    format_scored_wiki_page, format_source, format_story, format_topic, format_wiki_page,
};
use crate::models::{
    ArticleSearchInput, CompanySearchInput, JournalistSearchInput, PeopleSearchInput,
    SourceSearchInput, StorySearchInput, TopicSearchInput, WikipediaSearchInput,
    WikipediaVectorInput,
};
use crate::schema::fragments::{
    MAX_COUNT, date_range, location, pagination, search_field, text_field,
};
use crate::schema::{FieldSpec, Schema, Step, Validated};

const ARTICLE_SORTS: &[&str] = &["date", "relevance", "addDate", "pubDate", "refreshDate"];
const STORY_SORTS: &[&str] = &["createdAt", "updatedAt", "count"];
const SOURCE_SORTS: &[&str] = &["globalRank", "monthlyVisits", "avgMonthlyPosts"];

const QUERY_HELP: &str = "Supports AND, OR, NOT, exact phrases in double quotes and * wildcards. \
     Plain words are combined with AND.";

/// Source domain list shared by article and journalist search.
fn sources_field() -> FieldSpec {
    FieldSpec::string_list(
        "sources",
        "Publisher domains to restrict results to (e.g. [\"nytimes.com\", \"reuters.com\"]).",
    )
    .steps([Step::Trim, Step::EmptyAsAbsent, Step::Lowercase])
}

/// Free-text article search.
pub struct SearchNewsArticles;

#[async_trait::async_trait]
impl McpTool for SearchNewsArticles {
    fn name(&self) -> ToolName {
        ToolName::SearchNewsArticles
    }

    fn description(&self) -> &'static str {
        "Search individual news articles by keywords, dates, sources and location. \
         Returns titles, summaries, publish dates and sources. Use for specific events \
         or when the user wants individual articles rather than story overviews."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(search_field(
                "query",
                "Search across article titles, descriptions and content. Supports AND, OR, \
                 NOT, exact phrases in double quotes and * wildcards. Plain words are \
                 combined with AND.",
            ))
            .field(search_field("title", "Search article titles only. Same syntax as query."))
            .field(sources_field())
            .field(
                FieldSpec::string_list(
                    "categories",
                    "Article categories (e.g. [\"Politics\", \"Tech\", \"Business\"]).",
                )
                .steps([Step::Trim, Step::EmptyAsAbsent]),
            )
            .field(
                FieldSpec::string("language", "Two-letter language code (e.g. \"en\").").steps([
                    Step::Trim,
                    Step::EmptyAsAbsent,
                    Step::Lowercase,
                    Step::Length(2),
                ]),
            )
            .field(
                FieldSpec::one_of(
                    "sortBy",
                    ARTICLE_SORTS,
                    "Sort order: \"date\" for newest first, \"relevance\" for best match.",
                )
                .default_value(json!("date")),
            )
            .field(
                FieldSpec::boolean(
                    "showReprints",
                    "Include syndicated copies of the same article. Usually leave false.",
                )
                .default_value(json!(false)),
            )
            .field(text_field(
                "clusterId",
                "Only articles belonging to this story cluster ID (from search_news_stories).",
            ))
            .fragment(date_range())
            .fragment(location())
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: ArticleSearchInput = input.into_input()?;
        let response = ctx.client.search_articles(&params).await?;
        Ok(formatters::format_results(&response, "articles", &params.pagination, format_article))
    }
}

/// Story cluster search.
pub struct SearchNewsStories;

#[async_trait::async_trait]
impl McpTool for SearchNewsStories {
    fn name(&self) -> ToolName {
        ToolName::SearchNewsStories
    }

    fn description(&self) -> &'static str {
        "Search news stories: clusters of articles covering the same event, with a \
         summary, key points and the people, companies and topics involved. Use for an \
         overview of what is happening rather than individual articles."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(search_field("query", "Search story names and summaries. Same syntax as article search."))
            .field(text_field("name", "Search story names only."))
            .field(text_field("topic", "Topic name (see search_topics), e.g. \"Artificial Intelligence\"."))
            .field(text_field("category", "Category name, e.g. \"Politics\"."))
            .field(
                FieldSpec::one_of(
                    "sortBy",
                    STORY_SORTS,
                    "Sort order: \"createdAt\" (newest stories), \"updatedAt\" (recently \
                     updated) or \"count\" (most covered).",
                )
                .default_value(json!("createdAt")),
            )
            .field(
                FieldSpec::integer(
                    "minUniqueSources",
                    "Only stories covered by at least this many distinct sources.",
                )
                .steps([Step::AtLeast(1), Step::AtMost(MAX_COUNT)]),
            )
            .fragment(date_range())
            .fragment(location())
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: StorySearchInput = input.into_input()?;
        let response = ctx.client.search_stories(&params).await?;
        Ok(formatters::format_results(&response, "stories", &params.pagination, format_story))
    }
}

/// Journalist search.
pub struct SearchJournalists;

#[async_trait::async_trait]
impl McpTool for SearchJournalists {
    fn name(&self) -> ToolName {
        ToolName::SearchJournalists
    }

    fn description(&self) -> &'static str {
        "Find journalists by name, outlet, topic or location. Returns titles, social \
         handles, the sources they write for and the topics they cover."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(search_field("query", "Search journalist names and bios."))
            .field(text_field("name", "Journalist name."))
            .field(
                text_field("twitter", "Twitter/X handle without the @.")
                    .step(Step::Lowercase),
            )
            .field(sources_field())
            .field(text_field("topic", "Topic the journalist covers."))
            .field(text_field("category", "Category the journalist covers."))
            .field(
                text_field("country", "Two-letter country code the journalist is based in.")
                    .steps([Step::Lowercase, Step::Length(2)]),
            )
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: JournalistSearchInput = input.into_input()?;
        let response = ctx.client.search_journalists(&params).await?;
        Ok(formatters::format_results(
            &response,
            "journalists",
            &params.pagination,
            format_journalist,
        ))
    }
}

/// News source search.
pub struct SearchSources;

#[async_trait::async_trait]
impl McpTool for SearchSources {
    fn name(&self) -> ToolName {
        ToolName::SearchSources
    }

    fn description(&self) -> &'static str {
        "Look up news publishers by domain, name, category or country. Returns traffic, \
         output volume, location and paywall status."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(
                FieldSpec::string_list("domains", "Publisher domains, e.g. [\"cnn.com\"].")
                    .steps([Step::Trim, Step::EmptyAsAbsent, Step::Lowercase]),
            )
            .field(text_field("name", "Publisher name, e.g. \"The Guardian\"."))
            .field(text_field("category", "Main category the source publishes in."))
            .field(
                text_field("country", "Two-letter country code of the publisher.")
                    .steps([Step::Lowercase, Step::Length(2)]),
            )
            .field(
                FieldSpec::one_of(
                    "sortBy",
                    SOURCE_SORTS,
                    "Sort order: \"globalRank\", \"monthlyVisits\" or \"avgMonthlyPosts\".",
                )
                .default_value(json!("globalRank")),
            )
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: SourceSearchInput = input.into_input()?;
        let response = ctx.client.search_sources(&params).await?;
        Ok(formatters::format_results(&response, "sources", &params.pagination, format_source))
    }
}

/// People search.
pub struct SearchPeople;

#[async_trait::async_trait]
impl McpTool for SearchPeople {
    fn name(&self) -> ToolName {
        ToolName::SearchPeople
    }

    fn description(&self) -> &'static str {
        "Find people who appear in the news by name, Wikidata ID or occupation. Returns \
         Wikidata IDs usable with get_person_news, descriptions, occupations and positions."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(text_field("name", "Person name, e.g. \"Jerome Powell\"."))
            .field(
                FieldSpec::string_list("wikidataIds", "Wikidata IDs, e.g. [\"Q1392\"].")
                    .steps([Step::Trim, Step::EmptyAsAbsent, Step::Uppercase]),
            )
            .field(text_field("occupation", "Occupation label, e.g. \"politician\"."))
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: PeopleSearchInput = input.into_input()?;
        let response = ctx.client.search_people(&params).await?;
        Ok(formatters::format_results(&response, "people", &params.pagination, format_person))
    }
}

/// Company search.
pub struct SearchCompanies;

#[async_trait::async_trait]
impl McpTool for SearchCompanies {
    fn name(&self) -> ToolName {
        ToolName::SearchCompanies
    }

    fn description(&self) -> &'static str {
        "Find companies by name, domain, ticker symbol or industry. Returns company IDs \
         usable with get_company_news, alternative names, domains and descriptions."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(search_field(
                "query",
                "Search company names, alternative names and descriptions.",
            ))
            .field(text_field("name", "Company name, e.g. \"Apple\"."))
            .field(
                FieldSpec::string_list("domains", "Company web domains, e.g. [\"apple.com\"].")
                    .steps([Step::Trim, Step::EmptyAsAbsent, Step::Lowercase]),
            )
            .field(
                FieldSpec::string_list("symbols", "Stock ticker symbols, e.g. [\"AAPL\"].")
                    .steps([Step::Trim, Step::EmptyAsAbsent, Step::Uppercase]),
            )
            .field(text_field("industry", "Industry, e.g. \"Semiconductors\"."))
            .field(
                text_field("country", "Two-letter country code of the headquarters.")
                    .steps([Step::Lowercase, Step::Length(2)]),
            )
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: CompanySearchInput = input.into_input()?;
        let response = ctx.client.search_companies(&params).await?;
        Ok(formatters::format_results(&response, "companies", &params.pagination, format_company))
    }
}

/// Topic search.
pub struct SearchTopics;

#[async_trait::async_trait]
impl McpTool for SearchTopics {
    fn name(&self) -> ToolName {
        ToolName::SearchTopics
    }

    fn description(&self) -> &'static str {
        "Browse the topic taxonomy by name, category or subcategory. Use it to find exact \
         topic names for the topic filters of other tools."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(text_field("name", "Topic name or part of it, e.g. \"climate\"."))
            .field(text_field("category", "Category, e.g. \"Tech\"."))
            .field(text_field("subcategory", "Subcategory, e.g. \"Crypto\"."))
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: TopicSearchInput = input.into_input()?;
        let response = ctx.client.search_topics(&params).await?;
        Ok(formatters::format_results(&response, "topics", &params.pagination, format_topic))
    }
}

/// Wikipedia keyword search.
pub struct SearchWikipedia;

#[async_trait::async_trait]
impl McpTool for SearchWikipedia {
    fn name(&self) -> ToolName {
        ToolName::SearchWikipedia
    }

    fn description(&self) -> &'static str {
        "Keyword search over Wikipedia pages for background on people, places, \
         organizations and concepts mentioned in the news."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(search_field("query", QUERY_HELP))
            .field(text_field("title", "Search page titles only."))
            .field(
                text_field("wikiCode", "Wiki to search, e.g. \"enwiki\". Defaults to all.")
                    .step(Step::Lowercase),
            )
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: WikipediaSearchInput = input.into_input()?;
        let response = ctx.client.search_wikipedia(&params).await?;
        Ok(formatters::format_results(
            &response,
            "Wikipedia pages",
            &params.pagination,
            format_wiki_page,
        ))
    }
}

/// Wikipedia semantic search.
pub struct SearchWikipediaVector;

#[async_trait::async_trait]
impl McpTool for SearchWikipediaVector {
    fn name(&self) -> ToolName {
        ToolName::SearchWikipediaVector
    }

    fn description(&self) -> &'static str {
        "Semantic search over Wikipedia: describe what you are looking for in natural \
         language and get the most similar pages with a similarity score."
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field(
                text_field(
                    "prompt",
                    "Natural-language description of the information you need.",
                )
                .required(),
            )
            .fragment(pagination())
    }

    async fn execute(&self, ctx: &ToolContext, input: Validated) -> ToolResult<String> {
        let params: WikipediaVectorInput = input.into_input()?;
        let response = ctx.client.search_wikipedia_vector(&params).await?;
        Ok(formatters::format_results(
            &response,
            "Wikipedia pages",
            &params.pagination,
            format_scored_wiki_page,
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_company_empty_query_is_absent() {
        let schema = SearchCompanies.schema();
        let empty = schema.validate(&json!({"query": ""})).unwrap();
        let omitted = schema.validate(&json!({})).unwrap();
        assert_eq!(empty, omitted);
    }

    #[test]
    fn test_article_defaults() {
        let out = SearchNewsArticles.schema().validate(&json!({})).unwrap();
        assert_eq!(out.get("countries"), Some(&json!(["us"])));
        assert_eq!(out.str("sortBy"), Some("date"));
        assert_eq!(out.get("page"), Some(&json!(1)));
        assert_eq!(out.get("size"), Some(&json!(10)));
    }

    #[test]
    fn test_vector_prompt_required() {
        let errors = SearchWikipediaVector.schema().validate(&json!({"prompt": "  "})).unwrap_err();
        assert_eq!(errors[0].field, "prompt");
        assert_eq!(errors[0].problem, "is required");
    }

    #[test]
    fn test_story_sort_must_be_known() {
        let errors =
            SearchNewsStories.schema().validate(&json!({"sortBy": "popularity"})).unwrap_err();
        assert_eq!(errors[0].field, "sortBy");
    }
}
