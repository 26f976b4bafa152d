//! Canonical tool identifiers.
//!
//! These names are part of the external contract: MCP clients, LLM tool
//! declarations and the direct tool endpoint all address tools by them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::gating::{Scope, scope_for};

/// Every tool the server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// Keyword search over news articles.
    SearchNewsArticles,
    /// Search story clusters.
    SearchNewsStories,
    /// Search journalists.
    SearchJournalists,
    /// Search news sources.
    SearchSources,
    /// Search people.
    SearchPeople,
    /// Search companies.
    SearchCompanies,
    /// Search topics.
    SearchTopics,
    /// Keyword search over Wikipedia.
    SearchWikipedia,
    /// Semantic search over Wikipedia.
    SearchWikipediaVector,
    /// Recent coverage of a company.
    GetCompanyNews,
    /// Recent coverage of a person.
    GetPersonNews,
    /// Top stories by source count.
    GetTopHeadlines,
    /// News for a city, state or country.
    GetLocationNews,
}

/// Tool family, used to group tools in catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Direct wrapper over one search endpoint.
    Search,
    /// Composite workflow over several endpoints.
    UseCase,
}

impl ToolName {
    const ALL: [Self; 13] = [
        Self::SearchNewsArticles,
        Self::SearchNewsStories,
        Self::SearchJournalists,
        Self::SearchSources,
        Self::SearchPeople,
        Self::SearchCompanies,
        Self::SearchTopics,
        Self::SearchWikipedia,
        Self::SearchWikipediaVector,
        Self::GetCompanyNews,
        Self::GetPersonNews,
        Self::GetTopHeadlines,
        Self::GetLocationNews,
    ];

    /// Returns the canonical string name for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SearchNewsArticles => "search_news_articles",
            Self::SearchNewsStories => "search_news_stories",
            Self::SearchJournalists => "search_journalists",
            Self::SearchSources => "search_sources",
            Self::SearchPeople => "search_people",
            Self::SearchCompanies => "search_companies",
            Self::SearchTopics => "search_topics",
            Self::SearchWikipedia => "search_wikipedia",
            Self::SearchWikipediaVector => "search_wikipedia_vector",
            Self::GetCompanyNews => "get_company_news",
            Self::GetPersonNews => "get_person_news",
            Self::GetTopHeadlines => "get_top_headlines",
            Self::GetLocationNews => "get_location_news",
        }
    }

    /// All tools in catalog order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &Self::ALL
    }

    /// Parse a canonical name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    /// Tool family.
    #[must_use]
    pub const fn category(self) -> ToolCategory {
        match self {
            Self::GetCompanyNews
            | Self::GetPersonNews
            | Self::GetTopHeadlines
            | Self::GetLocationNews => ToolCategory::UseCase,
            _ => ToolCategory::Search,
        }
    }

    /// Scope a credential needs to see this tool over MCP; `None` means always visible.
    #[must_use]
    pub const fn required_scope(self) -> Option<Scope> {
        scope_for(self)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DispatchError::unknown_tool(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for tool in ToolName::all() {
            assert_eq!(ToolName::parse(tool.as_str()), Some(*tool));
            assert_eq!(
                serde_json::to_value(tool).unwrap(),
                serde_json::Value::String(tool.to_string())
            );
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(ToolName::parse("search_everything"), None);
        let err = "search_everything".parse::<ToolName>().unwrap_err();
        assert_eq!(err.code(), "TOOL_NOT_FOUND");
    }

    #[test]
    fn test_categories() {
        assert_eq!(ToolName::SearchSources.category(), ToolCategory::Search);
        assert_eq!(ToolName::GetLocationNews.category(), ToolCategory::UseCase);
        let use_cases =
            ToolName::all().iter().filter(|t| t.category() == ToolCategory::UseCase).count();
        assert_eq!(use_cases, 4);
    }
}
