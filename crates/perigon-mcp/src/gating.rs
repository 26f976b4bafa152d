//! Scope-based tool gating for MCP sessions.
//!
//! A credential's scopes come from `GET /v1/auth/introspect`. The visible
//! tool set is computed once per session; a scope change needs a reconnect.

use std::fmt;

use serde::Serialize;

use crate::client::PerigonClient;
use crate::tools::ToolName;

/// Capability tag attached to a Perigon API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    /// Story clusters.
    Clusters,
    /// Journalist database.
    Journalists,
    /// Source database.
    Sources,
    /// People database.
    People,
    /// Company database.
    Companies,
    /// Topic taxonomy.
    Topics,
    /// Wikipedia keyword search.
    Wikipedia,
    /// Vector (semantic) search.
    VectorSearch,
}

impl Scope {
    /// Wire name as returned by introspection.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clusters => "CLUSTERS",
            Self::Journalists => "JOURNALISTS",
            Self::Sources => "SOURCES",
            Self::People => "PEOPLE",
            Self::Companies => "COMPANIES",
            Self::Topics => "TOPICS",
            Self::Wikipedia => "WIKIPEDIA",
            Self::VectorSearch => "VECTOR_SEARCH",
        }
    }

    /// Parse a scope name, ignoring case. Unknown scopes yield `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        [
            Self::Clusters,
            Self::Journalists,
            Self::Sources,
            Self::People,
            Self::Companies,
            Self::Topics,
            Self::Wikipedia,
            Self::VectorSearch,
        ]
        .into_iter()
        .find(|scope| scope.as_str() == upper)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope required for each tool. Only article search is ungated.
#[must_use]
pub const fn scope_for(tool: ToolName) -> Option<Scope> {
    match tool {
        ToolName::SearchNewsArticles => None,
        ToolName::SearchNewsStories | ToolName::GetTopHeadlines | ToolName::GetLocationNews => {
            Some(Scope::Clusters)
        }
        ToolName::SearchJournalists => Some(Scope::Journalists),
        ToolName::SearchSources => Some(Scope::Sources),
        ToolName::SearchPeople | ToolName::GetPersonNews => Some(Scope::People),
        ToolName::SearchCompanies | ToolName::GetCompanyNews => Some(Scope::Companies),
        ToolName::SearchTopics => Some(Scope::Topics),
        ToolName::SearchWikipedia => Some(Scope::Wikipedia),
        ToolName::SearchWikipediaVector => Some(Scope::VectorSearch),
    }
}

/// Parse raw scope strings, dropping unknown ones.
#[must_use]
pub fn parse_scopes(raw: &[String]) -> Vec<Scope> {
    raw.iter()
        .filter_map(|s| {
            let scope = Scope::parse(s);
            if scope.is_none() {
                tracing::debug!(scope = %s, "Ignoring unknown scope");
            }
            scope
        })
        .collect()
}

/// Tools visible to a credential holding `scopes`, in catalog order.
#[must_use]
pub fn tools_for_scopes(scopes: &[Scope]) -> Vec<ToolName> {
    ToolName::all()
        .iter()
        .copied()
        .filter(|tool| tool.required_scope().is_none_or(|scope| scopes.contains(&scope)))
        .collect()
}

/// Resolve the visible tool set for the client's credential.
///
/// Introspection failures fall back to the ungated tools.
pub async fn resolve_tools(client: &PerigonClient) -> Vec<ToolName> {
    match client.introspect().await {
        Ok(introspection) => {
            let scopes = parse_scopes(&introspection.scopes);
            let tools = tools_for_scopes(&scopes);
            tracing::info!(scopes = scopes.len(), tools = tools.len(), "Resolved tool scopes");
            tools
        }
        Err(err) => {
            tracing::warn!(error = %err, "Scope introspection failed, exposing baseline tools");
            tools_for_scopes(&[])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_scopes_sees_only_article_search() {
        assert_eq!(tools_for_scopes(&[]), vec![ToolName::SearchNewsArticles]);
    }

    #[test]
    fn test_companies_scope() {
        let tools = tools_for_scopes(&[Scope::Companies]);
        assert_eq!(
            tools,
            vec![ToolName::SearchNewsArticles, ToolName::SearchCompanies, ToolName::GetCompanyNews]
        );
    }

    #[test]
    fn test_all_scopes_see_everything() {
        let all = [
            Scope::Clusters,
            Scope::Journalists,
            Scope::Sources,
            Scope::People,
            Scope::Companies,
            Scope::Topics,
            Scope::Wikipedia,
            Scope::VectorSearch,
        ];
        assert_eq!(tools_for_scopes(&all).len(), ToolName::all().len());
    }

    #[test]
    fn test_parse_scopes_ignores_unknown() {
        let raw = vec!["clusters".to_string(), "BILLING".to_string(), "VECTOR_SEARCH".to_string()];
        assert_eq!(parse_scopes(&raw), vec![Scope::Clusters, Scope::VectorSearch]);
    }
}
