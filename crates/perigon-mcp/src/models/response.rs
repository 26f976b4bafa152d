//! Response envelopes shared by the Perigon search endpoints.

use serde::{Deserialize, Serialize};

/// A page of search results.
///
/// The article endpoint names its list `articles`, the topic endpoint uses
/// `data`/`total`, everything else `results`/`numResults`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<T> {
    /// Total number of matches across all pages.
    #[serde(default, alias = "total")]
    pub num_results: u64,

    /// Items on this page.
    #[serde(default, alias = "articles", alias = "data")]
    pub results: Vec<T>,
}

impl<T> SearchResponse<T> {
    /// Total matches, falling back to the page length when the API omits it.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.num_results.max(self.results.len() as u64)
    }

    /// Check if the search matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl<T> Default for SearchResponse<T> {
    fn default() -> Self {
        Self { num_results: 0, results: Vec::new() }
    }
}

/// Credential introspection result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Introspection {
    /// Scope names granted to the key.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Organization the key belongs to, if reported.
    #[serde(default)]
    pub organization_id: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_article_shape() {
        let resp: SearchResponse<serde_json::Value> =
            serde_json::from_value(json!({"status": 200, "numResults": 3, "articles": [{}, {}]}))
                .unwrap();
        assert_eq!(resp.total(), 3);
        assert_eq!(resp.results.len(), 2);
    }

    #[test]
    fn test_topic_shape() {
        let resp: SearchResponse<serde_json::Value> =
            serde_json::from_value(json!({"total": 1, "data": [{"name": "AI"}]})).unwrap();
        assert_eq!(resp.total(), 1);
    }

    #[test]
    fn test_missing_count_falls_back_to_len() {
        let resp: SearchResponse<serde_json::Value> =
            serde_json::from_value(json!({"results": [{}, {}]})).unwrap();
        assert_eq!(resp.total(), 2);
        assert!(!resp.is_empty());

        let resp: SearchResponse<serde_json::Value> = serde_json::from_value(json!({})).unwrap();
        assert!(resp.is_empty());
    }
}
