//! News article model matching the Perigon `/all` endpoint.

use serde::{Deserialize, Serialize};

use super::{NamedRef, PersonRef};

/// A news article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Unique article ID.
    #[serde(default)]
    pub article_id: String,

    /// Canonical URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Headline.
    #[serde(default)]
    pub title: Option<String>,

    /// Publisher-supplied description.
    #[serde(default)]
    pub description: Option<String>,

    /// Machine-generated summary.
    #[serde(default)]
    pub summary: Option<String>,

    /// Full body text.
    #[serde(default)]
    pub content: Option<String>,

    /// Publication timestamp.
    #[serde(default)]
    pub pub_date: Option<String>,

    /// Publishing source.
    #[serde(default)]
    pub source: Option<ArticleSource>,

    /// Language code.
    #[serde(default)]
    pub language: Option<String>,

    /// Story cluster this article belongs to.
    #[serde(default)]
    pub cluster_id: Option<String>,

    /// Byline.
    #[serde(default)]
    pub authors_byline: Option<String>,

    /// Categories.
    #[serde(default)]
    pub categories: Vec<NamedRef>,

    /// Companies mentioned.
    #[serde(default)]
    pub companies: Vec<NamedRef>,

    /// People mentioned.
    #[serde(default)]
    pub people: Vec<PersonRef>,
}

impl Article {
    /// Best short text for the article: summary, then description, then body.
    #[must_use]
    pub fn best_summary(&self) -> Option<&str> {
        [&self.summary, &self.description, &self.content]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .find(|s| !s.trim().is_empty())
    }

    /// Source domain if available.
    #[must_use]
    pub fn source_domain(&self) -> Option<&str> {
        self.source.as_ref()?.domain.as_deref()
    }
}

/// Source reference embedded in an article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleSource {
    /// Publisher domain.
    #[serde(default)]
    pub domain: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_best_summary_order() {
        let article: Article = serde_json::from_value(json!({
            "articleId": "a1",
            "description": "desc",
            "content": "body",
            "summary": "  "
        }))
        .unwrap();
        assert_eq!(article.best_summary(), Some("desc"));
        assert_eq!(article.source_domain(), None);
    }
}
