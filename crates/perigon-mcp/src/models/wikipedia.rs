//! Wikipedia page models (keyword and vector search).

use serde::{Deserialize, Serialize};

/// A Wikipedia page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiPage {
    /// Page ID.
    #[serde(default)]
    pub id: String,

    /// Page URL.
    #[serde(default)]
    pub url: Option<String>,

    /// Page title.
    #[serde(default)]
    pub wiki_title: Option<String>,

    /// Lead-section summary.
    #[serde(default)]
    pub summary: Option<String>,

    /// Wikidata ID of the subject.
    #[serde(default)]
    pub wikidata_id: Option<String>,

    /// Recent daily page views.
    #[serde(default)]
    pub pageviews: Option<u64>,
}

/// A vector search hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoredWikiPage {
    /// Similarity score.
    #[serde(default)]
    pub score: f64,

    /// The matched page.
    #[serde(default)]
    pub data: WikiPage,
}
