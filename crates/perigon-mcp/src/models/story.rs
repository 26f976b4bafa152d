//! Story (article cluster) model matching `/stories/all`.

use serde::{Deserialize, Serialize};

use super::{NamedRef, PersonRef};

/// A story: a cluster of articles about the same event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Cluster ID (usable as `clusterId` in article searches).
    #[serde(default)]
    pub id: String,

    /// Story headline.
    #[serde(default)]
    pub name: Option<String>,

    /// Generated summary.
    #[serde(default)]
    pub summary: Option<String>,

    /// First seen.
    #[serde(default)]
    pub created_at: Option<String>,

    /// Last updated.
    #[serde(default)]
    pub updated_at: Option<String>,

    /// Distinct sources covering the story.
    #[serde(default)]
    pub unique_count: Option<u64>,

    /// Total articles in the cluster.
    #[serde(default)]
    pub total_count: Option<u64>,

    /// Key points extracted from coverage.
    #[serde(default)]
    pub key_points: Vec<KeyPoint>,

    /// Most mentioned topics.
    #[serde(default)]
    pub top_topics: Vec<NamedRef>,

    /// Most mentioned people.
    #[serde(default)]
    pub top_people: Vec<PersonRef>,

    /// Most mentioned companies.
    #[serde(default)]
    pub top_companies: Vec<NamedRef>,
}

/// A key point of a story.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyPoint {
    /// The point itself.
    #[serde(default)]
    pub point: Option<String>,
}
