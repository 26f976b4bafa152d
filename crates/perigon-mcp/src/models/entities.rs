//! Entity models: journalists, sources, people, companies, topics.

use serde::{Deserialize, Serialize};

/// A `{id?, name}` reference used for categories, topics and companies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedRef {
    /// Entity ID, when the API provides one.
    #[serde(default)]
    pub id: Option<String>,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A person reference embedded in articles and stories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    /// Wikidata ID (e.g. `Q317521`).
    #[serde(default)]
    pub wikidata_id: Option<String>,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Geographic location of a source or journalist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Place {
    /// Country code.
    #[serde(default)]
    pub country: Option<String>,
    /// State or region.
    #[serde(default)]
    pub state: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
}

impl Place {
    /// `city, state, country` with missing parts skipped.
    #[must_use]
    pub fn display(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() { None } else { Some(parts.join(", ")) }
    }
}

/// A journalist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journalist {
    /// Journalist ID.
    #[serde(default)]
    pub id: String,

    /// Name.
    #[serde(default)]
    pub name: Option<String>,

    /// Full name.
    #[serde(default)]
    pub full_name: Option<String>,

    /// Job title.
    #[serde(default)]
    pub title: Option<String>,

    /// Twitter handle.
    #[serde(default)]
    pub twitter_handle: Option<String>,

    /// Sources the journalist publishes with most.
    #[serde(default)]
    pub top_sources: Vec<NamedRef>,

    /// Topics the journalist covers most.
    #[serde(default)]
    pub top_topics: Vec<NamedRef>,

    /// Known locations.
    #[serde(default)]
    pub locations: Vec<Place>,

    /// Average monthly article count.
    #[serde(default)]
    pub avg_monthly_posts: Option<f64>,
}

impl Journalist {
    /// Display name, preferring the full name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().or(self.name.as_deref()).unwrap_or("Unknown")
    }
}

/// A news source (publisher).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Source ID.
    #[serde(default)]
    pub id: String,

    /// Primary domain.
    #[serde(default)]
    pub domain: Option<String>,

    /// Publisher name.
    #[serde(default)]
    pub name: Option<String>,

    /// Description.
    #[serde(default)]
    pub description: Option<String>,

    /// Headquarters.
    #[serde(default)]
    pub location: Option<Place>,

    /// Estimated monthly visits.
    #[serde(default)]
    pub monthly_visits: Option<u64>,

    /// Average monthly article count.
    #[serde(default)]
    pub avg_monthly_posts: Option<f64>,

    /// Whether the source is paywalled.
    #[serde(default)]
    pub paywall: Option<bool>,
}

/// A person known to the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Wikidata ID.
    #[serde(default)]
    pub wikidata_id: String,

    /// Name.
    #[serde(default)]
    pub name: Option<String>,

    /// Short description.
    #[serde(default)]
    pub description: Option<String>,

    /// Occupations.
    #[serde(default)]
    pub occupation: Vec<Label>,

    /// Positions held.
    #[serde(default)]
    pub position: Vec<Label>,
}

/// A Wikidata label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Wikidata ID of the label.
    #[serde(default)]
    pub wikidata_id: Option<String>,
    /// Label text.
    #[serde(default)]
    pub label: Option<String>,
}

/// A company.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Company ID (usable as `companyId` in article searches).
    #[serde(default)]
    pub id: String,

    /// Name.
    #[serde(default)]
    pub name: Option<String>,

    /// Alternative names.
    #[serde(default)]
    pub alt_names: Vec<String>,

    /// Web domains.
    #[serde(default)]
    pub domains: Vec<String>,

    /// Stock symbols.
    #[serde(default)]
    pub symbols: Vec<SymbolRef>,

    /// Industry.
    #[serde(default)]
    pub industry: Option<String>,

    /// Description.
    #[serde(default)]
    pub description: Option<String>,

    /// Country of incorporation.
    #[serde(default)]
    pub country: Option<String>,
}

/// A stock symbol; the API returns either a bare string or an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolRef {
    /// `"AAPL"`
    Plain(String),
    /// `{"symbol": "AAPL", "exchange": "NASDAQ"}`
    Listed {
        /// Ticker.
        symbol: String,
        /// Exchange.
        #[serde(default)]
        exchange: Option<String>,
    },
}

impl SymbolRef {
    /// Ticker text.
    #[must_use]
    pub fn symbol(&self) -> &str {
        match self {
            Self::Plain(s) | Self::Listed { symbol: s, .. } => s,
        }
    }
}

/// A topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topic {
    /// Topic ID.
    #[serde(default)]
    pub id: Option<serde_json::Value>,

    /// Topic name (usable as `topic` filter).
    #[serde(default)]
    pub name: Option<String>,

    /// Category labels.
    #[serde(default)]
    pub labels: Option<TopicLabels>,
}

/// Category labels of a topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicLabels {
    /// Category.
    #[serde(default)]
    pub category: Option<String>,
    /// Subcategory.
    #[serde(default)]
    pub subcategory: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_symbols_accept_both_shapes() {
        let company: Company = serde_json::from_value(json!({
            "id": "c1",
            "name": "Apple Inc",
            "symbols": ["AAPL", {"symbol": "APC", "exchange": "XETRA"}]
        }))
        .unwrap();
        let symbols: Vec<&str> = company.symbols.iter().map(SymbolRef::symbol).collect();
        assert_eq!(symbols, vec!["AAPL", "APC"]);
    }

    #[test]
    fn test_place_display() {
        let place = Place { country: Some("us".into()), state: None, city: Some("Austin".into()) };
        assert_eq!(place.display().as_deref(), Some("Austin, us"));
        assert_eq!(Place::default().display(), None);
    }
}
