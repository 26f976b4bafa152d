//! Query parameter list builder.

use std::fmt::Display;

/// Ordered query parameters; keys may repeat (`country=us&country=gb`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one parameter.
    pub fn push(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a parameter if present.
    pub fn opt(&mut self, key: &str, value: Option<impl Display>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Append one parameter per value.
    pub fn all<V: Display>(&mut self, key: &str, values: &[V]) -> &mut Self {
        for value in values {
            self.push(key, value);
        }
        self
    }

    /// Values for a key, in order.
    #[must_use]
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.0.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str()).collect()
    }

    /// First value for a key.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Borrow as key/value pairs.
    #[must_use]
    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_keys_keep_order() {
        let mut params = QueryParams::new();
        params.push("q", "a AND b").all("country", &["us", "gb"]).opt("state", None::<&str>);
        assert_eq!(params.values("country"), vec!["us", "gb"]);
        assert_eq!(params.first("q"), Some("a AND b"));
        assert_eq!(params.first("state"), None);
        assert_eq!(params.as_slice().len(), 3);
    }
}
