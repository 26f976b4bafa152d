//! Shared schema fragments reused across tools.
//!
//! Field names and defaults here are part of the tool contract seen by LLMs
//! and MCP clients.

use serde_json::json;

use super::{FieldSpec, Step};

/// Largest page size the Perigon API accepts.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page number or count that fits the typed inputs (`u32::MAX`).
pub const MAX_COUNT: i64 = 4_294_967_295;

/// Free-text query field with Boolean normalization.
///
/// Empty strings are treated as absent.
#[must_use]
pub fn search_field(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec::string(name, description).steps([
        Step::Trim,
        Step::EmptyAsAbsent,
        Step::NormalizeQuery,
    ])
}

/// Plain optional text filter (trimmed, empty is absent, no query rewriting).
#[must_use]
pub fn text_field(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec::string(name, description).steps([Step::Trim, Step::EmptyAsAbsent])
}

/// `page` (1-based) and `size` (clamped to 1..=1000).
#[must_use]
pub fn pagination() -> Vec<FieldSpec> {
    vec![
        FieldSpec::integer(
            "page",
            "Page number to return, starting at 1. Use the page count in the result header \
             to decide whether more pages exist.",
        )
        .default_value(json!(1))
        .steps([Step::AtLeast(1), Step::AtMost(MAX_COUNT)]),
        FieldSpec::integer(
            "size",
            "Number of results per page (1-1000). Keep it small (5-20) unless the user asks \
             for an exhaustive list.",
        )
        .default_value(json!(DEFAULT_PAGE_SIZE))
        .step(Step::Clamp { min: 1, max: MAX_PAGE_SIZE }),
    ]
}

/// `from` / `to` date range, both optional and open-ended.
#[must_use]
pub fn date_range() -> Vec<FieldSpec> {
    vec![
        FieldSpec::date(
            "from",
            "Only include results published on or after this date. \
             ISO-8601 (2024-01-31T00:00:00Z) or yyyy-mm-dd.",
        ),
        FieldSpec::date(
            "to",
            "Only include results published on or before this date. \
             ISO-8601 (2024-01-31T23:59:59Z) or yyyy-mm-dd.",
        ),
    ]
}

/// `countries` (defaults to `["us"]`), `states`, `cities`.
#[must_use]
pub fn location() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string_list(
            "countries",
            "ISO 3166-1 alpha-2 country codes to filter by, lower case (e.g. [\"us\", \"gb\"]). \
             Defaults to [\"us\"].",
        )
        .steps([Step::Trim, Step::EmptyAsAbsent, Step::Lowercase, Step::Length(2)])
        .default_value(json!(["us"])),
        FieldSpec::string_list(
            "states",
            "Two-letter US state codes to filter by, upper case (e.g. [\"CA\", \"NY\"]).",
        )
        .steps([Step::Trim, Step::EmptyAsAbsent, Step::Uppercase, Step::Length(2)]),
        FieldSpec::string_list(
            "cities",
            "City names to filter by (e.g. [\"San Francisco\"]).",
        )
        .steps([Step::Trim, Step::EmptyAsAbsent]),
    ]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::Schema;

    #[test]
    fn test_search_field_normalizes() {
        let schema = Schema::new().field(search_field("query", "Query"));

        let out = schema.validate(&json!({"query": " inflation rate "})).unwrap();
        assert_eq!(out.str("query"), Some("inflation AND rate"));

        let out = schema.validate(&json!({"query": "fed OR ecb"})).unwrap();
        assert_eq!(out.str("query"), Some("fed OR ecb"));
    }

    #[test]
    fn test_search_field_empty_is_absent() {
        let schema = Schema::new().field(search_field("query", "Query"));
        let empty = schema.validate(&json!({"query": ""})).unwrap();
        let blank = schema.validate(&json!({"query": "   "})).unwrap();
        let omitted = schema.validate(&json!({})).unwrap();
        assert_eq!(empty, omitted);
        assert_eq!(blank, omitted);
    }

    #[test]
    fn test_pagination_defaults_and_clamp() {
        let schema = Schema::new().fragment(pagination());

        let out = schema.validate(&json!({})).unwrap();
        assert_eq!(out.get("page"), Some(&json!(1)));
        assert_eq!(out.get("size"), Some(&json!(10)));

        let out = schema.validate(&json!({"size": 0})).unwrap();
        assert_eq!(out.get("size"), Some(&json!(1)));

        let out = schema.validate(&json!({"size": 5000})).unwrap();
        assert_eq!(out.get("size"), Some(&json!(1000)));
    }

    #[test]
    fn test_page_upper_bound() {
        let schema = Schema::new().fragment(pagination());

        let out = schema.validate(&json!({"page": MAX_COUNT})).unwrap();
        assert_eq!(out.get("page"), Some(&json!(MAX_COUNT)));

        let errors = schema.validate(&json!({"page": 5_000_000_000_i64})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "page");
        assert!(errors[0].problem.contains("at most"));
    }

    #[test]
    fn test_pagination_rejects_zero_page() {
        let schema = Schema::new().fragment(pagination());
        let errors = schema.validate(&json!({"page": 0})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "page");
    }

    #[test]
    fn test_date_range_empty_string_is_absent() {
        let schema = Schema::new().fragment(date_range());
        let out = schema.validate(&json!({"from": "", "to": "2024-02-01"})).unwrap();
        assert!(!out.contains("from"));
        assert_eq!(out.str("to"), Some("2024-02-01"));
    }

    #[test]
    fn test_date_range_reports_bad_date() {
        let schema = Schema::new().fragment(date_range());
        let errors = schema.validate(&json!({"from": "last week"})).unwrap_err();
        assert_eq!(errors[0].field, "from");
        assert!(errors[0].problem.contains("invalid date"));
    }

    #[test]
    fn test_location_normalizes_case() {
        let schema = Schema::new().fragment(location());
        let out = schema
            .validate(&json!({"countries": ["GB", " Fr "], "states": "ny", "cities": ["Austin"]}))
            .unwrap();
        assert_eq!(out.get("countries"), Some(&json!(["gb", "fr"])));
        assert_eq!(out.get("states"), Some(&json!(["NY"])));
        assert_eq!(out.get("cities"), Some(&json!(["Austin"])));
    }

    #[test]
    fn test_location_defaults_to_us() {
        let schema = Schema::new().fragment(location());
        let out = schema.validate(&json!({"countries": []})).unwrap();
        assert_eq!(out.get("countries"), Some(&json!(["us"])));
        assert!(!out.contains("states"));
    }

    #[test]
    fn test_location_rejects_long_codes() {
        let schema = Schema::new().fragment(location());
        let errors = schema.validate(&json!({"countries": ["usa"], "states": ["Texas"]})).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["countries", "states"]);
    }
}
