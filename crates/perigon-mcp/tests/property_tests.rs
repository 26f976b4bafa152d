//! Property-based tests for argument normalization.

use proptest::prelude::*;
use serde_json::json;

use perigon_mcp::formatters::total_pages;
use perigon_mcp::schema::{LocationKind, classify_location, has_query_syntax, normalize_query};
use perigon_mcp::tools::ToolRegistry;

proptest! {
    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_is_idempotent(query in "[A-Za-z0-9 ()\"*?']{0,60}") {
        let once = normalize_query(&query);
        prop_assert_eq!(normalize_query(&once), once);
    }

    /// Plain word lists become an AND of the same words.
    #[test]
    fn bare_words_are_joined(words in prop::collection::vec("[a-z]{1,10}", 1..6)) {
        let query = words.join("  ");
        prop_assume!(!has_query_syntax(&query));
        prop_assert_eq!(normalize_query(&query), words.join(" AND "));
    }

    /// Queries already using operators are passed through untouched.
    #[test]
    fn operator_queries_untouched(a in "[a-z]{1,8}", b in "[a-z]{1,8}", op in "(AND|OR|NOT)") {
        let query = format!("{a} {op} {b}");
        prop_assert_eq!(normalize_query(&query), query);
    }

    /// Anything that is not a two-letter code is a city.
    #[test]
    fn long_names_are_cities(name in "[A-Za-z ]{3,30}") {
        prop_assume!(name.trim().chars().count() != 2);
        prop_assert_eq!(classify_location(&name), LocationKind::City);
    }

    /// Page counts cover every result and no more.
    #[test]
    fn page_count_covers_total(total in 0u64..100_000, size in 1u32..=1000) {
        let pages = total_pages(total, size);
        prop_assert!(pages * u64::from(size) >= total);
        prop_assert!(pages == 0 || (pages - 1) * u64::from(size) < total);
    }

    /// Any in-range page size is accepted and echoed back.
    #[test]
    fn page_size_in_range_is_kept(size in 1i64..=1000) {
        let registry = ToolRegistry::new();
        let (_, validated) = registry
            .validate("search_news_articles", &json!({"size": size}))
            .unwrap();
        prop_assert_eq!(validated.get("size"), Some(&json!(size)));
    }
}

#[test]
fn test_page_count_example() {
    assert_eq!(total_pages(101, 10), 11);
    assert_eq!(total_pages(0, 10), 0);
}
