//! Boolean query normalization for free-text search fields.

use std::sync::LazyLock;

use regex::Regex;

/// Whole-word Boolean operators. Case-sensitive on purpose: `and` is a search term.
static OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:AND|OR|NOT)\b").expect("valid operator regex"));

/// Characters that mark a query as already using query syntax.
const SYNTAX_CHARS: &[char] = &['(', ')', '{', '}', '*', '?', '"', '\''];

/// Returns true if the query already uses Boolean operators, grouping,
/// quoting or wildcards.
#[must_use]
pub fn has_query_syntax(query: &str) -> bool {
    query.contains(SYNTAX_CHARS) || OPERATOR.is_match(query)
}

/// Normalize a free-text query.
///
/// Queries that already use query syntax are returned unchanged. Otherwise
/// the words are joined with `AND`, so `inflation rate` becomes
/// `inflation AND rate`. Idempotent.
#[must_use]
pub fn normalize_query(input: &str) -> String {
    let trimmed = input.trim();
    if has_query_syntax(trimmed) {
        return input.to_string();
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_bare_words() {
        assert_eq!(normalize_query("inflation rate"), "inflation AND rate");
        assert_eq!(normalize_query("  climate   change policy "), "climate AND change AND policy");
    }

    #[test]
    fn test_single_word_is_trimmed() {
        assert_eq!(normalize_query("  tesla "), "tesla");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn test_operators_pass_through() {
        assert_eq!(normalize_query("tesla OR rivian"), "tesla OR rivian");
        assert_eq!(normalize_query("apple NOT fruit"), "apple NOT fruit");
        assert_eq!(normalize_query(" a AND b "), " a AND b ");
    }

    #[test]
    fn test_lowercase_operators_are_terms() {
        assert_eq!(normalize_query("rock and roll"), "rock AND and AND roll");
    }

    #[test]
    fn test_operator_inside_word_is_not_syntax() {
        assert!(!has_query_syntax("ANDROID ORACLE"));
        assert_eq!(normalize_query("ANDROID ORACLE"), "ANDROID AND ORACLE");
    }

    #[test]
    fn test_syntax_chars_pass_through() {
        for query in ["\"climate change\"", "elect*", "wom?n", "(a b)", "{x}", "o'brien news"] {
            assert_eq!(normalize_query(query), query);
        }
    }

    #[test]
    fn test_idempotent_on_examples() {
        for query in ["inflation rate", "x", "", "a OR b", "  spaced  out  "] {
            let once = normalize_query(query);
            assert_eq!(normalize_query(&once), once);
        }
    }
}
