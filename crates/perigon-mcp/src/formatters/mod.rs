//! Output formatting for tool results.
//!
//! Results are rendered as compact pseudo-XML: a pagination header followed by
//! one tagged block per item. The text is for LLM consumption only and is never
//! parsed back.

mod blocks;

use std::borrow::Cow;

pub use blocks::{
    Block, format_article, format_company, format_journalist, format_person,
    format_scored_wiki_page, format_source, format_story, format_topic, format_wiki_page,
};

use crate::models::{Pagination, SearchResponse};

/// Text returned for an empty result set.
pub const NO_RESULTS: &str = "No results found";

/// Longest summary or content excerpt kept per item, in characters.
pub const MAX_TEXT_CHARS: usize = 500;

/// Number of pages needed to show `total` results `size` at a time.
#[must_use]
pub const fn total_pages(total: u64, size: u32) -> u64 {
    if size == 0 {
        return 0;
    }
    total.div_ceil(size as u64)
}

/// `Got {N} {itemType} (page {page} of {totalPages})`.
#[must_use]
pub fn pagination_header(total: u64, item_type: &str, pagination: &Pagination) -> String {
    format!(
        "Got {total} {item_type} (page {} of {})",
        pagination.page,
        total_pages(total, pagination.size)
    )
}

/// Render a search response, or [`NO_RESULTS`] when it is empty.
pub fn format_results<T>(
    response: &SearchResponse<T>,
    item_type: &str,
    pagination: &Pagination,
    render: impl Fn(&T) -> String,
) -> String {
    if response.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut output = pagination_header(response.total(), item_type, pagination);
    for item in &response.results {
        output.push_str("\n\n");
        output.push_str(&render(item));
    }
    output
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => Cow::Owned(format!("{}...", text[..end].trim_end())),
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(101, 10), 11);
        assert_eq!(total_pages(100, 10), 10);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_header_is_one_based() {
        let header = pagination_header(101, "articles", &Pagination { page: 1, size: 10 });
        assert_eq!(header, "Got 101 articles (page 1 of 11)");
    }

    #[test]
    fn test_empty_response_is_no_results() {
        let response: SearchResponse<String> = SearchResponse::default();
        let text = format_results(&response, "articles", &Pagination::default(), Clone::clone);
        assert_eq!(text, NO_RESULTS);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
        assert_eq!(truncate("日本語のテキスト", 3), "日本語...");
    }
}
