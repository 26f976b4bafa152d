//! Rendering tests for tool output.

use serde_json::json;

use perigon_mcp::formatters::{MAX_TEXT_CHARS, format_article, format_results, format_story};
use perigon_mcp::models::{Article, Pagination, SearchResponse, Story};

#[test]
fn test_article_page_rendering() {
    let response: SearchResponse<Article> = serde_json::from_value(json!({
        "numResults": 25,
        "results": [{
            "articleId": "a1",
            "title": "Fed holds rates",
            "summary": "The Federal Reserve kept rates unchanged.",
            "pubDate": "2024-05-01T14:00:00Z",
            "source": {"domain": "reuters.com"},
            "url": "https://reuters.com/x",
            "categories": [{"name": "Finance"}, {"name": "Politics"}]
        }]
    }))
    .unwrap();

    let text = format_results(&response, "articles", &Pagination { page: 2, size: 10 }, format_article);

    insta::assert_snapshot!(text, @r#"
    Got 25 articles (page 2 of 3)

    <article id="a1">
    <title>Fed holds rates</title>
    <summary>The Federal Reserve kept rates unchanged.</summary>
    <pubDate>2024-05-01T14:00:00Z</pubDate>
    <source>reuters.com</source>
    <url>https://reuters.com/x</url>
    <categories>Finance, Politics</categories>
    </article>
    "#);
}

#[test]
fn test_missing_fields_are_omitted() {
    let article: Article = serde_json::from_value(json!({"articleId": "bare"})).unwrap();
    assert_eq!(format_article(&article), "<article id=\"bare\">\n</article>");
}

#[test]
fn test_summary_falls_back_and_truncates() {
    let long = "word ".repeat(200);
    let article: Article = serde_json::from_value(json!({
        "articleId": "a2",
        "summary": "   ",
        "content": long,
    }))
    .unwrap();

    let block = format_article(&article);
    let summary = block
        .lines()
        .find(|l| l.starts_with("<summary>"))
        .unwrap()
        .trim_start_matches("<summary>")
        .trim_end_matches("</summary>");
    assert!(summary.ends_with("..."));
    assert!(summary.chars().count() <= MAX_TEXT_CHARS + 3);
}

#[test]
fn test_story_key_points() {
    let story: Story = serde_json::from_value(json!({
        "id": "st-1",
        "name": "Chip export rules",
        "keyPoints": [{"point": "New limits"}, {"point": "Allies consulted"}],
        "uniqueCount": 14
    }))
    .unwrap();

    let block = format_story(&story);
    assert!(block.starts_with("<story id=\"st-1\">"));
    assert!(block.contains("<keyPoints>New limits, Allies consulted</keyPoints>"));
    assert!(block.contains("<uniqueSources>14</uniqueSources>"));
}

#[test]
fn test_empty_page_is_no_results() {
    let response: SearchResponse<Article> =
        serde_json::from_value(json!({"numResults": 0, "results": []})).unwrap();
    assert_eq!(
        format_results(&response, "articles", &Pagination::default(), format_article),
        "No results found"
    );
}
