//! Per-item pseudo-XML blocks.

use std::fmt::Display;

use super::{MAX_TEXT_CHARS, truncate};
use crate::models::{
    Article, Company, Journalist, Person, ScoredWikiPage, Source, Story, Topic, WikiPage,
};

/// Builder for one tagged block. Empty children are skipped.
#[derive(Debug, Clone)]
pub struct Block {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<String>,
}

impl Block {
    /// Start a block with the given tag.
    #[must_use]
    pub const fn new(tag: &'static str) -> Self {
        Self { tag, attrs: Vec::new(), children: Vec::new() }
    }

    /// Add an attribute to the opening tag.
    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Display) -> Self {
        self.attrs.push((name, value.to_string()));
        self
    }

    /// Add `<tag>value</tag>` when the value is present and non-blank.
    #[must_use]
    pub fn child(mut self, tag: &str, value: Option<impl AsRef<str>>) -> Self {
        if let Some(value) = value {
            let value = value.as_ref().trim();
            if !value.is_empty() {
                self.children.push(format!("<{tag}>{value}</{tag}>"));
            }
        }
        self
    }

    /// Add a child truncated to [`MAX_TEXT_CHARS`].
    #[must_use]
    pub fn text(self, tag: &str, value: Option<&str>) -> Self {
        self.child(tag, value.map(|v| truncate(v.trim(), MAX_TEXT_CHARS)))
    }

    /// Add a comma-joined child when the list is non-empty.
    #[must_use]
    pub fn list<S: AsRef<str>>(self, tag: &str, values: impl IntoIterator<Item = S>) -> Self {
        let joined = values
            .into_iter()
            .filter(|v| !v.as_ref().trim().is_empty())
            .map(|v| v.as_ref().trim().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.child(tag, Some(joined))
    }

    /// Render the block.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            output.push_str(&format!(" {name}=\"{value}\""));
        }
        output.push('>');
        for child in &self.children {
            output.push('\n');
            output.push_str(child);
        }
        output.push_str(&format!("\n</{}>", self.tag));
        output
    }
}

/// `<article>` block.
#[must_use]
pub fn format_article(article: &Article) -> String {
    Block::new("article")
        .attr("id", &article.article_id)
        .child("title", article.title.as_deref())
        .text("summary", article.best_summary())
        .child("pubDate", article.pub_date.as_deref())
        .child("source", article.source_domain())
        .child("url", article.url.as_deref())
        .child("authors", article.authors_byline.as_deref())
        .child("clusterId", article.cluster_id.as_deref())
        .list("categories", article.categories.iter().filter_map(|c| c.name.as_deref()))
        .list("companies", article.companies.iter().filter_map(|c| c.name.as_deref()))
        .list("people", article.people.iter().filter_map(|p| p.name.as_deref()))
        .render()
}

/// `<story>` block.
#[must_use]
pub fn format_story(story: &Story) -> String {
    Block::new("story")
        .attr("id", &story.id)
        .child("name", story.name.as_deref())
        .text("summary", story.summary.as_deref())
        .list("keyPoints", story.key_points.iter().filter_map(|k| k.point.as_deref()))
        .child("uniqueSources", story.unique_count.map(|n| n.to_string()))
        .child("articles", story.total_count.map(|n| n.to_string()))
        .child("createdAt", story.created_at.as_deref())
        .child("updatedAt", story.updated_at.as_deref())
        .list("topics", story.top_topics.iter().filter_map(|t| t.name.as_deref()))
        .list("people", story.top_people.iter().filter_map(|p| p.name.as_deref()))
        .list("companies", story.top_companies.iter().filter_map(|c| c.name.as_deref()))
        .render()
}

/// `<journalist>` block.
#[must_use]
pub fn format_journalist(journalist: &Journalist) -> String {
    Block::new("journalist")
        .attr("id", &journalist.id)
        .child("name", Some(journalist.display_name()))
        .child("title", journalist.title.as_deref())
        .child("twitter", journalist.twitter_handle.as_deref())
        .list("sources", journalist.top_sources.iter().filter_map(|s| s.name.as_deref()))
        .list("topics", journalist.top_topics.iter().filter_map(|t| t.name.as_deref()))
        .list("locations", journalist.locations.iter().filter_map(|l| l.display()))
        .child("avgMonthlyPosts", journalist.avg_monthly_posts.map(|n| format!("{n:.0}")))
        .render()
}

/// `<source>` block.
#[must_use]
pub fn format_source(source: &Source) -> String {
    Block::new("source")
        .attr("id", &source.id)
        .child("domain", source.domain.as_deref())
        .child("name", source.name.as_deref())
        .text("description", source.description.as_deref())
        .child("location", source.location.as_ref().and_then(|l| l.display()))
        .child("monthlyVisits", source.monthly_visits.map(|n| n.to_string()))
        .child("avgMonthlyPosts", source.avg_monthly_posts.map(|n| format!("{n:.0}")))
        .child("paywall", source.paywall.map(|p| p.to_string()))
        .render()
}

/// `<person>` block.
#[must_use]
pub fn format_person(person: &Person) -> String {
    Block::new("person")
        .attr("wikidataId", &person.wikidata_id)
        .child("name", person.name.as_deref())
        .text("description", person.description.as_deref())
        .list("occupation", person.occupation.iter().filter_map(|o| o.label.as_deref()))
        .list("position", person.position.iter().filter_map(|p| p.label.as_deref()))
        .render()
}

/// `<company>` block.
#[must_use]
pub fn format_company(company: &Company) -> String {
    Block::new("company")
        .attr("id", &company.id)
        .child("name", company.name.as_deref())
        .list("altNames", &company.alt_names)
        .list("domains", &company.domains)
        .list("symbols", company.symbols.iter().map(|s| s.symbol()))
        .child("industry", company.industry.as_deref())
        .child("country", company.country.as_deref())
        .text("description", company.description.as_deref())
        .render()
}

/// `<topic>` block.
#[must_use]
pub fn format_topic(topic: &Topic) -> String {
    let labels = topic.labels.as_ref();
    let mut block = Block::new("topic");
    if let Some(id) = &topic.id {
        block = block.attr("id", id.as_str().map_or_else(|| id.to_string(), str::to_string));
    }
    block
        .child("name", topic.name.as_deref())
        .child("category", labels.and_then(|l| l.category.as_deref()))
        .child("subcategory", labels.and_then(|l| l.subcategory.as_deref()))
        .render()
}

fn wiki_block(page: &WikiPage) -> Block {
    Block::new("wikipedia")
        .attr("id", &page.id)
        .child("title", page.wiki_title.as_deref())
        .child("url", page.url.as_deref())
        .child("wikidataId", page.wikidata_id.as_deref())
        .text("summary", page.summary.as_deref())
        .child("pageviews", page.pageviews.map(|n| n.to_string()))
}

/// `<wikipedia>` block.
#[must_use]
pub fn format_wiki_page(page: &WikiPage) -> String {
    wiki_block(page).render()
}

/// `<wikipedia>` block with its similarity score.
#[must_use]
pub fn format_scored_wiki_page(hit: &ScoredWikiPage) -> String {
    wiki_block(&hit.data).attr("score", format!("{:.3}", hit.score)).render()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_block_skips_empty_children() {
        let text = Block::new("x")
            .attr("id", "1")
            .child("a", Some("value"))
            .child("b", None::<&str>)
            .child("c", Some("  "))
            .list("d", Vec::<String>::new())
            .render();
        assert_eq!(text, "<x id=\"1\">\n<a>value</a>\n</x>");
    }

    #[test]
    fn test_article_block() {
        let article: Article = serde_json::from_value(json!({
            "articleId": "abc",
            "title": "Fed holds rates",
            "description": "The Federal Reserve kept rates unchanged.",
            "pubDate": "2024-01-31T19:00:00Z",
            "source": {"domain": "reuters.com"},
            "companies": [{"id": "c1", "name": "Goldman Sachs"}]
        }))
        .unwrap();

        let text = format_article(&article);
        assert!(text.starts_with("<article id=\"abc\">"));
        assert!(text.contains("<title>Fed holds rates</title>"));
        assert!(text.contains("<summary>The Federal Reserve kept rates unchanged.</summary>"));
        assert!(text.contains("<source>reuters.com</source>"));
        assert!(text.contains("<companies>Goldman Sachs</companies>"));
        assert!(!text.contains("<people>"));
        assert!(text.ends_with("</article>"));
    }

    #[test]
    fn test_long_summary_is_truncated() {
        let story = Story {
            id: "s1".into(),
            summary: Some("word ".repeat(400)),
            ..Story::default()
        };
        let text = format_story(&story);
        assert!(text.contains("...</summary>"));
        assert!(text.len() < 700);
    }
}
