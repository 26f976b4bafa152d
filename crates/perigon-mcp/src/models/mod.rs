//! Data models for Perigon API entities and tool inputs.
//!
//! All response models use `#[serde(default)]` liberally: the API omits
//! fields freely and a missing field must never fail a search.

mod article;
mod entities;
mod inputs;
mod response;
mod story;
mod wikipedia;

pub use article::{Article, ArticleSource};
pub use entities::{
    Company, Journalist, Label, NamedRef, Person, PersonRef, Place, Source, SymbolRef, Topic,
    TopicLabels,
};
pub use inputs::*;
pub use response::{Introspection, SearchResponse};
pub use story::{KeyPoint, Story};
pub use wikipedia::{ScoredWikiPage, WikiPage};
