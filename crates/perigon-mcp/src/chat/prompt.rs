//! System prompt for the chat endpoint.

use chrono::{Days, NaiveDate};

/// Render the system prompt for a conversation held on `today`.
///
/// Relative dates are spelled out so the model can fill `from`/`to`
/// without doing calendar arithmetic.
#[must_use]
pub fn system_prompt(today: NaiveDate) -> String {
    let ago = |days: u64| today.checked_sub_days(Days::new(days)).unwrap_or(today);

    format!(
        "You are a news research assistant backed by the Perigon news API.\n\
         Use the available tools to find articles, stories, journalists, sources, \
         people, companies, topics and Wikipedia pages. Prefer the specific use-case \
         tools (company news, person news, top headlines, location news) when they fit.\n\
         \n\
         Dates use YYYY-MM-DD.\n\
         - Today: {today}\n\
         - Yesterday: {yesterday}\n\
         - 7 days ago: {week}\n\
         - 30 days ago: {month}\n\
         \n\
         Pages are 1-based. Cite article titles and sources in your answer, and say so \
         plainly when a search returns no results.",
        yesterday = ago(1),
        week = ago(7),
        month = ago(30),
    )
}
