// src/ingest/normalize.rs
use std::collections::BTreeSet;

use crate::error::NormalizeError;
use crate::ingest::types::{NormalizedEntry, RawEntry};

/// Authors shown before the list collapses into "et al.".
pub const MAX_DISPLAY_AUTHORS: usize = 3;

/// "A, B, C et al." for more than three authors, otherwise all of them comma-joined.
pub fn author_display(authors: &[String]) -> String {
    if authors.len() > MAX_DISPLAY_AUTHORS {
        format!("{} et al.", authors[..MAX_DISPLAY_AUTHORS].join(", "))
    } else {
        authors.join(", ")
    }
}

/// Date portion of an ISO-8601 timestamp. Truncates, never parses.
pub fn date_prefix(ts: &str) -> String {
    ts.trim().chars().take(10).collect()
}

fn required<'a>(v: &'a Option<String>, field: &'static str) -> Result<&'a str, NormalizeError> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingField(field))
}

/// Pure: identical input always yields an identical record.
pub fn normalize(raw: &RawEntry) -> Result<NormalizedEntry, NormalizeError> {
    let title = required(&raw.title, "title")?;
    let link = required(&raw.id, "id")?;
    let abstract_text = required(&raw.summary, "summary")?;
    let published = required(&raw.published, "published")?;

    let authors: Vec<String> = raw
        .authors
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();

    let category_tags: BTreeSet<String> = raw
        .categories
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    Ok(NormalizedEntry {
        title: title.to_string(),
        abstract_text: abstract_text.to_string(),
        link: link.to_string(),
        author_text: author_display(&authors),
        authors,
        published_date: date_prefix(published),
        category_tags,
    })
}
