// src/ingest/types.rs
use std::collections::BTreeSet;

use crate::config::Topic;
use crate::error::FeedError;

/// Feed entry as decoded, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub published: Option<String>,
    pub authors: Vec<String>, // document order
    pub categories: Vec<String>,
}

/// Canonical record the rest of the pipeline works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEntry {
    pub title: String,
    pub abstract_text: String,
    pub link: String,
    pub authors: Vec<String>,
    /// Display form of `authors`, computed once during normalization.
    pub author_text: String,
    /// `YYYY-MM-DD`
    pub published_date: String,
    pub category_tags: BTreeSet<String>,
}

/// A single bounded page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub categories: Vec<Topic>,
    pub max_results: u32,
}

impl FeedQuery {
    pub fn single(topic: Topic, max_results: u32) -> Self {
        Self {
            categories: vec![topic],
            max_results,
        }
    }

    /// `cat:a` or `cat:a OR cat:b ...`
    pub fn search_query(&self) -> String {
        self.categories
            .iter()
            .map(|t| format!("cat:{}", t.as_str()))
            .collect::<Vec<_>>()
            .join(" OR ")
    }
}

#[async_trait::async_trait]
pub trait FeedTransport: Send + Sync {
    /// Perform one GET and return the body of a successful response.
    async fn get(&self, url: &reqwest::Url) -> Result<String, FeedError>;
}
