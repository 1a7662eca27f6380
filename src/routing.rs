// src/routing.rs
use std::collections::BTreeSet;

use crate::config::Topic;

/// First topic of `priority` present in `tags`, if any.
/// Tag order is irrelevant; priority order alone breaks ties.
pub fn route(tags: &BTreeSet<String>, priority: &[Topic]) -> Option<Topic> {
    priority.iter().copied().find(|t| tags.contains(t.as_str()))
}

/// How entries of one fetched page are assigned to topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Combined query: pick by priority, drop entries in none of the topics.
    Combined { priority: Vec<Topic> },
    /// Per-topic query: the query already filtered, every entry belongs to it.
    PerTopic(Topic),
}

impl Routing {
    pub fn route(&self, tags: &BTreeSet<String>) -> Option<Topic> {
        match self {
            Routing::Combined { priority } => route(tags, priority),
            Routing::PerTopic(topic) => Some(*topic),
        }
    }
}
