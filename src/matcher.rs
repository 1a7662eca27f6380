// src/matcher.rs
//! Keyword list loading and substring matching.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Lowercased keywords in file order, blanks and duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn from_lines(s: &str) -> Self {
        let mut keywords: Vec<String> = Vec::new();
        for line in s.lines() {
            let k = line.trim().to_lowercase();
            if !k.is_empty() && !keywords.contains(&k) {
                keywords.push(k);
            }
        }
        Self { keywords }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading keywords from {}", path.display()))?;
        let set = Self::from_lines(&content);
        if set.is_empty() {
            tracing::warn!(path = %path.display(), "keyword file is empty; nothing will match");
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    /// Keywords contained in `text`, in keyword-list order. Plain substring
    /// containment: "ph" matches "phase".
    pub fn matches(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .cloned()
            .collect()
    }
}

/// Lowercased `title + " " + abstract`. Whitespace is kept as is, so a phrase
/// broken across a feed line wrap does not match.
pub fn entry_text(title: &str, abstract_text: &str) -> String {
    format!("{title} {abstract_text}").to_lowercase()
}
