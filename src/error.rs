// src/error.rs
use thiserror::Error;

/// One failed feed attempt. Every variant is transient from the fetcher's point of view.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("feed returned HTTP {0}")]
    Status(u16),

    #[error("feed transport error: {0}")]
    Transport(String),

    #[error("malformed feed body: {0}")]
    Malformed(String),
}

impl FeedError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedError::Status(_) | FeedError::Transport(_) | FeedError::Malformed(_)
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("entry is missing `{0}`")]
    MissingField(&'static str),
}
