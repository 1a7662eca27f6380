// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod ingest;
pub mod matcher;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod retry;
pub mod routing;
pub mod summarize;

/// Log filter used when `RUST_LOG` is unset. Feed and delivery events are
/// emitted under their own `feed` and `notify` targets.
pub const DEFAULT_LOG_FILTER: &str = "arxiv_notifier=info,feed=info,notify=info,warn";

// ---- Re-exports for stable public API ----
pub use crate::config::{AppConfig, Topic, TopicConfig};
pub use crate::error::{FeedError, NormalizeError};
pub use crate::notify::{DispatchOutcome, MatchResult, NotificationDispatcher, RunCounters};
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::retry::RetryPolicy;

/// Build the production pipeline from `cfg` and run it once.
///
/// Only configuration problems surface as errors; fetch, summarize and delivery
/// failures are recovered inside the run and show up in the returned report.
pub async fn run_once(cfg: &AppConfig, run_date: &str) -> anyhow::Result<RunReport> {
    let mut pipeline = Pipeline::from_config(cfg)?;
    Ok(pipeline.run(run_date).await)
}
