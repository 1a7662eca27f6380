// src/config/mod.rs
//! Startup configuration. Built once, then passed explicitly to the components.

pub mod app;
pub mod topics;

pub use app::{AppConfig, FeedMode, FeedSettings, Language, SummarySettings};
pub use topics::{Topic, TopicConfig, TopicOverride, DEFAULT_MAX_RESULTS};
