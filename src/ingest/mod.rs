// src/ingest/mod.rs
//! Feed side of the pipeline: query building, fetch with retry, Atom decoding, normalization.

pub mod atom;
pub mod fetcher;
pub mod normalize;
pub mod types;

pub use fetcher::{FeedFetcher, HttpTransport};
pub use normalize::{author_display, normalize};
pub use types::{FeedQuery, FeedTransport, NormalizedEntry, RawEntry};
