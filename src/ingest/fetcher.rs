// src/ingest/fetcher.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{error, info};

use crate::error::FeedError;
use crate::ingest::atom;
use crate::ingest::types::{FeedQuery, FeedTransport, RawEntry};
use crate::metrics::{FEED_ENTRIES, FEED_FETCH_ATTEMPTS, FEED_FETCH_FAILURES};
use crate::retry::RetryPolicy;

pub const FEED_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("arxiv-notifier/", env!("CARGO_PKG_VERSION"));

/// Plain reqwest GET; non-2xx statuses are reported as errors.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(FEED_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<String, FeedError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        resp.text()
            .await
            .map_err(|e| FeedError::Transport(format!("reading body: {e}")))
    }
}

pub struct FeedFetcher {
    transport: Box<dyn FeedTransport>,
    endpoint: Url,
    retry: RetryPolicy,
}

impl FeedFetcher {
    pub fn new(
        transport: Box<dyn FeedTransport>,
        endpoint: &str,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim())
            .with_context(|| format!("invalid feed endpoint {endpoint:?}"))?;
        Ok(Self {
            transport,
            endpoint,
            retry,
        })
    }

    pub fn query_url(&self, q: &FeedQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("search_query", &q.search_query())
            .append_pair("sortBy", "submittedDate")
            .append_pair("sortOrder", "descending")
            .append_pair("max_results", &q.max_results.to_string());
        url
    }

    /// Fetch and decode one page. Never fails: exhausted retries yield an empty page.
    pub async fn fetch(&self, q: &FeedQuery) -> Vec<RawEntry> {
        let url = self.query_url(q);
        let search = q.search_query();
        info!(target: "feed", query = %search, max_results = q.max_results, "fetching feed");

        let res = self
            .retry
            .run(
                "feed_fetch",
                |attempt| {
                    let url = &url;
                    async move {
                        counter!(FEED_FETCH_ATTEMPTS).increment(1);
                        tracing::debug!(target: "feed", attempt, %url, "GET");
                        let body = self.transport.get(url).await?;
                        atom::decode(&body)
                    }
                },
                FeedError::is_retryable,
            )
            .await;

        match res {
            Ok(entries) => {
                counter!(FEED_ENTRIES).increment(entries.len() as u64);
                info!(
                    target: "feed",
                    query = %search,
                    entries = entries.len(),
                    "feed page decoded"
                );
                entries
            }
            Err(e) => {
                counter!(FEED_FETCH_FAILURES).increment(1);
                error!(
                    target: "feed",
                    query = %search,
                    attempts = self.retry.max_attempts(),
                    error = %e,
                    "feed unavailable, treating as zero entries"
                );
                Vec::new()
            }
        }
    }
}
