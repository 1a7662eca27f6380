// tests/common/mod.rs
// Shared doubles for the integration tests: scripted feed, recording webhook,
// a summarizer that fails on demand.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::ops::Deref;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use arxiv_notifier::config::{FeedMode, FeedSettings, Language, Topic, TopicConfig};
use arxiv_notifier::ingest::{FeedFetcher, FeedTransport};
use arxiv_notifier::matcher::KeywordSet;
use arxiv_notifier::notify::{NotificationDispatcher, WebhookPayload, WebhookSink};
use arxiv_notifier::pipeline::{fetch_plan, Pipeline};
use arxiv_notifier::summarize::{BoxFuture, Summarizer, SummaryProvider};
use arxiv_notifier::{FeedError, RetryPolicy};
use reqwest::Url;

pub const FAIL_MARKER: &str = "FAIL-SUMMARY";

pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}

const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;

pub fn empty_feed() -> String {
    EMPTY_FEED.to_string()
}

/// Shared handle so a test keeps access to a double it handed to the crate.
pub struct Shared<T>(pub Arc<T>);

impl<T> Shared<T> {
    pub fn new(inner: T) -> Self {
        Self(Arc::new(inner))
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Answers by `search_query`; unknown queries get the fallback, or a 503 if none.
#[derive(Default)]
pub struct ScriptedFeed {
    pub pages: Mutex<Vec<(String, String)>>,
    pub fallback: Option<String>,
    pub failures: Mutex<VecDeque<FeedError>>,
    pub seen: Mutex<Vec<Url>>,
}

impl ScriptedFeed {
    pub fn always(body: String) -> Shared<Self> {
        Shared::new(Self {
            fallback: Some(body),
            ..Default::default()
        })
    }

    pub fn by_query(pages: Vec<(&str, String)>) -> Shared<Self> {
        let owned = pages.into_iter().map(|(q, b)| (q.to_string(), b)).collect();
        Shared::new(Self {
            pages: Mutex::new(owned),
            ..Default::default()
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter_map(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "search_query")
                    .map(|(_, v)| v.into_owned())
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl FeedTransport for Shared<ScriptedFeed> {
    async fn get(&self, url: &Url) -> Result<String, FeedError> {
        self.seen.lock().unwrap().push(url.clone());
        if let Some(e) = self.failures.lock().unwrap().pop_front() {
            return Err(e);
        }
        let q = url
            .query_pairs()
            .find(|(k, _)| k == "search_query")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        let pages = self.pages.lock().unwrap();
        if let Some((_, body)) = pages.iter().find(|(k, _)| *k == q) {
            return Ok(body.clone());
        }
        self.fallback.clone().ok_or(FeedError::Status(503))
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub posts: Mutex<Vec<(String, WebhookPayload)>>,
    pub fail_urls: Vec<String>,
}

impl RecordingSink {
    pub fn posts(&self) -> Vec<(String, WebhookPayload)> {
        self.posts.lock().unwrap().clone()
    }

    pub fn embeds_to(&self, url: &str) -> Vec<String> {
        self.posts()
            .into_iter()
            .filter(|(u, _)| u == url)
            .flat_map(|(_, p)| p.embeds.into_iter().map(|e| e.title))
            .collect()
    }

    pub fn texts_to(&self, url: &str) -> Vec<String> {
        self.posts()
            .into_iter()
            .filter(|(u, _)| u == url)
            .filter_map(|(_, p)| p.content)
            .collect()
    }
}

#[async_trait::async_trait]
impl WebhookSink for Shared<RecordingSink> {
    async fn post(&self, url: &str, payload: &WebhookPayload) -> Result<()> {
        self.posts
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        if self.fail_urls.iter().any(|u| u == url) {
            return Err(anyhow!("webhook returned HTTP 500"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Echoes a fixed summary, fails for abstracts carrying [`FAIL_MARKER`].
pub struct MarkerProvider {
    pub calls: Mutex<u32>,
}

impl SummaryProvider for MarkerProvider {
    fn complete<'a>(
        &'a self,
        _instruction: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        *self.calls.lock().unwrap() += 1;
        let fail = text.contains(FAIL_MARKER);
        Box::pin(async move {
            if fail {
                Err(anyhow!("upstream 500"))
            } else {
                Ok("line one\nline two\nline three".to_string())
            }
        })
    }

    fn name(&self) -> &'static str {
        "marker"
    }
}

pub fn hook(topic: Topic) -> String {
    format!("https://discord.test/api/webhooks/{}", topic.as_str())
}

pub fn topics(list: &[Topic]) -> Vec<TopicConfig> {
    list.iter()
        .map(|t| TopicConfig::new(*t, hook(*t)))
        .collect()
}

pub fn feed(mode: FeedMode) -> FeedSettings {
    FeedSettings {
        endpoint: "http://export.arxiv.test/api/query".into(),
        mode,
        combined_max_results: None,
    }
}

pub struct Harness {
    pub pipeline: Pipeline,
    pub feed: Shared<ScriptedFeed>,
    pub sink: Shared<RecordingSink>,
    pub provider: Arc<MarkerProvider>,
}

pub fn harness(
    feed_src: Shared<ScriptedFeed>,
    sink: Shared<RecordingSink>,
    topic_list: &[Topic],
    mode: FeedMode,
    keywords: &str,
) -> Harness {
    let cfgs = topics(topic_list);
    let settings = feed(mode);
    let fetcher = FeedFetcher::new(
        Box::new(feed_src.clone()),
        &settings.endpoint,
        RetryPolicy::once(),
    )
    .expect("valid endpoint");
    let provider = Arc::new(MarkerProvider {
        calls: Mutex::new(0),
    });
    let summarizer = Summarizer::new(provider.clone(), Language::En);
    let dispatcher =
        NotificationDispatcher::new(Box::new(sink.clone()), cfgs.clone(), Language::En);
    let pipeline = Pipeline::new(
        fetcher,
        KeywordSet::from_lines(keywords),
        summarizer,
        dispatcher,
        fetch_plan(&cfgs, &settings),
    );
    Harness {
        pipeline,
        feed: feed_src,
        sink,
        provider,
    }
}
