// src/pipeline.rs
//! One run: fetch → normalize → route → match → summarize → dispatch.
//! Zero-match reports go out after the last query.

use anyhow::Result;
use metrics::counter;
use tracing::{debug, info, trace, warn};

use crate::config::{AppConfig, FeedMode, FeedSettings, TopicConfig};
use crate::ingest::{normalize, FeedFetcher, FeedQuery, HttpTransport, RawEntry};
use crate::matcher::{entry_text, KeywordSet};
use crate::metrics::{ensure_described, ENTRIES_MATCHED, ENTRIES_SKIPPED};
use crate::notify::{
    DiscordWebhook, DispatchOutcome, LogSink, MatchResult, NotificationDispatcher, WebhookSink,
};
use crate::retry::RetryPolicy;
use crate::routing::Routing;
use crate::summarize::{build_provider, Summarizer};

/// Totals for one run, logged at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub queries: usize,
    pub fetched: usize,
    pub skipped: usize,
    pub unrouted: usize,
    pub unmatched: usize,
    pub dispatched: usize,
    pub delivery_failures: usize,
    pub zero_reports: usize,
}

/// Queries to issue, each with the routing that applies to its entries.
pub fn fetch_plan(topics: &[TopicConfig], feed: &FeedSettings) -> Vec<(FeedQuery, Routing)> {
    if topics.is_empty() {
        return Vec::new();
    }
    match feed.mode {
        FeedMode::Combined => {
            let max_results = feed
                .combined_max_results
                .unwrap_or_else(|| topics.iter().map(|t| t.max_results).max().unwrap_or(1));
            let priority: Vec<_> = topics.iter().map(|t| t.topic).collect();
            vec![(
                FeedQuery {
                    categories: priority.clone(),
                    max_results,
                },
                Routing::Combined { priority },
            )]
        }
        FeedMode::PerTopic => topics
            .iter()
            .map(|t| {
                let query = FeedQuery::single(t.topic, t.max_results);
                (query, Routing::PerTopic(t.topic))
            })
            .collect(),
    }
}

pub struct Pipeline {
    fetcher: FeedFetcher,
    keywords: KeywordSet,
    summarizer: Summarizer,
    dispatcher: NotificationDispatcher,
    plan: Vec<(FeedQuery, Routing)>,
}

impl Pipeline {
    pub fn new(
        fetcher: FeedFetcher,
        keywords: KeywordSet,
        summarizer: Summarizer,
        dispatcher: NotificationDispatcher,
        plan: Vec<(FeedQuery, Routing)>,
    ) -> Self {
        Self {
            fetcher,
            keywords,
            summarizer,
            dispatcher,
            plan,
        }
    }

    /// Production wiring. Fails only on configuration problems (e.g. unreadable keyword file).
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        ensure_described();

        let keywords = KeywordSet::load(&cfg.keywords_path)?;
        info!(count = keywords.len(), path = %cfg.keywords_path.display(), "keywords loaded");

        let fetcher = FeedFetcher::new(
            Box::new(HttpTransport::new()?),
            &cfg.feed.endpoint,
            RetryPolicy::default(),
        )?;
        let language = cfg.summary.language;
        let summarizer = Summarizer::new(build_provider(&cfg.summary)?, language);
        let sink: Box<dyn WebhookSink> = if cfg.dry_run {
            Box::new(LogSink)
        } else {
            Box::new(DiscordWebhook::new()?)
        };
        let dispatcher = NotificationDispatcher::new(sink, cfg.topics.clone(), language);

        Ok(Self::new(
            fetcher,
            keywords,
            summarizer,
            dispatcher,
            fetch_plan(&cfg.topics, &cfg.feed),
        ))
    }

    pub async fn run(&mut self, run_date: &str) -> RunReport {
        let mut report = RunReport::default();
        let plan = self.plan.clone();

        for (query, routing) in &plan {
            report.queries += 1;
            let entries = self.fetcher.fetch(query).await;
            report.fetched += entries.len();
            for raw in &entries {
                self.process(raw, routing, &mut report).await;
            }
        }

        report.zero_reports = self.dispatcher.dispatch_zero(run_date).await;

        info!(
            run_date,
            queries = report.queries,
            fetched = report.fetched,
            skipped = report.skipped,
            unrouted = report.unrouted,
            unmatched = report.unmatched,
            dispatched = report.dispatched,
            delivery_failures = report.delivery_failures,
            zero_reports = report.zero_reports,
            "run finished"
        );
        report
    }

    async fn process(&mut self, raw: &RawEntry, routing: &Routing, report: &mut RunReport) {
        let entry = match normalize(raw) {
            Ok(e) => e,
            Err(e) => {
                report.skipped += 1;
                counter!(ENTRIES_SKIPPED).increment(1);
                warn!(id = ?raw.id, error = %e, "skipping malformed entry");
                return;
            }
        };

        let Some(topic) = routing.route(&entry.category_tags) else {
            report.unrouted += 1;
            debug!(link = %entry.link, tags = ?entry.category_tags, "no configured topic");
            return;
        };

        let matched = self
            .keywords
            .matches(&entry_text(&entry.title, &entry.abstract_text));
        if matched.is_empty() {
            report.unmatched += 1;
            trace!(link = %entry.link, "no keyword match");
            return;
        }
        counter!(ENTRIES_MATCHED).increment(1);

        let summary = self.summarizer.summarize(&entry.abstract_text).await;
        let m = MatchResult {
            topic,
            entry,
            matched_keywords: matched,
            summary,
        };
        match self.dispatcher.dispatch_match(&m).await {
            DispatchOutcome::Delivered => report.dispatched += 1,
            DispatchOutcome::Failed => {
                report.dispatched += 1;
                report.delivery_failures += 1;
            }
            DispatchOutcome::Unconfigured => report.unrouted += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Topic;

    fn topics() -> Vec<TopicConfig> {
        let mut th = TopicConfig::new(Topic::HepTh, "h1");
        th.max_results = 20;
        vec![th, TopicConfig::new(Topic::QuantPh, "h2")]
    }

    fn feed(mode: FeedMode, combined: Option<u32>) -> FeedSettings {
        FeedSettings {
            endpoint: "http://localhost/api/query".into(),
            mode,
            combined_max_results: combined,
        }
    }

    #[test]
    fn combined_plan_is_one_query_with_largest_bound() {
        let plan = fetch_plan(&topics(), &feed(FeedMode::Combined, None));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].0.search_query(), "cat:hep-th OR cat:quant-ph");
        assert_eq!(plan[0].0.max_results, 20);
        assert_eq!(
            plan[0].1,
            Routing::Combined {
                priority: vec![Topic::HepTh, Topic::QuantPh]
            }
        );

        let plan = fetch_plan(&topics(), &feed(FeedMode::Combined, Some(50)));
        assert_eq!(plan[0].0.max_results, 50);
    }

    #[test]
    fn per_topic_plan_has_one_query_per_topic_in_priority_order() {
        let plan = fetch_plan(&topics(), &feed(FeedMode::PerTopic, Some(50)));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].0, FeedQuery::single(Topic::HepTh, 20));
        assert_eq!(plan[0].1, Routing::PerTopic(Topic::HepTh));
        assert_eq!(plan[1].0, FeedQuery::single(Topic::QuantPh, 10));
    }

    #[test]
    fn no_topics_means_no_queries() {
        assert!(fetch_plan(&[], &feed(FeedMode::Combined, None)).is_empty());
    }
}
