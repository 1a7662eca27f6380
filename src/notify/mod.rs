// src/notify/mod.rs
//! Notification dispatch: one embed per accepted entry, one zero-match text per
//! silent topic. Delivery failures are logged and swallowed.

pub mod discord;
pub mod log_sink;

use anyhow::Result;
use metrics::counter;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::config::{Language, Topic, TopicConfig};
use crate::ingest::NormalizedEntry;
use crate::metrics::{NOTIFICATIONS_FAILED, NOTIFICATIONS_SENT};
use crate::retry::RetryPolicy;

pub use discord::{match_embed, DiscordWebhook, Embed, EmbedField, EmbedFooter, WebhookPayload};
pub use log_sink::LogSink;

#[async_trait::async_trait]
pub trait WebhookSink: Send + Sync {
    async fn post(&self, url: &str, payload: &WebhookPayload) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// An entry that passed routing and the keyword filter, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub topic: Topic,
    pub entry: NormalizedEntry,
    /// Non-empty, keyword-list order.
    pub matched_keywords: Vec<String>,
    /// Provider output or the failure placeholder.
    pub summary: String,
}

/// What became of one accepted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    /// The post failed; the topic still counts as having a match.
    Failed,
    /// No webhook for the topic. Nothing was posted or counted.
    Unconfigured,
}

/// Dispatched matches per topic for the current run. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunCounters {
    counts: BTreeMap<Topic, u32>,
}

impl RunCounters {
    pub fn new(topics: impl IntoIterator<Item = Topic>) -> Self {
        Self {
            counts: topics.into_iter().map(|t| (t, 0)).collect(),
        }
    }

    pub fn increment(&mut self, topic: Topic) {
        *self.counts.entry(topic).or_insert(0) += 1;
    }

    pub fn get(&self, topic: Topic) -> u32 {
        self.counts.get(&topic).copied().unwrap_or(0)
    }

    pub fn zero_topics(&self) -> Vec<Topic> {
        self.counts
            .iter()
            .filter(|(_, n)| **n == 0)
            .map(|(t, _)| *t)
            .collect()
    }
}

pub struct NotificationDispatcher {
    sink: Box<dyn WebhookSink>,
    topics: Vec<TopicConfig>,
    language: Language,
    counters: RunCounters,
    retry: RetryPolicy,
}

impl NotificationDispatcher {
    pub fn new(
        sink: Box<dyn WebhookSink>,
        topics: Vec<TopicConfig>,
        language: Language,
    ) -> Self {
        let counters = RunCounters::new(topics.iter().map(|t| t.topic));
        Self {
            sink,
            topics,
            language,
            counters,
            retry: RetryPolicy::once(),
        }
    }

    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    fn topic(&self, topic: Topic) -> Option<&TopicConfig> {
        self.topics.iter().find(|t| t.topic == topic)
    }

    /// Returns whether the webhook accepted the payload. Failures are already logged.
    async fn deliver(&self, topic: Topic, url: &str, payload: &WebhookPayload) -> bool {
        let res = self
            .retry
            .run(
                "webhook_post",
                |_| self.sink.post(url, payload),
                |_: &anyhow::Error| true,
            )
            .await;
        match res {
            Ok(()) => {
                counter!(NOTIFICATIONS_SENT).increment(1);
                true
            }
            Err(e) => {
                counter!(NOTIFICATIONS_FAILED).increment(1);
                warn!(
                    target: "notify",
                    %topic,
                    sink = self.sink.name(),
                    error = ?e,
                    "webhook delivery failed"
                );
                false
            }
        }
    }

    /// Send the embed for `m` and count it for its topic. The counter moves even when
    /// delivery fails, so a failed post never turns into a "no matches" report.
    pub async fn dispatch_match(&mut self, m: &MatchResult) -> DispatchOutcome {
        let Some(cfg) = self.topic(m.topic) else {
            warn!(target: "notify", topic = %m.topic, "match for unconfigured topic dropped");
            return DispatchOutcome::Unconfigured;
        };
        let payload = WebhookPayload::embed(match_embed(m, cfg));
        let delivered = self.deliver(m.topic, &cfg.webhook, &payload).await;
        info!(
            target: "notify",
            topic = %m.topic,
            link = %m.entry.link,
            keywords = ?m.matched_keywords,
            delivered,
            "match dispatched"
        );
        self.counters.increment(m.topic);
        if delivered {
            DispatchOutcome::Delivered
        } else {
            DispatchOutcome::Failed
        }
    }

    /// Post the zero-match text to every configured topic that had no dispatched match.
    /// Returns the number of reports attempted.
    pub async fn dispatch_zero(&mut self, run_date: &str) -> usize {
        let mut sent = 0usize;
        for cfg in &self.topics {
            if self.counters.get(cfg.topic) != 0 {
                continue;
            }
            let text = self.language.no_match_text(cfg.topic, run_date);
            let payload = WebhookPayload::text(text);
            let delivered = self.deliver(cfg.topic, &cfg.webhook, &payload).await;
            info!(target: "notify", topic = %cfg.topic, run_date, delivered, "zero-match report");
            sent += 1;
        }
        sent
    }
}
