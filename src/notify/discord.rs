use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{MatchResult, WebhookSink};
use crate::config::TopicConfig;

pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
pub const FOOTER_TEXT: &str = "arXiv notification bot";

// Discord rejects embeds above these sizes.
const MAX_TITLE: usize = 256;
const MAX_DESCRIPTION: usize = 4096;
const MAX_FIELD_VALUE: usize = 1024;

#[derive(Clone)]
pub struct DiscordWebhook {
    client: Client,
}

impl DiscordWebhook {
    pub fn new() -> Result<Self> {
        Self::with_timeout(WEBHOOK_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building webhook http client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl WebhookSink for DiscordWebhook {
    async fn post(&self, url: &str, payload: &WebhookPayload) -> Result<()> {
        self.client
            .post(url)
            .json(payload)
            .send()
            .await
            .context("webhook post")?
            .error_for_status()
            .context("webhook non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub url: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
}

/// Either `{"embeds": [...]}` or `{"content": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

impl WebhookPayload {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: Vec::new(),
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            content: None,
            embeds: vec![embed],
        }
    }
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn field(name: &str, value: &str, inline: bool) -> EmbedField {
    // empty field values are rejected
    let value = if value.trim().is_empty() { "-" } else { value };
    EmbedField {
        name: name.to_string(),
        value: clip(value, MAX_FIELD_VALUE),
        inline,
    }
}

/// Rich message for one accepted entry.
pub fn match_embed(m: &MatchResult, topic: &TopicConfig) -> Embed {
    Embed {
        title: clip(&format!("[{}] {}", topic.topic, m.entry.title), MAX_TITLE),
        description: clip(&m.summary, MAX_DESCRIPTION),
        url: m.entry.link.clone(),
        color: topic.color,
        fields: vec![
            field("Authors", &m.entry.author_text, false),
            field("Published", &m.entry.published_date, true),
            field("Keywords", &m.matched_keywords.join(", "), true),
        ],
        footer: EmbedFooter {
            text: FOOTER_TEXT.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Topic;
    use crate::ingest::NormalizedEntry;

    fn sample() -> MatchResult {
        MatchResult {
            topic: Topic::HepTh,
            entry: NormalizedEntry {
                title: "Holography".into(),
                abstract_text: "abs".into(),
                link: "http://arxiv.org/abs/1".into(),
                authors: vec!["A".into(), "B".into()],
                author_text: "A, B".into(),
                published_date: "2024-05-01".into(),
                category_tags: ["hep-th".to_string()].into_iter().collect(),
            },
            matched_keywords: vec!["holography".into(), "ads".into()],
            summary: "short summary".into(),
        }
    }

    #[test]
    fn embed_payload_has_expected_shape() {
        let topic = TopicConfig::new(Topic::HepTh, "https://hook");
        let payload = WebhookPayload::embed(match_embed(&sample(), &topic));
        let v = serde_json::to_value(&payload).unwrap();

        assert!(v.get("content").is_none());
        let e = &v["embeds"][0];
        assert_eq!(e["title"], "[hep-th] Holography");
        assert_eq!(e["description"], "short summary");
        assert_eq!(e["url"], "http://arxiv.org/abs/1");
        assert_eq!(e["color"], 0x3498db);
        assert_eq!(e["fields"][0]["name"], "Authors");
        assert_eq!(e["fields"][0]["value"], "A, B");
        assert_eq!(e["fields"][0]["inline"], false);
        assert_eq!(e["fields"][1]["value"], "2024-05-01");
        assert_eq!(e["fields"][1]["inline"], true);
        assert_eq!(e["fields"][2]["value"], "holography, ads");
        assert_eq!(e["footer"]["text"], FOOTER_TEXT);
    }

    #[test]
    fn text_payload_has_only_content() {
        let payload = WebhookPayload::text("nothing today");
        let v = serde_json::to_value(payload).unwrap();
        assert_eq!(v, serde_json::json!({"content": "nothing today"}));
    }

    #[test]
    fn empty_authors_render_as_dash_and_long_text_is_clipped() {
        let mut m = sample();
        m.entry.author_text.clear();
        m.summary = "x".repeat(5000);
        let e = match_embed(&m, &TopicConfig::new(Topic::HepTh, "h"));
        assert_eq!(e.fields[0].value, "-");
        assert_eq!(e.description.chars().count(), MAX_DESCRIPTION);
    }
}
