// src/config/app.rs
use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

use super::topics::{load_overrides, parse_topic_list, Topic, TopicConfig, ENV_TOPICS_CONFIG_PATH};

pub const DEFAULT_FEED_ENDPOINT: &str = "http://export.arxiv.org/api/query";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_TOPICS: &str = "hep-th,quant-ph";
pub const DEFAULT_KEYWORDS_PATH: &str = "keywords.txt";

const JA_NO_MATCH: &str = "本日はキーワードに該当する論文はありませんでした。";

/// How the feed is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedMode {
    /// One OR-combined query; entries are routed by category priority.
    #[default]
    Combined,
    /// One query per topic; routing is implicit.
    PerTopic,
}

impl FromStr for FeedMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(FeedMode::Combined),
            "per-topic" | "per_topic" | "pertopic" => Ok(FeedMode::PerTopic),
            other => bail!("unsupported FEED_MODE: {other:?}"),
        }
    }
}

/// Display language for summaries and zero-match messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Ja,
    En,
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" | "japanese" => Ok(Language::Ja),
            "en" | "english" => Ok(Language::En),
            other => bail!("unsupported SUMMARY_LANGUAGE: {other:?}"),
        }
    }
}

impl Language {
    /// Instruction sent ahead of the abstract.
    pub fn instruction(self) -> &'static str {
        match self {
            Language::Ja => "以下の論文要旨を日本語で3行以内に要約してください。",
            Language::En => "Summarize the following paper abstract in English in at most 3 lines.",
        }
    }

    /// Shown in place of a summary when summarization fails.
    pub fn summary_placeholder(self) -> &'static str {
        match self {
            Language::Ja => "（要約の生成に失敗しました）",
            Language::En => "(summary unavailable)",
        }
    }

    pub fn no_match_text(self, topic: Topic, date: &str) -> String {
        match self {
            Language::Ja => format!("[{topic}] {date}: {JA_NO_MATCH}"),
            Language::En => format!("[{topic}] {date}: no matching papers today."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSettings {
    pub endpoint: String,
    pub mode: FeedMode,
    /// Page size for the combined query; `None` means the largest topic bound.
    pub combined_max_results: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySettings {
    /// Empty only in mock mode.
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub language: Language,
    pub mock: bool,
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Configured topics in priority order.
    pub topics: Vec<TopicConfig>,
    pub feed: FeedSettings,
    pub summary: SummarySettings,
    pub keywords_path: PathBuf,
    pub dry_run: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary key lookup (env in production, a map in tests).
    /// Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).and_then(non_blank);
        let get_or = |k: &str, default: &str| get(k).unwrap_or_else(|| default.to_string());
        let required = |k: &str| get(k).ok_or_else(|| anyhow!("missing env var {k}"));

        let topic_list = get_or("ARXIV_TOPICS", DEFAULT_TOPICS);
        let priority = parse_topic_list(&topic_list).context("ARXIV_TOPICS")?;
        let overrides = load_overrides(get(ENV_TOPICS_CONFIG_PATH).as_deref())?;

        let mut topics = Vec::with_capacity(priority.len());
        for topic in priority {
            let mut tc = TopicConfig::new(topic, required(topic.webhook_env())?);
            if let Some(ov) = overrides.get(&topic) {
                tc.apply(ov);
            }
            topics.push(tc);
        }

        let mode = match get("FEED_MODE") {
            Some(s) => s.parse()?,
            None => FeedMode::default(),
        };
        let combined_max_results = get("COMBINED_MAX_RESULTS")
            .map(|s| {
                s.parse::<u32>()
                    .map(|n| n.max(1))
                    .with_context(|| format!("COMBINED_MAX_RESULTS is not a number: {s:?}"))
            })
            .transpose()?;

        let mock = get("SUMMARY_TEST_MODE").is_some_and(|v| v == "mock");
        let api_key = if mock {
            get("OPENAI_API_KEY").unwrap_or_default()
        } else {
            required("OPENAI_API_KEY")?
        };
        let language = match get("SUMMARY_LANGUAGE") {
            Some(s) => s.parse()?,
            None => Language::default(),
        };

        Ok(Self {
            topics,
            feed: FeedSettings {
                endpoint: get_or("ARXIV_ENDPOINT", DEFAULT_FEED_ENDPOINT),
                mode,
                combined_max_results,
            },
            summary: SummarySettings {
                api_key,
                model: get_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
                endpoint: get_or("OPENAI_ENDPOINT", DEFAULT_OPENAI_ENDPOINT),
                language,
                mock,
            },
            keywords_path: PathBuf::from(get_or("KEYWORDS_PATH", DEFAULT_KEYWORDS_PATH)),
            dry_run: get("NOTIFY_DRY_RUN").is_some_and(|v| is_truthy(&v)),
        })
    }

    pub fn priority(&self) -> Vec<Topic> {
        self.topics.iter().map(|t| t.topic).collect()
    }

    pub fn topic(&self, topic: Topic) -> Option<&TopicConfig> {
        self.topics.iter().find(|t| t.topic == topic)
    }
}

fn non_blank(v: String) -> Option<String> {
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}
