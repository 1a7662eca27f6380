// src/config/topics.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Page-size bound used when a topic has no explicit `max_results`.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

pub const ENV_TOPICS_CONFIG_PATH: &str = "TOPICS_CONFIG_PATH";
pub const DEFAULT_TOPICS_CONFIG_PATH: &str = "config/topics.toml";

/// Supported arXiv categories. Adding one here forces every `match` to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "hep-th")]
    HepTh,
    #[serde(rename = "hep-ph")]
    HepPh,
    #[serde(rename = "quant-ph")]
    QuantPh,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::HepTh, Topic::HepPh, Topic::QuantPh];

    /// arXiv category term, also used as the tag in notification titles.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::HepTh => "hep-th",
            Topic::HepPh => "hep-ph",
            Topic::QuantPh => "quant-ph",
        }
    }

    /// Env var holding this topic's webhook URL.
    pub fn webhook_env(self) -> &'static str {
        match self {
            Topic::HepTh => "WEBHOOK_HEP_TH",
            Topic::HepPh => "WEBHOOK_HEP_PH",
            Topic::QuantPh => "WEBHOOK_QUANT_PH",
        }
    }

    /// Embed accent color (24-bit RGB).
    pub fn default_color(self) -> u32 {
        match self {
            Topic::HepTh => 0x3498db,
            Topic::HepPh => 0xe67e22,
            Topic::QuantPh => 0x2ecc71,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let t = s.trim();
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str().eq_ignore_ascii_case(t))
            .ok_or_else(|| anyhow!("unsupported topic: {t:?}"))
    }
}

/// A topic bound to its delivery destination and feed settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    pub topic: Topic,
    pub webhook: String,
    pub color: u32,
    pub max_results: u32,
}

impl TopicConfig {
    pub fn new(topic: Topic, webhook: impl Into<String>) -> Self {
        Self {
            topic,
            webhook: webhook.into(),
            color: topic.default_color(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn apply(&mut self, ov: &TopicOverride) {
        if let Some(c) = ov.color {
            self.color = c & 0x00ff_ffff;
        }
        if let Some(n) = ov.max_results {
            self.max_results = n.max(1);
        }
    }
}

/// Optional per-topic tuning read from TOML:
///
/// ```toml
/// [hep-th]
/// color = 0x3498db
/// max_results = 25
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopicOverride {
    pub color: Option<u32>,
    pub max_results: Option<u32>,
}

/// Parse a comma separated, priority-ordered topic list. Duplicates keep their first position.
pub fn parse_topic_list(s: &str) -> Result<Vec<Topic>> {
    let mut out: Vec<Topic> = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let topic: Topic = part.parse()?;
        if !out.contains(&topic) {
            out.push(topic);
        }
    }
    if out.is_empty() {
        bail!("topic list is empty");
    }
    Ok(out)
}

pub fn parse_overrides(s: &str) -> Result<BTreeMap<Topic, TopicOverride>> {
    let raw: BTreeMap<String, TopicOverride> =
        toml::from_str(s).context("parsing topic overrides")?;
    raw.into_iter()
        .map(|(k, v)| Ok((k.parse::<Topic>()?, v)))
        .collect()
}

pub fn load_overrides_from(path: &Path) -> Result<BTreeMap<Topic, TopicOverride>> {
    let shown = path.display();
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading topic overrides from {shown}"))?;
    parse_overrides(&content)
}

/// Resolve overrides:
/// 1) explicit path (must exist)
/// 2) config/topics.toml when present
/// 3) none
pub fn load_overrides(explicit: Option<&str>) -> Result<BTreeMap<Topic, TopicOverride>> {
    if let Some(p) = explicit.map(str::trim).filter(|p| !p.is_empty()) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            let shown = pb.display();
            bail!("{ENV_TOPICS_CONFIG_PATH} not found: {shown}");
        }
        return load_overrides_from(&pb);
    }
    let fallback = PathBuf::from(DEFAULT_TOPICS_CONFIG_PATH);
    if fallback.exists() {
        return load_overrides_from(&fallback);
    }
    Ok(BTreeMap::new())
}
