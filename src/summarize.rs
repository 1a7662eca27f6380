// src/summarize.rs
//! Summarization boundary: provider abstraction + failure containment.
//! A failed summary never aborts a run; the caller gets a localized placeholder.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Language, SummarySettings};
use crate::metrics::SUMMARIES_FAILED;
use crate::retry::RetryPolicy;

pub const SUMMARY_TIMEOUT: Duration = Duration::from_secs(30);

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Low-level provider: one remote text-in/text-out call.
pub trait SummaryProvider: Send + Sync {
    fn complete<'a>(
        &'a self,
        instruction: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<String>>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// OpenAI-compatible Chat Completions provider.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(settings: &SummarySettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("arxiv-notifier/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(SUMMARY_TIMEOUT)
            .build()
            .context("building summarizer http client")?;
        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

impl SummaryProvider for OpenAiProvider {
    fn complete<'a>(
        &'a self,
        instruction: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: instruction,
                    },
                    Msg {
                        role: "user",
                        content: text,
                    },
                ],
            };

            let resp = self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
                .context("summarizer request")?
                .error_for_status()
                .context("summarizer non-2xx")?;

            let body: Resp = resp.json().await.context("summarizer response body")?;
            body.choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| anyhow!("summarizer returned no choices"))
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Deterministic provider for local runs (`SUMMARY_TEST_MODE=mock`).
#[derive(Debug, Clone)]
pub struct MockProvider {
    pub fixed: String,
}

impl SummaryProvider for MockProvider {
    fn complete<'a>(
        &'a self,
        _instruction: &'a str,
        _text: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        let out = self.fixed.clone();
        Box::pin(async move { Ok(out) })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub fn build_provider(settings: &SummarySettings) -> Result<Arc<dyn SummaryProvider>> {
    if settings.mock {
        return Ok(Arc::new(MockProvider {
            fixed: "Summary (mock)".to_string(),
        }));
    }
    Ok(Arc::new(OpenAiProvider::new(settings)?))
}

/// Wraps a provider so every call yields displayable text.
pub struct Summarizer {
    provider: Arc<dyn SummaryProvider>,
    language: Language,
    retry: RetryPolicy,
}

impl Summarizer {
    /// Exactly one provider call per abstract.
    pub fn new(provider: Arc<dyn SummaryProvider>, language: Language) -> Self {
        Self {
            provider,
            language,
            retry: RetryPolicy::once(),
        }
    }

    pub fn placeholder(&self) -> &'static str {
        self.language.summary_placeholder()
    }

    pub async fn summarize(&self, abstract_text: &str) -> String {
        let instruction = self.language.instruction();
        let res = self
            .retry
            .run(
                "summarize",
                |_| async move {
                    let out = self.provider.complete(instruction, abstract_text).await?;
                    let out = out.trim();
                    if out.is_empty() {
                        bail!("empty summary");
                    }
                    Ok::<String, anyhow::Error>(out.to_string())
                },
                |_: &anyhow::Error| true,
            )
            .await;

        match res {
            Ok(s) => {
                debug!(
                    provider = self.provider.name(),
                    chars = s.chars().count(),
                    "summary ok"
                );
                s
            }
            Err(e) => {
                counter!(SUMMARIES_FAILED).increment(1);
                warn!(
                    provider = self.provider.name(),
                    error = ?e,
                    "summarization failed, using placeholder"
                );
                self.placeholder().to_string()
            }
        }
    }
}
