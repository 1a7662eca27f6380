//! arxiv-notifier binary entrypoint.
//! One invocation is one run; schedule it externally (cron, systemd timer).

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arxiv_notifier::{run_once, AppConfig, DEFAULT_LOG_FILTER};

/// Compact human logs by default, JSON lines with LOG_FORMAT=json.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::from_env().context("loading configuration")?;
    tracing::info!(
        topics = ?cfg.priority(),
        mode = ?cfg.feed.mode,
        dry_run = cfg.dry_run,
        "configuration loaded"
    );

    let run_date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let report = run_once(&cfg, &run_date).await?;
    tracing::debug!(?report, "done");
    Ok(())
}
