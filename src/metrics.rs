// src/metrics.rs
//! Counter names and one-time registration. Without an installed recorder every
//! `counter!` call is a no-op.

use metrics::describe_counter;
use once_cell::sync::OnceCell;

pub const FEED_FETCH_ATTEMPTS: &str = "feed_fetch_attempts_total";
pub const FEED_FETCH_FAILURES: &str = "feed_fetch_failures_total";
pub const FEED_ENTRIES: &str = "feed_entries_total";
pub const ENTRIES_SKIPPED: &str = "entries_skipped_total";
pub const ENTRIES_MATCHED: &str = "entries_matched_total";
pub const SUMMARIES_FAILED: &str = "summaries_failed_total";
pub const NOTIFICATIONS_SENT: &str = "notifications_sent_total";
pub const NOTIFICATIONS_FAILED: &str = "notifications_failed_total";

/// One-time metrics registration (so series show up once a recorder is installed).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(FEED_FETCH_ATTEMPTS, "Feed GET attempts, including retries.");
        describe_counter!(
            FEED_FETCH_FAILURES,
            "Feed queries that failed after exhausting retries."
        );
        describe_counter!(FEED_ENTRIES, "Entries decoded from feed pages.");
        describe_counter!(ENTRIES_SKIPPED, "Entries skipped as malformed.");
        describe_counter!(
            ENTRIES_MATCHED,
            "Entries that passed routing and keyword filter."
        );
        describe_counter!(SUMMARIES_FAILED, "Summaries replaced by the placeholder.");
        describe_counter!(NOTIFICATIONS_SENT, "Webhook deliveries that succeeded.");
        describe_counter!(NOTIFICATIONS_FAILED, "Webhook deliveries that failed.");
    });
}
