use scout_engine::{FirecrawlSource, LineFileSeenStore, Orchestrator, SlackWebhookSink};
use scout_logging::{scout_info, scout_warn};

use crate::{AppConfig, ConfigError};

/// Assembles the default collaborators described by `config`.
pub fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator, ConfigError> {
    let source = FirecrawlSource::new(config.source_settings()?);
    let sink = SlackWebhookSink::new(config.slack_webhook_url.clone(), config.notify_settings());
    if !sink.is_configured() {
        scout_warn!("SLACK_WEBHOOK_URL not set; winners will be selected but not delivered");
    }
    let store = LineFileSeenStore::new(config.seen_store.clone());
    scout_info!(
        "Scout ready: window {}h, store {:?}, policy {:?}",
        config.window_hours,
        config.seen_store,
        config.record_policy
    );

    Ok(Orchestrator::new(
        Box::new(source),
        Box::new(sink),
        Box::new(store),
        config.cycle_settings(),
    ))
}

/// Single-threaded runtime: cycles run one at a time on the calling thread.
pub fn build_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
