//! TrendForce monitor
//!
//! One-shot run: fetch every configured indicator, reconcile against the
//! state file, evaluate signals, send alerts, persist state. Scheduling is
//! left to cron or a systemd timer.

use std::sync::Arc;

use clap::Parser;
use trendwatch::config::{Cli, MonitorConfig, Secrets};
use trendwatch::core::runtime::{RuntimeConfig, SignalRuntime};
use trendwatch::db::JsonFileStateStore;
use trendwatch::logging;
use trendwatch::notify::{Notifier, PushoverNotifier, RecordingNotifier};
use trendwatch::services::TrendForceClient;
use trendwatch::summary::GeminiSummarizer;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();
    let cli = Cli::parse();

    let env = trendwatch::config::get_environment();
    info!(environment = %env, "Starting TrendForce monitor");

    let mut config = MonitorConfig::load(&cli.config).map_err(|e| {
        error!(error = %e, "Failed to load config");
        e
    })?;
    config.apply_cli(&cli)?;

    let secrets = Secrets::load(&config.env_file)?;
    let notifier: Arc<dyn Notifier> = match secrets.pushover() {
        Ok((user, token)) => Arc::new(PushoverNotifier::new(user, token)),
        Err(e) if cli.dry_run => {
            warn!(error = %e, "Pushover credentials missing, continuing in dry-run mode");
            Arc::new(RecordingNotifier::new())
        }
        Err(e) => {
            error!(error = %e, path = %config.env_file.display(), "Missing Pushover credentials");
            return Err(e.into());
        }
    };

    let source = Arc::new(TrendForceClient::new(
        config.base_url.clone(),
        config.fetch_options(),
    )?);
    let store = Arc::new(JsonFileStateStore::new(config.state_file.clone()));
    info!(state_file = %config.state_file.display(), "Using state file");

    let mut runtime = SignalRuntime::new(
        RuntimeConfig::from_config(&config, cli.dry_run)?,
        source,
        store,
        notifier,
    );

    if config.ai_summary {
        match secrets.google_api_key.clone() {
            Some(key) => runtime = runtime.with_summarizer(GeminiSummarizer::new(key)),
            None => warn!("AI summary requested but no Google API key found"),
        }
    }

    let report = runtime.run_once().await?;

    if !report.is_success() {
        let failed: Vec<String> = report.failures.iter().map(|id| id.to_string()).collect();
        return Err(format!("failed to fetch indicators: {}", failed.join(", ")).into());
    }

    Ok(())
}
