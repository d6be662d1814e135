//! Alert dispatch for triggered signal results

use std::sync::Arc;

use tracing::{error, info};

use super::format::format_alert;
use super::notifier::Notifier;
use crate::models::SignalResult;

/// Per-run delivery bookkeeping
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchReport {
    pub delivered: usize,
    /// Alerts rendered but not sent because of dry-run mode
    pub suppressed: usize,
    /// Names of signals whose delivery failed
    pub failed: Vec<String>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    dry_run: bool,
}

impl AlertDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Send one notification per triggered result. Non-triggered results are
    /// ignored; one failed delivery never stops the rest.
    pub async fn dispatch<'a, I>(&self, results: I) -> DispatchReport
    where
        I: IntoIterator<Item = &'a SignalResult>,
    {
        let mut report = DispatchReport::default();

        for result in results.into_iter().filter(|r| r.triggered) {
            let (title, body) = format_alert(result);

            if self.dry_run {
                info!(signal = %result.name, "[DRY RUN] Would send alert: {}", title);
                report.suppressed += 1;
                continue;
            }

            match self.notifier.send(&title, &body).await {
                Ok(()) => {
                    info!(signal = %result.name, "Alert sent for {}", result.name);
                    report.delivered += 1;
                }
                Err(e) => {
                    error!(signal = %result.name, error = %e, "Failed to send alert for {}", result.name);
                    report.failed.push(result.name.clone());
                }
            }
        }

        report
    }

    /// Send a free-form message (the run digest). Returns whether it was
    /// delivered; dry-run never delivers.
    pub async fn send_message(&self, title: &str, body: &str) -> bool {
        if self.dry_run {
            info!("[DRY RUN] Would send message: {}", title);
            return false;
        }
        match self.notifier.send(title, body).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to send message '{}'", title);
                false
            }
        }
    }
}
