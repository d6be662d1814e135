//! Run orchestration: fan-out fetch, composite barrier, dispatch, commit.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::config::MonitorConfig;
use crate::db::state_store::{load_or_default, StateStore};
use crate::error::{ConfigError, StateError};
use crate::models::{IndicatorId, SignalDefinition, SignalResult};
use crate::notify::{format_signal_line, format_update_line, AlertDispatcher, DispatchReport, Notifier};
use crate::services::data_source::DataSource;
use crate::signals::composite::CompositeResolver;
use crate::signals::engine::{IndicatorOutcome, IndicatorParams, OutcomeStatus, SignalEngine};
use crate::summary::GeminiSummarizer;

pub const SUMMARY_TITLE: &str = "TrendForce Daily Summary";

/// Configuration for one monitoring run
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub indicator_ids: Vec<IndicatorId>,
    pub params: BTreeMap<IndicatorId, IndicatorParams>,
    pub default_params: IndicatorParams,
    pub signals: Vec<SignalDefinition>,
    pub concurrency: usize,
    pub history_cap: usize,
    pub dry_run: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            indicator_ids: Vec::new(),
            params: BTreeMap::new(),
            default_params: IndicatorParams {
                threshold: 10.0,
                n_periods: 3,
            },
            signals: Vec::new(),
            concurrency: 4,
            history_cap: 4,
            dry_run: false,
        }
    }
}

impl RuntimeConfig {
    pub fn from_config(config: &MonitorConfig, dry_run: bool) -> Result<Self, ConfigError> {
        Ok(Self {
            indicator_ids: config.indicator_ids.clone(),
            params: config
                .indicator_ids
                .iter()
                .map(|id| (*id, config.indicator_params(*id)))
                .collect(),
            default_params: IndicatorParams {
                threshold: config.default_threshold,
                n_periods: config.default_n_periods,
            },
            signals: config.signal_definitions()?,
            concurrency: config.concurrency,
            history_cap: config.history_cap(),
            dry_run,
        })
    }

    fn params_for(&self, indicator_id: IndicatorId) -> IndicatorParams {
        self.params
            .get(&indicator_id)
            .copied()
            .unwrap_or(self.default_params)
    }
}

/// What one run did
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    pub new_datapoints: usize,
    pub seeded: Vec<IndicatorId>,
    pub failures: Vec<IndicatorId>,
    /// Per-indicator and composite results, indicators first
    pub results: Vec<SignalResult>,
    pub composites_skipped: Vec<String>,
    pub alerts: DispatchReport,
    pub summary_sent: bool,
}

impl RunReport {
    pub fn triggered(&self) -> impl Iterator<Item = &SignalResult> {
        self.results.iter().filter(|r| r.triggered)
    }

    /// No indicator failed to fetch.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct SignalRuntime {
    config: RuntimeConfig,
    source: Arc<dyn DataSource>,
    store: Arc<dyn StateStore>,
    dispatcher: AlertDispatcher,
    summarizer: Option<GeminiSummarizer>,
}

impl SignalRuntime {
    pub fn new(
        config: RuntimeConfig,
        source: Arc<dyn DataSource>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let dispatcher = AlertDispatcher::new(notifier).with_dry_run(config.dry_run);
        Self {
            config,
            source,
            store,
            dispatcher,
            summarizer: None,
        }
    }

    /// Set custom concurrency (minimum 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency.max(1);
        self
    }

    pub fn with_summarizer(mut self, summarizer: GeminiSummarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Execute one run. Only a failure to load or persist state is an error;
    /// everything per-indicator or per-signal is reported in the `RunReport`.
    pub async fn run_once(&self) -> Result<RunReport, StateError> {
        let mut state = load_or_default(self.store.as_ref())?;
        let mut report = RunReport::default();

        let mut seen = BTreeSet::new();
        let ids: Vec<IndicatorId> = self
            .config
            .indicator_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        info!(
            indicators = ids.len(),
            concurrency = self.config.concurrency,
            "Monitoring {} indicators with {} workers",
            ids.len(),
            self.config.concurrency
        );
        if state.is_empty() {
            info!("First run detected - will initialize state without sending alerts");
        }
        if self.config.dry_run {
            info!("DRY RUN MODE - notifications will not be sent");
        }

        // Each task owns its indicator's entry; nothing is shared until the join.
        let jobs: Vec<_> = ids
            .iter()
            .map(|id| (*id, state.indicators.remove(id), self.config.params_for(*id)))
            .collect();
        let history_cap = self.config.history_cap;

        let outcomes: Vec<IndicatorOutcome> = stream::iter(jobs)
            .map(|(indicator_id, prior, params)| {
                let source = self.source.clone();
                async move {
                    let fetched = source.fetch(indicator_id).await;
                    SignalEngine::reconcile(indicator_id, fetched, prior, params, history_cap)
                }
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let outcomes: BTreeMap<IndicatorId, IndicatorOutcome> = outcomes
            .into_iter()
            .map(|outcome| (outcome.indicator_id, outcome))
            .collect();

        for (id, outcome) in &outcomes {
            match &outcome.status {
                OutcomeStatus::Seeded => report.seeded.push(*id),
                OutcomeStatus::NewData { count } => report.new_datapoints += count,
                OutcomeStatus::FetchFailed(_) => report.failures.push(*id),
                _ => {}
            }
            if let Some(entry) = &outcome.state {
                state.indicators.insert(*id, entry.clone());
            }
            report.results.extend(outcome.results.iter().cloned());
        }

        let composites = CompositeResolver::resolve(&self.config.signals, &outcomes);
        report.composites_skipped = composites
            .skipped
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        report.results.extend(composites.results.iter().cloned());

        report.alerts = self.dispatcher.dispatch(report.results.iter()).await;

        if let Some(summarizer) = &self.summarizer {
            report.summary_sent = self.send_summary(summarizer, &outcomes, &report).await;
        }

        if let Err(e) = self.store.save(&state) {
            error!(error = %e, "Failed to save state");
            return Err(e);
        }

        info!(
            new_datapoints = report.new_datapoints,
            alerts_sent = report.alerts.delivered,
            alerts_failed = report.alerts.failed.len(),
            failures = report.failures.len(),
            composites_skipped = report.composites_skipped.len(),
            "Summary: {} new datapoints, {} alerts sent, {} failures",
            report.new_datapoints,
            report.alerts.delivered,
            report.failures.len()
        );
        if !report.failures.is_empty() {
            let failed: Vec<String> = report.failures.iter().map(|id| id.to_string()).collect();
            warn!("Failed indicators: {}", failed.join(", "));
        }

        Ok(report)
    }

    async fn send_summary(
        &self,
        summarizer: &GeminiSummarizer,
        outcomes: &BTreeMap<IndicatorId, IndicatorOutcome>,
        report: &RunReport,
    ) -> bool {
        if self.dispatcher.is_dry_run() {
            info!("[DRY RUN] Skipping AI summary");
            return false;
        }

        let updated: Vec<String> = outcomes
            .values()
            .filter_map(IndicatorOutcome::latest_result)
            .map(format_update_line)
            .collect();
        let signals: Vec<String> = report.triggered().map(format_signal_line).collect();

        match summarizer.generate(&updated, &signals).await {
            Some(summary) => self.dispatcher.send_message(SUMMARY_TITLE, &summary).await,
            None => false,
        }
    }
}
