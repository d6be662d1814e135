//! Per-indicator reconciliation of fetched data against stored state.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{FetchError, MathError};
use crate::models::{
    DataPoint, IndicatorId, IndicatorSeries, IndicatorState, SignalResult, Threshold,
};
use crate::signals::math;

/// Resolved per-indicator settings (global defaults already applied).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorParams {
    pub threshold: f64,
    pub n_periods: usize,
}

/// What a run did with one indicator.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeStatus {
    /// First sighting: history stored, alerts suppressed
    Seeded,
    /// Latest fetched date equals `last_check_date`
    NoNewData,
    /// Latest fetched date is older than `last_check_date`; state kept
    Regressed { fetched: NaiveDate, stored: NaiveDate },
    /// One or more datapoints newer than `last_check_date`
    NewData { count: usize },
    /// Fetch succeeded with no datapoints
    Empty,
    /// Fetch failed after retries
    FetchFailed(String),
}

/// A new datapoint whose statistic could not be computed.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPoint {
    pub date: NaiveDate,
    pub reason: MathError,
}

/// Result of reconciling one indicator. Owns the (possibly updated) state
/// entry so each worker mutates only its own indicator.
#[derive(Debug, Clone)]
pub struct IndicatorOutcome {
    pub indicator_id: IndicatorId,
    pub status: OutcomeStatus,
    pub state: Option<IndicatorState>,
    /// One result per new datapoint with a computable statistic, oldest first
    pub results: Vec<SignalResult>,
    pub skipped: Vec<SkippedPoint>,
}

impl IndicatorOutcome {
    pub fn has_new_data(&self) -> bool {
        matches!(self.status, OutcomeStatus::NewData { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, OutcomeStatus::FetchFailed(_))
    }

    /// Fetched this run (successfully) and has stored history to read from.
    pub fn is_available(&self) -> bool {
        self.state.is_some()
            && !matches!(
                self.status,
                OutcomeStatus::FetchFailed(_) | OutcomeStatus::Empty
            )
    }

    pub fn triggered(&self) -> impl Iterator<Item = &SignalResult> {
        self.results.iter().filter(|r| r.triggered)
    }

    pub fn latest_result(&self) -> Option<&SignalResult> {
        self.results.last()
    }
}

pub struct SignalEngine;

impl SignalEngine {
    /// Compare a fetch against the stored entry and produce the next state.
    ///
    /// `history_cap` must be at least `params.n_periods + 1` for the
    /// statistic to be computable; smaller values are raised to that.
    pub fn reconcile(
        indicator_id: IndicatorId,
        fetched: Result<IndicatorSeries, FetchError>,
        prior: Option<IndicatorState>,
        params: IndicatorParams,
        history_cap: usize,
    ) -> IndicatorOutcome {
        let cap = history_cap.max(params.n_periods + 1);

        let series = match fetched {
            Ok(series) => series,
            Err(e) => {
                warn!(indicator_id, error = %e, "Failed to fetch indicator {}", indicator_id);
                return IndicatorOutcome {
                    indicator_id,
                    status: OutcomeStatus::FetchFailed(e.to_string()),
                    state: prior,
                    results: Vec::new(),
                    skipped: Vec::new(),
                };
            }
        };

        let Some(latest) = series.latest().copied() else {
            warn!(indicator_id, "No rows returned for {}", indicator_id);
            return IndicatorOutcome {
                indicator_id,
                status: OutcomeStatus::Empty,
                state: prior,
                results: Vec::new(),
                skipped: Vec::new(),
            };
        };

        let Some(mut state) = prior else {
            let seeded = IndicatorState::seed(&series, cap);
            info!(
                indicator_id,
                last_date = %latest.date,
                history_size = seeded.as_ref().map(|s| s.history.len()).unwrap_or(0),
                "Initialized state for indicator {}",
                indicator_id
            );
            return IndicatorOutcome {
                indicator_id,
                status: OutcomeStatus::Seeded,
                state: seeded,
                results: Vec::new(),
                skipped: Vec::new(),
            };
        };

        if latest.date < state.last_check_date {
            warn!(
                indicator_id,
                fetched = %latest.date,
                stored = %state.last_check_date,
                "Fetched data is older than stored state for {}, keeping state",
                indicator_id
            );
            return IndicatorOutcome {
                indicator_id,
                status: OutcomeStatus::Regressed {
                    fetched: latest.date,
                    stored: state.last_check_date,
                },
                state: Some(state),
                results: Vec::new(),
                skipped: Vec::new(),
            };
        }

        let new_points: Vec<DataPoint> = series.newer_than(state.last_check_date).to_vec();
        if new_points.is_empty() {
            debug!(indicator_id, "No new datapoints for {}", indicator_id);
            return IndicatorOutcome {
                indicator_id,
                status: OutcomeStatus::NoNewData,
                state: Some(state),
                results: Vec::new(),
                skipped: Vec::new(),
            };
        }

        info!(
            indicator_id,
            count = new_points.len(),
            "Found {} new datapoint(s) for {}",
            new_points.len(),
            indicator_id
        );

        if !series.metadata.name.is_empty() {
            state.metadata = series.metadata.clone();
        }

        let name = state.display_name(indicator_id);
        let mut results = Vec::new();
        let mut skipped = Vec::new();

        for point in &new_points {
            let mut window: Vec<f64> = state.history.iter().map(|p| p.value).collect();
            window.push(point.value);

            match math::abs_growth_diff(&window, params.n_periods) {
                Ok(statistic) => {
                    let threshold = Threshold::Scalar(params.threshold);
                    let triggered = threshold.is_crossed(statistic);
                    info!(
                        indicator_id,
                        value = point.value,
                        growth = statistic,
                        triggered,
                        "{}: new value {:.3} {} (growth: {:+.1}%)",
                        name,
                        point.value,
                        state.metadata.unit,
                        statistic
                    );
                    results.push(SignalResult {
                        name: name.clone(),
                        kind: "single",
                        indicator_id: Some(indicator_id),
                        statistic,
                        threshold,
                        triggered,
                        value: point.value,
                        unit: state.metadata.unit.clone(),
                        date: point.date,
                        dependencies: Vec::new(),
                    });
                }
                Err(reason) => {
                    warn!(
                        indicator_id,
                        date = %point.date,
                        error = %reason,
                        "Skipping growth computation for {}",
                        indicator_id
                    );
                    skipped.push(SkippedPoint {
                        date: point.date,
                        reason,
                    });
                }
            }

            state.push(*point, cap);
        }

        IndicatorOutcome {
            indicator_id,
            status: OutcomeStatus::NewData {
                count: new_points.len(),
            },
            state: Some(state),
            results,
            skipped,
        }
    }
}
