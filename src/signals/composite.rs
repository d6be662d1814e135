//! Cross-indicator signal resolution.
//!
//! Runs after every per-indicator outcome of the run is available. A
//! composite is computed only when all of its dependencies were fetched
//! this run, none of them is in its seed run, and at least one of them
//! produced a new datapoint; missing inputs are never substituted.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::{CompositeSkip, MathError};
use crate::models::{
    DependencyValue, IndicatorId, IndicatorState, SignalDefinition, SignalKind, SignalResult,
};
use crate::signals::engine::{IndicatorOutcome, OutcomeStatus};
use crate::signals::math;

/// Composite results plus the signals that could not be computed.
#[derive(Debug, Default)]
pub struct CompositeResolution {
    pub results: Vec<SignalResult>,
    pub skipped: Vec<(String, CompositeSkip)>,
}

impl CompositeResolution {
    pub fn triggered(&self) -> impl Iterator<Item = &SignalResult> {
        self.results.iter().filter(|r| r.triggered)
    }
}

pub struct CompositeResolver;

impl CompositeResolver {
    pub fn resolve(
        definitions: &[SignalDefinition],
        outcomes: &BTreeMap<IndicatorId, IndicatorOutcome>,
    ) -> CompositeResolution {
        let mut resolution = CompositeResolution::default();

        for definition in definitions {
            match Self::resolve_one(definition, outcomes) {
                Ok(result) => {
                    info!(
                        signal = %definition.name,
                        kind = definition.kind.label(),
                        statistic = result.statistic,
                        triggered = result.triggered,
                        "Composite {} = {:.3}",
                        definition.name,
                        result.statistic
                    );
                    resolution.results.push(result);
                }
                Err(CompositeSkip::NoNewData) => {
                    debug!(signal = %definition.name, "No new data for composite {}", definition.name);
                }
                Err(CompositeSkip::Seeding(id)) => {
                    debug!(
                        signal = %definition.name,
                        indicator_id = id,
                        "Composite {} waits for {} to leave its seed run",
                        definition.name,
                        id
                    );
                }
                Err(reason) => {
                    warn!(
                        signal = %definition.name,
                        reason = %reason,
                        "Skipping composite {}: {}",
                        definition.name,
                        reason
                    );
                    resolution.skipped.push((definition.name.clone(), reason));
                }
            }
        }

        resolution
    }

    /// Evaluate one definition against this run's outcomes.
    pub fn resolve_one(
        definition: &SignalDefinition,
        outcomes: &BTreeMap<IndicatorId, IndicatorOutcome>,
    ) -> Result<SignalResult, CompositeSkip> {
        let dependency_ids = definition.kind.dependencies();

        let mut states: Vec<(IndicatorId, &IndicatorState)> =
            Vec::with_capacity(dependency_ids.len());
        for id in &dependency_ids {
            let outcome = outcomes
                .get(id)
                .filter(|o| o.is_available())
                .ok_or(CompositeSkip::MissingDependency(*id))?;
            let state = outcome
                .state
                .as_ref()
                .ok_or(CompositeSkip::MissingDependency(*id))?;
            states.push((*id, state));
        }

        if let Some(seeded) = dependency_ids
            .iter()
            .find(|id| matches!(outcomes.get(*id).map(|o| &o.status), Some(OutcomeStatus::Seeded)))
        {
            return Err(CompositeSkip::Seeding(*seeded));
        }

        let any_new = dependency_ids
            .iter()
            .filter_map(|id| outcomes.get(id))
            .any(IndicatorOutcome::has_new_data);
        if !any_new {
            return Err(CompositeSkip::NoNewData);
        }

        let mut dependencies = Vec::with_capacity(states.len());
        for (id, state) in &states {
            let latest = state
                .latest()
                .ok_or(CompositeSkip::MissingDependency(*id))?;
            let statistic = match definition.kind {
                SignalKind::Ratio { .. } => None,
                _ => {
                    let window: Vec<f64> = state.history.iter().map(|p| p.value).collect();
                    Some(math::abs_growth_diff(&window, definition.n_periods)?)
                }
            };
            dependencies.push(DependencyValue {
                indicator_id: *id,
                name: state.display_name(*id),
                value: latest.value,
                date: latest.date,
                statistic,
            });
        }

        let stats: Vec<f64> = dependencies.iter().filter_map(|d| d.statistic).collect();
        let statistic = match &definition.kind {
            SignalKind::Single { .. } => math::composite_avg(&stats)?,
            SignalKind::GrowthDiff { .. } => math::growth_diff_between(stats[0], stats[1]),
            SignalKind::Ratio { .. } => math::ratio(dependencies[0].value, dependencies[1].value)?,
            SignalKind::CompositeAvg { .. } => math::composite_avg(&stats)?,
            SignalKind::WeightedAvg { weights, .. } => math::weighted_avg(&stats, weights)?,
        };

        let date = dependencies
            .iter()
            .map(|d| d.date)
            .max()
            .ok_or(CompositeSkip::Math(MathError::EmptyInput))?;

        Ok(SignalResult {
            name: definition.name.clone(),
            kind: definition.kind.label(),
            indicator_id: None,
            statistic,
            threshold: definition.threshold,
            triggered: definition.threshold.is_crossed(statistic),
            value: statistic,
            unit: String::new(),
            date,
            dependencies,
        })
    }
}
