//! Signal definitions and per-run results

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::IndicatorId;

/// Alert threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    /// Triggered when `|statistic| > limit`
    Scalar(f64),
    /// Triggered when the statistic leaves `[min, max]`
    Band { min: f64, max: f64 },
}

impl Threshold {
    pub fn is_crossed(&self, statistic: f64) -> bool {
        match *self {
            Threshold::Scalar(limit) => statistic.abs() > limit,
            Threshold::Band { min, max } => statistic < min || statistic > max,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Scalar(limit) => write!(f, "{:.1}%", limit),
            Threshold::Band { min, max } => write!(f, "[{:.3}, {:.3}]", min, max),
        }
    }
}

/// Closed set of signal types
#[derive(Debug, Clone, PartialEq)]
pub enum SignalKind {
    Single {
        indicator_id: IndicatorId,
    },
    /// `diff(a) - diff(b)` in percentage points
    GrowthDiff {
        a: IndicatorId,
        b: IndicatorId,
    },
    /// `latest(numerator) / latest(denominator)`
    Ratio {
        numerator: IndicatorId,
        denominator: IndicatorId,
    },
    CompositeAvg {
        indicators: Vec<IndicatorId>,
    },
    WeightedAvg {
        indicators: Vec<IndicatorId>,
        weights: Vec<f64>,
    },
}

impl SignalKind {
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::Single { .. } => "single",
            SignalKind::GrowthDiff { .. } => "growth_diff",
            SignalKind::Ratio { .. } => "ratio",
            SignalKind::CompositeAvg { .. } => "composite_avg",
            SignalKind::WeightedAvg { .. } => "weighted_avg",
        }
    }

    /// Indicator ids the signal reads, in definition order.
    pub fn dependencies(&self) -> Vec<IndicatorId> {
        match self {
            SignalKind::Single { indicator_id } => vec![*indicator_id],
            SignalKind::GrowthDiff { a, b } => vec![*a, *b],
            SignalKind::Ratio {
                numerator,
                denominator,
            } => vec![*numerator, *denominator],
            SignalKind::CompositeAvg { indicators } => indicators.clone(),
            SignalKind::WeightedAvg { indicators, .. } => indicators.clone(),
        }
    }

    pub fn is_composite(&self) -> bool {
        !matches!(self, SignalKind::Single { .. })
    }
}

/// Immutable signal definition built from configuration at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDefinition {
    pub name: String,
    pub kind: SignalKind,
    pub threshold: Threshold,
    pub n_periods: usize,
}

impl SignalDefinition {
    pub fn single(indicator_id: IndicatorId, threshold: f64, n_periods: usize) -> Self {
        Self {
            name: indicator_id.to_string(),
            kind: SignalKind::Single { indicator_id },
            threshold: Threshold::Scalar(threshold),
            n_periods,
        }
    }
}

/// Dependency value used to compute a composite, kept for message rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyValue {
    pub indicator_id: IndicatorId,
    pub name: String,
    pub value: f64,
    pub date: NaiveDate,
    /// Growth-rate difference of this dependency; `None` for ratio inputs.
    pub statistic: Option<f64>,
}

/// Outcome of evaluating one signal in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalResult {
    pub name: String,
    pub kind: &'static str,
    pub indicator_id: Option<IndicatorId>,
    /// Percentage points, or a plain quotient for ratio signals
    pub statistic: f64,
    pub threshold: Threshold,
    pub triggered: bool,
    pub value: f64,
    pub unit: String,
    pub date: NaiveDate,
    pub dependencies: Vec<DependencyValue>,
}

impl SignalResult {
    pub fn is_ratio(&self) -> bool {
        self.kind == "ratio"
    }
}
