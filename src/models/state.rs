//! Persisted per-indicator state

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::{DataPoint, IndicatorId, IndicatorSeries, SeriesMetadata};

pub const STATE_VERSION: u32 = 1;

/// Last processed datapoint plus a bounded lookback window.
///
/// `history` is ascending by date, has no duplicate dates, and its last
/// element is the datapoint at `last_check_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorState {
    pub last_check_date: NaiveDate,
    #[serde(default)]
    pub metadata: SeriesMetadata,
    #[serde(default)]
    pub history: Vec<DataPoint>,
}

impl IndicatorState {
    /// Seed state from a first fetch: the most recent `cap` points.
    /// Returns `None` for an empty series.
    pub fn seed(series: &IndicatorSeries, cap: usize) -> Option<Self> {
        let latest = series.latest()?;
        let points = series.points();
        let start = points.len().saturating_sub(cap.max(1));

        Some(Self {
            last_check_date: latest.date,
            metadata: series.metadata.clone(),
            history: points[start..].to_vec(),
        })
    }

    pub fn latest(&self) -> Option<&DataPoint> {
        self.history.last()
    }

    /// Append a datapoint newer than `last_check_date`, evicting the oldest
    /// entries beyond `cap`. Older or equal dates are ignored and `false` is
    /// returned.
    pub fn push(&mut self, point: DataPoint, cap: usize) -> bool {
        if point.date <= self.last_check_date {
            return false;
        }

        self.history.push(point);
        self.last_check_date = point.date;

        let cap = cap.max(1);
        if self.history.len() > cap {
            let excess = self.history.len() - cap;
            self.history.drain(..excess);
        }
        true
    }

    pub fn display_name(&self, indicator_id: IndicatorId) -> String {
        if self.metadata.name.is_empty() {
            indicator_id.to_string()
        } else {
            self.metadata.name.clone()
        }
    }
}

/// Whole persisted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub indicators: BTreeMap<IndicatorId, IndicatorState>,
}

fn default_version() -> u32 {
    STATE_VERSION
}

impl GlobalState {
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            indicators: BTreeMap::new(),
        }
    }

    pub fn get(&self, indicator_id: IndicatorId) -> Option<&IndicatorState> {
        self.indicators.get(&indicator_id)
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

impl Default for GlobalState {
    fn default() -> Self {
        Self::new()
    }
}
