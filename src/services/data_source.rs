//! Data source interface for indicator series.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{IndicatorId, IndicatorSeries};

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the full published series for an indicator. Retries, timeouts
    /// and backoff are the implementation's concern; an `Err` here is final
    /// for this run.
    async fn fetch(&self, indicator_id: IndicatorId) -> Result<IndicatorSeries, FetchError>;
}

/// Serves canned series from memory. Ids without an entry fail.
#[derive(Default, Clone)]
pub struct StaticDataSource {
    series: HashMap<IndicatorId, IndicatorSeries>,
}

impl StaticDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: IndicatorSeries) -> Self {
        self.series.insert(series.indicator_id, series);
        self
    }

    pub fn insert(&mut self, series: IndicatorSeries) {
        self.series.insert(series.indicator_id, series);
    }

    pub fn remove(&mut self, indicator_id: IndicatorId) {
        self.series.remove(&indicator_id);
    }
}

#[async_trait]
impl DataSource for StaticDataSource {
    async fn fetch(&self, indicator_id: IndicatorId) -> Result<IndicatorSeries, FetchError> {
        self.series
            .get(&indicator_id)
            .cloned()
            .ok_or_else(|| FetchError::Other(format!("no data for indicator {}", indicator_id)))
    }
}
