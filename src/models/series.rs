//! Fetched indicator series and their datapoints

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Remote indicator key as used by the data API.
pub type IndicatorId = u32;

/// Single (date, value) observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl DataPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Descriptive fields returned alongside the datapoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub freq: String,
}

/// Chronological series for one indicator, unique dates.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_id: IndicatorId,
    pub metadata: SeriesMetadata,
    points: Vec<DataPoint>,
}

impl IndicatorSeries {
    /// Build a series, sorting by date and keeping the last value seen for a
    /// duplicated date.
    pub fn new(indicator_id: IndicatorId, mut points: Vec<DataPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<DataPoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self {
            indicator_id,
            metadata: SeriesMetadata::default(),
            points: deduped,
        }
    }

    pub fn with_metadata(mut self, metadata: SeriesMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Points strictly newer than `date`, oldest first.
    pub fn newer_than(&self, date: NaiveDate) -> &[DataPoint] {
        let start = self.points.partition_point(|p| p.date <= date);
        &self.points[start..]
    }

    /// Display name, falling back to the numeric id.
    pub fn display_name(&self) -> String {
        if self.metadata.name.is_empty() {
            self.indicator_id.to_string()
        } else {
            self.metadata.name.clone()
        }
    }
}
