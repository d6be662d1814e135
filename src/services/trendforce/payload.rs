//! Column endpoint payload parsing
//!
//! Response shape: `{ "<indicator name>": { "indicator_id": 6105, "unit": "USD",
//! "freq": "D", "data": { "2024-01-31": 1.234, ... } } }`

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;
use crate::models::{DataPoint, IndicatorId, IndicatorSeries, SeriesMetadata};

#[derive(Debug, Deserialize)]
struct ColumnSeries {
    #[serde(default)]
    data: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    freq: Option<String>,
}

/// Parse a column payload into a chronological series. Entries with an
/// unparsable date or a non-numeric value are dropped.
pub fn parse_payload(
    indicator_id: IndicatorId,
    payload: &Value,
) -> Result<IndicatorSeries, FetchError> {
    let object = payload.as_object().ok_or_else(|| FetchError::Payload {
        indicator_id,
        reason: "expected a JSON object".to_string(),
    })?;

    let mut points = Vec::new();
    let mut metadata = SeriesMetadata::default();

    for (name, raw) in object {
        let Ok(series) = serde_json::from_value::<ColumnSeries>(raw.clone()) else {
            debug!(indicator_id, key = %name, "Ignoring non-series payload entry");
            continue;
        };
        let Some(data) = series.data else {
            continue;
        };

        metadata = SeriesMetadata {
            name: name.clone(),
            unit: series.unit.unwrap_or_default(),
            freq: series.freq.unwrap_or_default(),
        };

        for (date, value) in data {
            match (parse_date(&date), parse_value(&value)) {
                (Some(date), Some(value)) => points.push(DataPoint::new(date, value)),
                _ => debug!(indicator_id, date = %date, "Dropping unparsable datapoint"),
            }
        }
    }

    Ok(IndicatorSeries::new(indicator_id, points).with_metadata(metadata))
}

/// Dates arrive as `YYYY-MM-DD`, sometimes with a time suffix.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
