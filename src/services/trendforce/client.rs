//! HTTP client for the TrendForce datatrack API

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::{debug, warn};

use super::payload::parse_payload;
use crate::error::FetchError;
use crate::models::{IndicatorId, IndicatorSeries};
use crate::services::data_source::DataSource;

pub const DEFAULT_BASE_URL: &str = "https://datatrack-finwhale.trendforce.com:8000/api/v1";

/// Request timeout, retry budget and TLS behaviour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub retries: usize,
    /// First retry waits this long, each further retry doubles it
    pub backoff_base: Duration,
    /// Skip certificate verification
    pub insecure: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 3,
            backoff_base: Duration::from_millis(1500),
            insecure: false,
        }
    }
}

pub struct TrendForceClient {
    base_url: String,
    client: reqwest::Client,
    options: FetchOptions,
}

impl TrendForceClient {
    pub fn new(base_url: impl Into<String>, options: FetchOptions) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure)
            .build()?;

        Ok(Self::with_client(base_url, client, options))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        client: reqwest::Client,
        options: FetchOptions,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            options,
        }
    }

    pub fn column_url(&self) -> String {
        format!("{}/data/column", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_once(&self, indicator_id: IndicatorId) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(self.column_url())
            .query(&[("fields", indicator_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                indicator_id,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Payload {
            indicator_id,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl DataSource for TrendForceClient {
    async fn fetch(&self, indicator_id: IndicatorId) -> Result<IndicatorSeries, FetchError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.options.backoff_base)
            .with_factor(2.0)
            .with_max_times(self.options.retries);

        let payload = (|| self.fetch_once(indicator_id))
            .retry(backoff)
            .when(FetchError::is_retryable)
            .notify(|err: &FetchError, delay: Duration| {
                warn!(
                    indicator_id,
                    error = %err,
                    delay_secs = delay.as_secs_f64(),
                    "Retryable error for {} (sleep {:.1}s)",
                    indicator_id,
                    delay.as_secs_f64()
                );
            })
            .await?;

        let series = parse_payload(indicator_id, &payload)?;
        debug!(
            indicator_id,
            points = series.len(),
            "Fetched {} datapoints for {}",
            series.len(),
            indicator_id
        );
        Ok(series)
    }
}
