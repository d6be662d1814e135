//! Notification transports

use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::DeliveryError;

pub const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt one delivery. `Ok` means the transport confirmed receipt.
    async fn send(&self, title: &str, body: &str) -> Result<(), DeliveryError>;
}

#[derive(Debug, Deserialize)]
struct PushoverResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    errors: Vec<String>,
}

pub struct PushoverNotifier {
    user_key: String,
    api_token: String,
    endpoint: String,
    client: reqwest::Client,
}

impl PushoverNotifier {
    pub fn new(user_key: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            api_token: api_token.into(),
            endpoint: PUSHOVER_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn send(&self, title: &str, body: &str) -> Result<(), DeliveryError> {
        let form = [
            ("token", self.api_token.as_str()),
            ("user", self.user_key.as_str()),
            ("message", body),
            ("title", title),
        ];

        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        let status = response.status();
        let parsed: PushoverResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Rejected(format!("HTTP {}: {}", status, e)))?;

        if parsed.status == 1 {
            Ok(())
        } else if parsed.errors.is_empty() {
            Err(DeliveryError::Rejected(format!("HTTP {}", status)))
        } else {
            Err(DeliveryError::Rejected(parsed.errors.join("; ")))
        }
    }
}

/// Records every message; deliveries whose title contains one of the
/// configured fragments fail.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail_on: Vec<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(fragments: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_on: fragments.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Messages that were delivered, in order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, title: &str, body: &str) -> Result<(), DeliveryError> {
        if self.fail_on.iter().any(|f| title.contains(f.as_str())) {
            return Err(DeliveryError::Rejected(format!("refused '{}'", title)));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((title.to_string(), body.to_string()));
        }
        Ok(())
    }
}
