//! Gemini `generateContent` client with per-model quota fallback

use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::build_prompt;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Tried in order; the next model is used only when the previous one is out
/// of quota.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-flash-latest",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-2.5-flash",
];

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiSummarizer {
    api_key: String,
    base_url: String,
    models: Vec<String>,
    client: reqwest::Client,
}

impl GeminiSummarizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_BASE_URL.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Generate the digest. `None` when there is nothing to summarise, every
    /// model is out of quota, or any other error occurs.
    pub async fn generate(
        &self,
        updated_indicators: &[String],
        triggered_signals: &[String],
    ) -> Option<String> {
        if updated_indicators.is_empty() && triggered_signals.is_empty() {
            return None;
        }

        let prompt = build_prompt(updated_indicators, triggered_signals);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        for model in &self.models {
            let url = format!(
                "{}/models/{}:generateContent",
                self.base_url.trim_end_matches('/'),
                model
            );
            let response = match self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    error!(model = %model, error = %e, "Failed to generate AI summary with {}", model);
                    return None;
                }
            };

            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if !status.is_success() {
                if is_quota_error(status.as_u16(), &text) {
                    warn!(model = %model, "Model {} quota exceeded, trying next model", model);
                    continue;
                }
                error!(model = %model, status = status.as_u16(), "Failed to generate AI summary with {}", model);
                return None;
            }

            return match extract_text(&text) {
                Some(summary) => {
                    info!(model = %model, "AI summary generated using model: {}", model);
                    Some(summary)
                }
                None => {
                    error!(model = %model, "AI summary response had no text");
                    None
                }
            };
        }

        error!("All models exhausted due to quota limits");
        None
    }
}

fn is_quota_error(status: u16, body: &str) -> bool {
    status == 429 || body.contains("RESOURCE_EXHAUSTED") || body.to_lowercase().contains("quota")
}

fn extract_text(body: &str) -> Option<String> {
    let parsed: GenerateResponse = serde_json::from_str(body).ok()?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
