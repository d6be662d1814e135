//! Monitor configuration: YAML document, CLI overrides and `.env` secrets.

pub mod cli;
pub mod secrets;

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::models::{IndicatorId, SignalDefinition, SignalKind, Threshold};
use crate::services::trendforce::{FetchOptions, DEFAULT_BASE_URL};
use crate::signals::engine::IndicatorParams;

pub use cli::Cli;
pub use secrets::{resolve_google_api_key, Secrets, GOOGLE_KEY_ALIASES};

/// Deployment environment name, from `APP_ENV` (default `sandbox`).
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Per-indicator overrides of the global defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IndicatorOverride {
    pub threshold: Option<f64>,
    pub n_periods: Option<usize>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeType {
    GrowthDiff,
    Ratio,
    CompositeAvg,
    WeightedAvg,
}

/// Composite signal as written in the config document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignalConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CompositeType,
    pub indicators: Vec<IndicatorId>,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub n_periods: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub indicator_ids: Vec<IndicatorId>,
    pub default_threshold: f64,
    pub default_n_periods: usize,
    pub indicators: BTreeMap<IndicatorId, IndicatorOverride>,
    pub signals: Vec<SignalConfig>,
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub retries: usize,
    pub backoff_base_secs: f64,
    pub base_url: String,
    pub insecure: bool,
    pub state_file: PathBuf,
    pub env_file: PathBuf,
    pub history_cap: Option<usize>,
    pub ai_summary: bool,
    /// Unrecognised keys, including the flat `indicator_<id>_threshold` and
    /// `indicator_<id>_n_periods` forms.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            indicator_ids: Vec::new(),
            default_threshold: 10.0,
            default_n_periods: 3,
            indicators: BTreeMap::new(),
            signals: Vec::new(),
            concurrency: 4,
            timeout_secs: 30,
            retries: 3,
            backoff_base_secs: 1.5,
            base_url: DEFAULT_BASE_URL.to_string(),
            insecure: false,
            state_file: PathBuf::from("data/state.json"),
            env_file: PathBuf::from(".env"),
            history_cap: None,
            ai_summary: false,
            extra: BTreeMap::new(),
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a YAML document. Paths stay as written.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: MonitorConfig = serde_yaml::from_str(yaml)?;
        config.absorb_flat_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. Relative `state_file` and `env_file` resolve against
    /// the parent of the directory holding the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&yaml)?;

        let base_dir = base_dir_for(path);
        config.state_file = resolve_path(&base_dir, &config.state_file);
        config.env_file = resolve_path(&base_dir, &config.env_file);
        debug!(
            state_file = %config.state_file.display(),
            env_file = %config.env_file.display(),
            "Resolved config paths"
        );
        Ok(config)
    }

    /// Apply command-line overrides, then re-validate.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(concurrency) = cli.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(retries) = cli.retries {
            self.retries = retries;
        }
        if let Some(backoff) = cli.backoff_base {
            self.backoff_base_secs = backoff;
        }
        if let Some(ref base_url) = cli.base_url {
            self.base_url = base_url.clone();
        }
        self.insecure |= cli.insecure;
        self.ai_summary |= cli.ai_summary;
        self.validate()
    }

    fn absorb_flat_overrides(&mut self) {
        for id in self.indicator_ids.clone() {
            let threshold = self
                .extra
                .get(&format!("indicator_{}_threshold", id))
                .and_then(serde_yaml::Value::as_f64);
            let n_periods = self
                .extra
                .get(&format!("indicator_{}_n_periods", id))
                .and_then(serde_yaml::Value::as_u64)
                .map(|n| n as usize);
            if threshold.is_none() && n_periods.is_none() {
                continue;
            }

            let entry = self.indicators.entry(id).or_default();
            if entry.threshold.is_none() {
                entry.threshold = threshold;
            }
            if entry.n_periods.is_none() {
                entry.n_periods = n_periods;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indicator_ids.is_empty() {
            return Err(invalid("config must include a non-empty indicator_ids list"));
        }
        if self.concurrency == 0 {
            return Err(invalid("concurrency must be at least 1"));
        }
        if self.default_n_periods == 0 {
            return Err(invalid("default_n_periods must be at least 1"));
        }
        if self.default_threshold < 0.0 {
            return Err(invalid("default_threshold must not be negative"));
        }
        if self.backoff_base_secs < 0.0 || !self.backoff_base_secs.is_finite() {
            return Err(invalid("backoff_base_secs must be a non-negative number"));
        }

        for (id, entry) in &self.indicators {
            if entry.n_periods == Some(0) {
                return Err(invalid(format!("indicator {}: n_periods must be at least 1", id)));
            }
            if entry.threshold.is_some_and(|t| t < 0.0) {
                return Err(invalid(format!("indicator {}: threshold must not be negative", id)));
            }
        }

        for signal in &self.signals {
            self.validate_signal(signal)?;
        }
        Ok(())
    }

    fn validate_signal(&self, signal: &SignalConfig) -> Result<(), ConfigError> {
        let name = &signal.name;
        if signal.indicators.is_empty() {
            return Err(invalid(format!("signal {}: no indicators", name)));
        }
        if let Some(unknown) = signal
            .indicators
            .iter()
            .find(|id| !self.indicator_ids.contains(id))
        {
            return Err(invalid(format!(
                "signal {}: indicator {} is not in indicator_ids",
                name, unknown
            )));
        }
        if signal.n_periods == Some(0) {
            return Err(invalid(format!("signal {}: n_periods must be at least 1", name)));
        }
        if signal.threshold.is_some_and(|t| t < 0.0) {
            return Err(invalid(format!("signal {}: threshold must not be negative", name)));
        }

        match signal.kind {
            CompositeType::GrowthDiff | CompositeType::Ratio if signal.indicators.len() != 2 => {
                Err(invalid(format!("signal {}: needs exactly two indicators", name)))
            }
            CompositeType::Ratio => match (signal.min, signal.max) {
                (Some(min), Some(max)) if min <= max => Ok(()),
                (Some(_), Some(_)) => Err(invalid(format!("signal {}: min exceeds max", name))),
                _ => Err(invalid(format!("signal {}: ratio needs min and max", name))),
            },
            CompositeType::WeightedAvg if signal.weights.is_none() => {
                Err(invalid(format!("signal {}: weighted_avg needs weights", name)))
            }
            _ => Ok(()),
        }
    }

    pub fn indicator_params(&self, indicator_id: IndicatorId) -> IndicatorParams {
        let entry = self.indicators.get(&indicator_id);
        IndicatorParams {
            threshold: entry
                .and_then(|e| e.threshold)
                .unwrap_or(self.default_threshold),
            n_periods: entry
                .and_then(|e| e.n_periods)
                .unwrap_or(self.default_n_periods),
        }
    }

    /// Composite definitions in document order. Fails on a definition whose
    /// indicator count does not fit its type.
    pub fn signal_definitions(&self) -> Result<Vec<SignalDefinition>, ConfigError> {
        self.signals
            .iter()
            .map(|signal| {
                let ids = signal.indicators.as_slice();
                let kind = match (signal.kind, ids) {
                    (CompositeType::GrowthDiff, &[a, b]) => SignalKind::GrowthDiff { a, b },
                    (CompositeType::Ratio, &[numerator, denominator]) => SignalKind::Ratio {
                        numerator,
                        denominator,
                    },
                    (CompositeType::GrowthDiff | CompositeType::Ratio, _) => {
                        return Err(invalid(format!(
                            "signal {}: needs exactly two indicators",
                            signal.name
                        )))
                    }
                    (CompositeType::CompositeAvg, _) => SignalKind::CompositeAvg {
                        indicators: ids.to_vec(),
                    },
                    (CompositeType::WeightedAvg, _) => SignalKind::WeightedAvg {
                        indicators: ids.to_vec(),
                        weights: signal.weights.clone().unwrap_or_default(),
                    },
                };
                let threshold = match signal.kind {
                    CompositeType::Ratio => Threshold::Band {
                        min: signal.min.unwrap_or(f64::NEG_INFINITY),
                        max: signal.max.unwrap_or(f64::INFINITY),
                    },
                    _ => Threshold::Scalar(signal.threshold.unwrap_or(self.default_threshold)),
                };
                Ok(SignalDefinition {
                    name: signal.name.clone(),
                    kind,
                    threshold,
                    n_periods: signal.n_periods.unwrap_or(self.default_n_periods),
                })
            })
            .collect()
    }

    /// History window length: the longest lookback plus the current point,
    /// or `history_cap` when configured larger.
    pub fn history_cap(&self) -> usize {
        let longest = self
            .indicator_ids
            .iter()
            .map(|id| self.indicator_params(*id).n_periods)
            .chain(
                self.signals
                    .iter()
                    .map(|s| s.n_periods.unwrap_or(self.default_n_periods)),
            )
            .max()
            .unwrap_or(self.default_n_periods);
        (longest + 1).max(self.history_cap.unwrap_or(0))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            retries: self.retries,
            backoff_base: Duration::from_secs_f64(self.backoff_base_secs),
            insecure: self.insecure,
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// `config/monitor.yaml` → the directory containing `config/`.
fn base_dir_for(config_path: &Path) -> PathBuf {
    let absolute = if config_path.is_absolute() {
        config_path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(config_path))
            .unwrap_or_else(|_| config_path.to_path_buf())
    };
    absolute
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
