//! Credentials read from the `.env` file

use std::collections::HashMap;
use std::env;
use std::path::Path;

use tracing::warn;

use crate::error::ConfigError;

/// Checked in order, env file before process environment.
pub const GOOGLE_KEY_ALIASES: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY", "GOOGLE_GENAI_API_KEY"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Secrets {
    pub pushover_user_key: Option<String>,
    pub pushover_api_token: Option<String>,
    pub google_api_key: Option<String>,
}

impl Secrets {
    /// Read the env file without touching the process environment. A
    /// missing file yields empty values.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        let vars = if env_file.exists() {
            read_env_file(env_file)?
        } else {
            warn!(path = %env_file.display(), "Environment file not found");
            HashMap::new()
        };
        Ok(Self::from_vars(&vars))
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let lookup = |key: &str| {
            vars.get(key)
                .map(|v| strip_quotes(v))
                .filter(|v| !v.is_empty())
        };
        Self {
            pushover_user_key: lookup("PUSHOVER_USER_KEY"),
            pushover_api_token: lookup("PUSHOVER_API_TOKEN"),
            google_api_key: resolve_google_api_key(vars),
        }
    }

    /// Both Pushover credentials, or an error naming what is missing.
    pub fn pushover(&self) -> Result<(String, String), ConfigError> {
        match (&self.pushover_user_key, &self.pushover_api_token) {
            (Some(user), Some(token)) => Ok((user.clone(), token.clone())),
            _ => Err(ConfigError::Env(
                "PUSHOVER_USER_KEY and PUSHOVER_API_TOKEN are required".to_string(),
            )),
        }
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let iter = dotenvy::from_path_iter(path)
        .map_err(|e| ConfigError::Env(format!("{}: {}", path.display(), e)))?;
    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| ConfigError::Env(format!("{}: {}", path.display(), e)))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Google API key from the env-file values first, then the process
/// environment.
pub fn resolve_google_api_key(env_vars: &HashMap<String, String>) -> Option<String> {
    let from_file = GOOGLE_KEY_ALIASES
        .iter()
        .filter_map(|key| env_vars.get(*key))
        .map(|v| strip_quotes(v))
        .find(|v| !v.is_empty());

    from_file.or_else(|| {
        GOOGLE_KEY_ALIASES
            .iter()
            .filter_map(|key| env::var(key).ok())
            .map(|v| strip_quotes(&v))
            .find(|v| !v.is_empty())
    })
}

fn strip_quotes(value: &str) -> String {
    let trimmed = value.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(trimmed);
    unquoted.to_string()
}
