use std::env;

use thiserror::Error;

pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("missing model credential: set {}", .0.join(" or "))]
    MissingCredential(Vec<String>),
}

/// Supplies the model API key at call time.
pub trait CredentialSource: Send + Sync {
    fn api_key(&self) -> Result<String, ConfigurationError>;
}

/// Reads the first non-empty variable from the process environment on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    keys: Vec<String>,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::from_keys(&API_KEY_ENV_VARS)
    }
}

impl EnvCredentials {
    pub fn from_keys(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|key| (*key).to_string()).collect(),
        }
    }
}

impl CredentialSource for EnvCredentials {
    fn api_key(&self) -> Result<String, ConfigurationError> {
        first_non_blank(&self.keys, &|key| env::var(key).ok())
    }
}

/// Returns the trimmed value of the first key whose value is non-blank.
fn first_non_blank(
    keys: &[String],
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<String, ConfigurationError> {
    keys.iter()
        .find_map(|key| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
        .ok_or_else(|| ConfigurationError::MissingCredential(keys.to_vec()))
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    api_key: Option<String>,
}

impl StaticCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    pub fn missing() -> Self {
        Self { api_key: None }
    }
}

impl CredentialSource for StaticCredentials {
    fn api_key(&self) -> Result<String, ConfigurationError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| ConfigurationError::MissingCredential(vec!["api key".to_string()]))
    }
}
