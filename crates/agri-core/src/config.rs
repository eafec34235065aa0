use thiserror::Error;
use url::Url;

use crate::config_env::{Lookup, optional_trimmed, parse_bool, parse_u64, string_or};
use crate::llm::{AdvisoryModels, GeminiClientConfig};
use crate::models::Theme;

pub const DEFAULT_GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiClientConfig,
    pub models: AdvisoryModels,
    pub theme: Theme,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer in env var {key}: {value}")]
    ParseInt { key: String, value: String },
    #[error("invalid boolean in env var {0}")]
    ParseBool(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = parse_base_url(lookup)?;
        let dark_mode = parse_bool(lookup, "AGRISMART_DARK_MODE", false)?;

        Ok(Self {
            gemini: GeminiClientConfig {
                api_base_url,
                timeout_ms: parse_u64(lookup, "GEMINI_TIMEOUT_MS", DEFAULT_GEMINI_TIMEOUT_MS)?,
            },
            models: AdvisoryModels {
                vision: string_or(lookup, "GEMINI_VISION_MODEL", DEFAULT_VISION_MODEL),
                text: string_or(lookup, "GEMINI_TEXT_MODEL", DEFAULT_TEXT_MODEL),
            },
            theme: if dark_mode { Theme::Dark } else { Theme::Light },
        })
    }
}

fn parse_base_url(lookup: Lookup<'_>) -> Result<String, ConfigError> {
    let Some(raw) = optional_trimmed(lookup, "GEMINI_API_BASE_URL") else {
        return Ok(DEFAULT_GEMINI_API_BASE_URL.to_string());
    };

    let parsed = Url::parse(&raw).map_err(|err| {
        ConfigError::InvalidConfiguration(format!("GEMINI_API_BASE_URL is not a valid url: {err}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidConfiguration(
            "GEMINI_API_BASE_URL must start with http:// or https://".to_string(),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{AppConfig, ConfigError, DEFAULT_GEMINI_API_BASE_URL};
    use crate::models::Theme;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(&|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).expect("defaults should parse");

        assert_eq!(config.gemini.api_base_url, DEFAULT_GEMINI_API_BASE_URL);
        assert_eq!(config.gemini.timeout_ms, 30_000);
        assert_eq!(config.models.vision, "gemini-2.5-flash-image");
        assert_eq!(config.models.text, "gemini-2.5-flash");
        assert_eq!(config.theme, Theme::Light);
    }

    #[test]
    fn overrides_are_trimmed_and_parsed() {
        let config = config_from(&[
            ("GEMINI_API_BASE_URL", " http://127.0.0.1:9000/v1beta/ "),
            ("GEMINI_TIMEOUT_MS", "1500"),
            ("GEMINI_TEXT_MODEL", "gemini-test"),
            ("AGRISMART_DARK_MODE", "on"),
        ])
        .expect("overrides should parse");

        assert_eq!(config.gemini.api_base_url, "http://127.0.0.1:9000/v1beta");
        assert_eq!(config.gemini.timeout_ms, 1500);
        assert_eq!(config.models.text, "gemini-test");
        assert_eq!(config.theme, Theme::Dark);
    }

    #[test]
    fn invalid_values_are_reported() {
        assert!(matches!(
            config_from(&[("GEMINI_TIMEOUT_MS", "soon")]),
            Err(ConfigError::ParseInt { ref key, .. }) if key == "GEMINI_TIMEOUT_MS"
        ));
        assert!(matches!(
            config_from(&[("AGRISMART_DARK_MODE", "maybe")]),
            Err(ConfigError::ParseBool(_))
        ));
        assert!(matches!(
            config_from(&[("GEMINI_API_BASE_URL", "ftp://example.com")]),
            Err(ConfigError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            config_from(&[("GEMINI_API_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidConfiguration(_))
        ));
    }
}
