use crate::config::ConfigError;

/// Source of configuration values; `std::env::var` in production.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub(crate) fn optional_trimmed(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub(crate) fn string_or(lookup: Lookup<'_>, key: &str, default: &str) -> String {
    optional_trimmed(lookup, key).unwrap_or_else(|| default.to_string())
}

pub(crate) fn parse_u64(lookup: Lookup<'_>, key: &str, default: u64) -> Result<u64, ConfigError> {
    match optional_trimmed(lookup, key) {
        Some(value) => value.parse::<u64>().map_err(|_| ConfigError::ParseInt {
            key: key.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

pub(crate) fn parse_bool(
    lookup: Lookup<'_>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match optional_trimmed(lookup, key) {
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool(key.to_string())),
        },
        None => Ok(default),
    }
}
