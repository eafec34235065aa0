use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_FARMER_NAME: &str = "Farmer";
pub const DEFAULT_LOCATION: &str = "Punjab, India";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Ta,
    Pa,
}

impl Language {
    pub const ALL: [Language; 4] = [Self::En, Self::Hi, Self::Ta, Self::Pa];

    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Ta => "ta",
            Self::Pa => "pa",
        }
    }

    /// Label shown on the language picker, in the language itself.
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "हिंदी",
            Self::Ta => "தமிழ்",
            Self::Pa => "ਪੰਜਾਬੀ",
        }
    }

    /// Name interpolated into model prompts.
    pub const fn prompt_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
            Self::Ta => "Tamil",
            Self::Pa => "Punjabi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported language code: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| {
                language.code() == normalized
                    || language.prompt_name().eq_ignore_ascii_case(&normalized)
            })
            .ok_or_else(|| UnknownLanguage(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub language: Language,
    pub location: String,
}

/// Raw values captured by the login form. Blank fields fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub name: Option<String>,
    pub language: Language,
    pub location: Option<String>,
}

impl LoginForm {
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            name: non_blank_or(self.name, DEFAULT_FARMER_NAME),
            language: self.language,
            location: non_blank_or(self.location, DEFAULT_LOCATION),
        }
    }
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub session_id: Uuid,
    pub profile: UserProfile,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn start(profile: UserProfile) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            profile,
            signed_in_at: Utc::now(),
        }
    }

    /// First comma-separated component of the location, e.g. "Punjab".
    pub fn region(&self) -> &str {
        self.profile
            .location
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Bot,
            text: text.into(),
        }
    }
}
