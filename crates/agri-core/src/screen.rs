use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Home,
    DiseaseDetection,
    MarketPrices,
    CropAdvisory,
    GovtSchemes,
    Analytics,
    VoiceAssistant,
    Settings,
    Insurance,
}

impl Screen {
    pub const ALL: [Screen; 10] = [
        Self::Login,
        Self::Home,
        Self::DiseaseDetection,
        Self::MarketPrices,
        Self::CropAdvisory,
        Self::GovtSchemes,
        Self::Analytics,
        Self::VoiceAssistant,
        Self::Settings,
        Self::Insurance,
    ];

    /// Screens listed on the bottom navigation bar, in display order.
    pub const MAIN: [Screen; 4] = [
        Self::Home,
        Self::Analytics,
        Self::VoiceAssistant,
        Self::Settings,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Home => "home",
            Self::DiseaseDetection => "disease_detection",
            Self::MarketPrices => "market_prices",
            Self::CropAdvisory => "crop_advisory",
            Self::GovtSchemes => "govt_schemes",
            Self::Analytics => "analytics",
            Self::VoiceAssistant => "voice_assistant",
            Self::Settings => "settings",
            Self::Insurance => "insurance",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Welcome",
            Self::Home => "AgriSmart",
            Self::DiseaseDetection => "Disease Detection",
            Self::MarketPrices => "Market Prices (Mandi)",
            Self::CropAdvisory => "Crop Advisory",
            Self::GovtSchemes => "Government Schemes",
            Self::Analytics => "Analytics",
            Self::VoiceAssistant => "Voice Assistant",
            Self::Settings => "Settings",
            Self::Insurance => "Coming Soon",
        }
    }

    pub const fn requires_session(self) -> bool {
        !matches!(self, Self::Login)
    }

    pub const fn shows_bottom_nav(self) -> bool {
        matches!(
            self,
            Self::Home | Self::Analytics | Self::VoiceAssistant | Self::Settings
        )
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown screen: {0}")]
pub struct UnknownScreen(pub String);

impl FromStr for Screen {
    type Err = UnknownScreen;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let alias = match normalized.as_str() {
            "disease" | "diagnose" => Some(Self::DiseaseDetection),
            "market" | "prices" | "mandi" => Some(Self::MarketPrices),
            "advisory" | "advice" => Some(Self::CropAdvisory),
            "schemes" => Some(Self::GovtSchemes),
            "voice" | "assistant" => Some(Self::VoiceAssistant),
            _ => None,
        };

        alias
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|screen| screen.as_str() == normalized)
            })
            .ok_or_else(|| UnknownScreen(value.to_string()))
    }
}
