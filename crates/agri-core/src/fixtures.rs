use serde::{Deserialize, Serialize};
use thiserror::Error;

const MARKET_PRICES_JSON: &str = include_str!("../fixtures/market_prices.json");
const SCHEMES_JSON: &str = include_str!("../fixtures/schemes.json");
const DASHBOARD_JSON: &str = include_str!("../fixtures/dashboard.json");

#[derive(Debug, Error)]
#[error("fixture {name} is not valid JSON: {source}")]
pub struct FixtureError {
    pub name: &'static str,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTrend {
    Up,
    Down,
    Stable,
}

impl PriceTrend {
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Up => "▲",
            Self::Down => "▼",
            Self::Stable => "▬",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketItem {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub unit: String,
    pub trend: PriceTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: String,
    pub title: String,
    pub description: String,
    pub eligibility: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: i32,
    pub condition: String,
    pub soil_temperature_c: i32,
    pub humidity_percent: u8,
    pub wind_speed_mps: u32,
    pub precipitation_mm: u32,
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub label: String,
    pub wheat: u32,
    pub rice: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPoint {
    pub label: String,
    pub quintals_per_acre: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub weather: WeatherSnapshot,
    pub price_trend: Vec<PricePoint>,
    pub yield_history: Vec<YieldPoint>,
}

/// Read-only datasets shown by the market, schemes, home and analytics screens.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixtures {
    pub market_prices: Vec<MarketItem>,
    pub schemes: Vec<Scheme>,
    pub dashboard: Dashboard,
}

impl Fixtures {
    pub fn load() -> Result<Self, FixtureError> {
        Ok(Self {
            market_prices: parse("market_prices", MARKET_PRICES_JSON)?,
            schemes: parse("schemes", SCHEMES_JSON)?,
            dashboard: parse("dashboard", DASHBOARD_JSON)?,
        })
    }
}

fn parse<T: for<'de> Deserialize<'de>>(name: &'static str, raw: &str) -> Result<T, FixtureError> {
    serde_json::from_str(raw).map_err(|source| FixtureError { name, source })
}
