use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub api_key: String,
    pub city: String,
}

impl WeatherQuery {
    pub fn new(api_key: impl Into<String>, city: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), city: city.into() }
    }
}

/// Current conditions for one location, shaped like the provider's
/// `current.json` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location: Location,
    pub current: Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub condition: Condition,
    pub humidity: Reading,
    pub wind_kph: Reading,
    pub pressure_mb: Reading,
    pub uv: Reading,
    pub feelslike_c: Reading,
    #[serde(default)]
    pub windchill_c: Option<Reading>,
    #[serde(default)]
    pub heatindex_c: Option<Reading>,
    #[serde(default)]
    pub dewpoint_c: Option<Reading>,
    pub wind_dir: String,
    pub gust_kph: Reading,
    pub cloud: Reading,
    #[serde(default)]
    pub last_updated_epoch: Option<i64>,
}

impl Current {
    /// Time the provider last refreshed these readings, if it said so.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.last_updated_epoch.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    /// Protocol-relative path, e.g. `//cdn.weatherapi.com/weather/64x64/day/116.png`.
    pub icon: String,
}

impl Condition {
    /// Absolute URL of the large variant of the condition icon.
    pub fn icon_url(&self) -> String {
        let url = if self.icon.starts_with("//") {
            format!("https:{}", self.icon)
        } else {
            self.icon.clone()
        };
        url.replace("64x64", "128x128")
    }
}

/// A measurement kept as the provider sent it: a JSON number or a string.
///
/// Numbers are held as `serde_json::Number` (an `f64` for decimals), so `11.0`
/// displays as `11.0` while `29.90` displays as `29.9`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(serde_json::Number),
    Text(String),
}

impl Reading {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Number(n) => n.as_f64(),
            Reading::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Number(n) => write!(f, "{n}"),
            Reading::Text(s) => f.write_str(s),
        }
    }
}

/// What the front end renders for the most recent search.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Loading,
    Success(WeatherRecord),
    Error(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn record(&self) -> Option<&WeatherRecord> {
        match self {
            RequestState::Success(record) => Some(record),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }
}
