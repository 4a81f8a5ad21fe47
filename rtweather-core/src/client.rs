use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{
    error::RequestFailed,
    model::{WeatherQuery, WeatherRecord},
};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";
const CURRENT_PATH: &str = "/v1/current.json";

#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherRecord, RequestFailed>;
}

/// Client for WeatherAPI.com's current-conditions endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http: Client::new() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn current_url(&self) -> String {
        format!("{}{}", self.base_url, CURRENT_PATH)
    }
}

impl Default for WeatherApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Error envelope the provider returns with 4xx statuses.
#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaError,
}

#[derive(Debug, Deserialize)]
struct WaError {
    message: String,
}

#[async_trait]
impl WeatherClient for WeatherApiClient {
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherRecord, RequestFailed> {
        let url = self.current_url();
        debug!(%url, city = %query.city, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[("key", query.api_key.as_str()), ("q", query.city.as_str())])
            .send()
            .await
            .map_err(|err| {
                let err = err.without_url();
                warn!(error = %err, "weather request could not be sent");
                RequestFailed::from(err)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            let err = err.without_url();
            warn!(error = %err, "failed to read weather response body");
            RequestFailed::new(format!("Failed to read weather response body: {err}"))
        })?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<WaErrorBody>(&body) {
                Ok(parsed) => parsed.error.message,
                Err(_) => truncate_body(&body),
            };
            warn!(%status, %detail, "weather provider returned an error status");
            return Err(RequestFailed::new(format!(
                "Weather request failed with status {status}: {detail}"
            )));
        }

        serde_json::from_str(&body).map_err(|err| {
            warn!(error = %err, "weather response did not match the expected shape");
            RequestFailed::new(format!("Failed to parse weather response: {err}"))
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
