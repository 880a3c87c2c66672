//! Cache-through client for the dashboard proxy endpoints
//!
//! Before any network call the client derives a cache key from the data
//! kind, the coordinates, and the current hour. A hit is parsed and returned
//! without touching the network; a miss fetches from the proxy, stores the
//! raw JSON body, and returns the parsed value. There is no invalidation and
//! no concurrency guard: two near-simultaneous misses both fetch and both
//! write, and the last write wins.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::cache::{cache_key, DataKind, Storage};
use crate::data::{AirQualitySnapshot, Coordinates, WeatherSnapshot};

/// Default base URL of the dashboard proxy server
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Errors that can occur when fetching through the client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request to the proxy failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse a response or cached entry
    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The proxy answered with an error status
    #[error("Server returned {status}: {message}")]
    ServerError { status: u16, message: String },
}

/// Client that reads dashboard data through the response cache
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn Storage>,
}

impl DashboardClient {
    /// Creates a client against the given proxy base URL and storage backend
    pub fn new(base_url: impl Into<String>, store: Arc<dyn Storage>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            store,
        }
    }

    /// Fetches the weather snapshot for the given coordinates
    pub async fn get_weather(&self, coords: Coordinates) -> Result<WeatherSnapshot, ClientError> {
        self.cached_fetch(DataKind::Weather, "/api/weatherData", coords)
            .await
    }

    /// Fetches the air-quality snapshot for the given coordinates
    pub async fn get_air_quality(
        &self,
        coords: Coordinates,
    ) -> Result<AirQualitySnapshot, ClientError> {
        self.cached_fetch(DataKind::AirQuality, "/api/airQualityData", coords)
            .await
    }

    /// Cache-through read path shared by both data kinds
    async fn cached_fetch<T: DeserializeOwned>(
        &self,
        kind: DataKind,
        path: &str,
        coords: Coordinates,
    ) -> Result<T, ClientError> {
        let key = cache_key(kind, coords);

        if let Some(raw) = self.store.get(&key) {
            tracing::debug!("cache hit for {key}");
            return Ok(serde_json::from_str(&raw)?);
        }

        let raw = self.fetch_raw(path, coords).await?;
        if let Err(err) = self.store.set(&key, &raw) {
            tracing::debug!("failed to store {key}: {err}");
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Performs the proxy request and returns the raw JSON body
    async fn fetch_raw(&self, path: &str, coords: Coordinates) -> Result<String, ClientError> {
        let url = format!(
            "{}{}?lat={}&lon={}",
            self.base_url, path, coords.lat, coords.lon
        );

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("error")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(body);
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}
