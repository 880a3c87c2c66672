//! Cached coordinate accessor
//!
//! Resolves the host's coordinates through a one-shot IP-geolocation lookup
//! and stores the result under a fixed cache key, so the first successful
//! lookup in a session is reused thereafter regardless of movement.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::cache::{cache_key, DataKind, Storage};
use crate::data::Coordinates;

/// IP-geolocation endpoint; free, no API key required
const LOOKUP_URL: &str = "http://ip-api.com/json";

/// Errors that can occur when resolving the current location
#[derive(Debug, Error)]
pub enum LocationError {
    /// The lookup request failed
    #[error("Location lookup failed: {0}")]
    Lookup(#[from] reqwest::Error),

    /// The lookup service answered but did not resolve a position
    #[error("Location unavailable: {0}")]
    Unavailable(String),

    /// A cached coordinate entry exists but cannot be parsed
    #[error("Cached location is malformed")]
    MalformedCache,
}

/// Response from the IP-geolocation service
#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Resolves and caches the host's coordinates
pub struct LocationService {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn Storage>,
}

impl LocationService {
    /// Creates a LocationService backed by the given storage
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: LOOKUP_URL.to_string(),
            store,
        }
    }

    /// Creates a LocationService with a custom lookup URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>, store: Arc<dyn Storage>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            store,
        }
    }

    /// Returns the current coordinates
    ///
    /// A previously stored result is returned as-is; otherwise a single
    /// lookup is performed and its result stored under the fixed key.
    pub async fn current_coordinates(&self) -> Result<Coordinates, LocationError> {
        // Coordinates are irrelevant for the fixed geolocation key.
        let key = cache_key(DataKind::Geolocation, Coordinates::new(0.0, 0.0));

        if let Some(raw) = self.store.get(&key) {
            return serde_json::from_str(&raw).map_err(|_| LocationError::MalformedCache);
        }

        let coords = self.lookup().await?;
        match serde_json::to_string(&coords) {
            Ok(raw) => {
                if let Err(err) = self.store.set(&key, &raw) {
                    tracing::debug!("failed to store location: {err}");
                }
            }
            Err(err) => tracing::debug!("failed to encode location: {err}"),
        }
        Ok(coords)
    }

    /// Performs the one-shot lookup against the geolocation service
    async fn lookup(&self) -> Result<Coordinates, LocationError> {
        let response: LookupResponse = self
            .http
            .get(&self.base_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "success" {
            return Err(LocationError::Unavailable(
                response.message.unwrap_or_else(|| response.status.clone()),
            ));
        }

        match (response.lat, response.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::Unavailable(
                "response missing coordinates".to_string(),
            )),
        }
    }
}
