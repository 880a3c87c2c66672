//! Open-Meteo air quality API client
//!
//! Fetches the current air-quality observation and the hourly methane series,
//! aligns the observation time to the matching hourly entry, and merges both
//! into a single flat [`AirQualitySnapshot`].
//!
//! Methane is only published in the hourly series, never in the current
//! block, which is why the alignment step exists at all: the observation
//! timestamp is truncated to the top of its hour and looked up in the series
//! to recover the reading for that hour.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{AirQualitySnapshot, Coordinates, PollutantReading};

/// Base URL for the Open-Meteo air quality API
const AIR_QUALITY_BASE_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

/// Current-observation variables requested from the upstream
const CURRENT_FIELDS: &str =
    "european_aqi,pm10,pm2_5,carbon_monoxide,nitrogen_dioxide,sulphur_dioxide,ozone";

/// Timestamp format shared by the current observation and the hourly series
const SERIES_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Fallback unit when the upstream omits one for a pollutant
const DEFAULT_POLLUTANT_UNIT: &str = "μg/m³";

/// Placeholder for the pollutant driving the index; the upstream does not
/// report it and the dashboard has never computed it.
const DOMINANT_POLLUTANT_PLACEHOLDER: &str = "pm2_5";

/// Errors that can occur when fetching air quality data
#[derive(Debug, Error)]
pub enum AirQualityError {
    /// HTTP request failed or the upstream returned a non-success status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// Invalid time format in response
    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    /// The hourly series has no entry for the observation hour
    #[error("No hourly entry for {0}")]
    UnalignedHour(String),
}

/// Client for fetching air quality data from the Open-Meteo air quality API
#[derive(Debug, Clone)]
pub struct AirQualityClient {
    client: Client,
    base_url: String,
}

impl Default for AirQualityClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AirQualityClient {
    /// Creates a new AirQualityClient with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: AIR_QUALITY_BASE_URL.to_string(),
        }
    }

    /// Creates a new AirQualityClient with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches the current air quality for the given coordinates
    ///
    /// The hourly methane series is aligned to the observation hour and
    /// merged into the snapshot. When the series has no entry for that hour
    /// the methane field is omitted and a warning is logged; every other
    /// failure is returned to the caller.
    pub async fn fetch_air_quality(
        &self,
        coords: Coordinates,
    ) -> Result<AirQualitySnapshot, AirQualityError> {
        let url = format!(
            "{}?latitude={}&longitude={}&current={}&hourly=methane&timezone=auto",
            self.base_url, coords.lat, coords.lon, CURRENT_FIELDS
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        let api_response: AirQualityResponse = serde_json::from_str(&text)?;

        merge_response(api_response)
    }
}

/// Truncates a timestamp to the top of its hour
///
/// Minute and second are always valid at zero, so the fallback branch is
/// unreachable; it exists to keep the operation total without panicking.
fn truncate_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .unwrap_or(ts)
}

/// Locates the observation hour in the hourly series and returns the
/// co-indexed methane value
///
/// The observation timestamp (`YYYY-MM-DDTHH:MM`) is parsed, truncated to
/// the top of the hour, re-serialized in the series format, and matched
/// against the series timestamps by linear scan.
fn aligned_methane(series: &HourlySeries, observed: &str) -> Result<f64, AirQualityError> {
    let parsed = NaiveDateTime::parse_from_str(observed, SERIES_TIME_FORMAT)
        .map_err(|_| AirQualityError::InvalidTimeFormat(observed.to_string()))?;
    let target = truncate_to_hour(parsed)
        .format(SERIES_TIME_FORMAT)
        .to_string();

    series
        .time
        .iter()
        .position(|entry| entry == &target)
        .and_then(|index| series.methane.get(index).copied())
        .ok_or(AirQualityError::UnalignedHour(target))
}

/// Merges the current observation with the hour-aligned methane reading
fn merge_response(response: AirQualityResponse) -> Result<AirQualitySnapshot, AirQualityError> {
    let current = response.current;
    let units = response.current_units;

    let aqi = current
        .european_aqi
        .ok_or_else(|| AirQualityError::MissingField("european_aqi".to_string()))?;

    let mut pollutants = BTreeMap::new();
    let readings = [
        ("pm10", current.pm10),
        ("pm2_5", current.pm2_5),
        ("carbon_monoxide", current.carbon_monoxide),
        ("nitrogen_dioxide", current.nitrogen_dioxide),
        ("sulphur_dioxide", current.sulphur_dioxide),
        ("ozone", current.ozone),
    ];
    for (name, value) in readings {
        if let Some(value) = value {
            let unit = units
                .get(name)
                .cloned()
                .unwrap_or_else(|| DEFAULT_POLLUTANT_UNIT.to_string());
            pollutants.insert(name.to_string(), PollutantReading { value, unit });
        }
    }

    let methane = match aligned_methane(&response.hourly, &current.time) {
        Ok(value) => Some(value),
        Err(AirQualityError::UnalignedHour(target)) => {
            tracing::warn!("no hourly methane entry for {target}, omitting field");
            None
        }
        Err(err) => return Err(err),
    };

    Ok(AirQualitySnapshot {
        time: current.time,
        aqi,
        dominant_pollutant: DOMINANT_POLLUTANT_PLACEHOLDER.to_string(),
        methane,
        pollutants,
    })
}

/// Open-Meteo air quality API response structure
#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: CurrentAirQuality,
    #[serde(default)]
    current_units: BTreeMap<String, String>,
    hourly: HourlySeries,
}

/// Current observation block from the air quality API
#[derive(Debug, Deserialize)]
struct CurrentAirQuality {
    time: String,
    european_aqi: Option<f64>,
    pm10: Option<f64>,
    pm2_5: Option<f64>,
    carbon_monoxide: Option<f64>,
    nitrogen_dioxide: Option<f64>,
    sulphur_dioxide: Option<f64>,
    ozone: Option<f64>,
}

/// Hourly series block from the air quality API
#[derive(Debug, Deserialize)]
struct HourlySeries {
    time: Vec<String>,
    methane: Vec<f64>,
}
