//! Core data models for the skycast dashboard
//!
//! This module contains the data types shared between the proxy server and
//! the caching client: coordinates, the reshaped weather snapshot, and the
//! reshaped air-quality snapshot.

pub mod air_quality;
pub mod weather;

pub use air_quality::{AirQualityClient, AirQualityError};
pub use weather::{WeatherClient, WeatherError};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair
///
/// Coordinates are carried as plain floating-point values; beyond presence
/// there is no validation, matching what the upstream APIs accept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    /// Formats as `"{lat},{lon}"`, the form used in cache keys and logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Current weather conditions, reshaped from the upstream forecast response
///
/// Field names are the stable camelCase shape the dashboard consumes; values
/// pass through from the upstream unchanged. Sunrise and sunset keep the
/// upstream ISO 8601 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Air temperature at 2m, degrees Celsius
    pub temperature: f64,
    /// Apparent temperature, degrees Celsius
    pub feels_like: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: f64,
    /// Wind speed at 10m, km/h
    pub wind_speed: f64,
    /// Mean sea-level pressure, hPa
    pub pressure: f64,
    /// Total cloud cover percentage (0-100)
    pub cloud_cover: f64,
    /// Sunrise time for the current day (ISO 8601, local to the coordinates)
    pub sunrise: String,
    /// Sunset time for the current day (ISO 8601, local to the coordinates)
    pub sunset: String,
    /// Maximum precipitation probability for the current day (0-100)
    pub precipitation_probability: f64,
}

/// A single pollutant reading with its unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    /// Concentration value as reported upstream
    pub value: f64,
    /// Unit string as reported upstream (e.g. "μg/m³")
    pub unit: String,
}

/// Current air quality, merged from the upstream current observation and the
/// hour-aligned methane reading from the hourly series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualitySnapshot {
    /// Timestamp of the current observation (ISO 8601, local to the coordinates)
    pub time: String,
    /// European air quality index
    pub aqi: f64,
    /// Pollutant driving the index. Placeholder value, not computed.
    pub dominant_pollutant: String,
    /// Methane concentration for the observation hour, taken from the hourly
    /// series. Omitted when the observation hour has no series entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methane: Option<f64>,
    /// Per-pollutant readings from the current observation
    pub pollutants: BTreeMap<String, PollutantReading>,
}
