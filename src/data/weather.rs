//! Open-Meteo forecast API client
//!
//! Fetches current conditions from the Open-Meteo forecast API and reshapes
//! the response into the stable [`WeatherSnapshot`] field names the dashboard
//! consumes.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::{Coordinates, WeatherSnapshot};

/// Base URL for the Open-Meteo forecast API
const FORECAST_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Current-conditions variables requested from the upstream
const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,wind_speed_10m,pressure_msl,cloud_cover";

/// Daily variables requested from the upstream
const DAILY_FIELDS: &str = "sunrise,sunset,precipitation_probability_max";

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed or the upstream returned a non-success status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),
}

/// Client for fetching weather data from the Open-Meteo forecast API
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherClient {
    /// Creates a new WeatherClient with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: FORECAST_BASE_URL.to_string(),
        }
    }

    /// Creates a new WeatherClient with a custom base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches current weather conditions for the given coordinates
    ///
    /// # Returns
    /// * `Ok(WeatherSnapshot)` - Reshaped current conditions
    /// * `Err(WeatherError)` - If the request, status, or parsing fails
    pub async fn fetch_weather(&self, coords: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!(
            "{}?latitude={}&longitude={}&current={}&daily={}&timezone=auto",
            self.base_url, coords.lat, coords.lon, CURRENT_FIELDS, DAILY_FIELDS
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        let api_response: ForecastResponse = serde_json::from_str(&text)?;

        reshape_response(api_response)
    }
}

/// Maps the upstream response onto the dashboard's output field names
fn reshape_response(response: ForecastResponse) -> Result<WeatherSnapshot, WeatherError> {
    let current = response.current;
    let daily = response.daily;

    let sunrise = daily
        .sunrise
        .first()
        .cloned()
        .ok_or_else(|| WeatherError::MissingField("sunrise".to_string()))?;
    let sunset = daily
        .sunset
        .first()
        .cloned()
        .ok_or_else(|| WeatherError::MissingField("sunset".to_string()))?;
    let precipitation_probability = daily
        .precipitation_probability_max
        .first()
        .copied()
        .ok_or_else(|| WeatherError::MissingField("precipitation_probability_max".to_string()))?;

    Ok(WeatherSnapshot {
        temperature: current.temperature_2m,
        feels_like: current.apparent_temperature,
        humidity: current.relative_humidity_2m,
        wind_speed: current.wind_speed_10m,
        pressure: current.pressure_msl,
        cloud_cover: current.cloud_cover,
        sunrise,
        sunset,
        precipitation_probability,
    })
}

/// Open-Meteo forecast API response structure
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
    daily: DailyConditions,
}

/// Current conditions block from Open-Meteo
#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    wind_speed_10m: f64,
    pressure_msl: f64,
    cloud_cover: f64,
}

/// Daily conditions block from Open-Meteo
#[derive(Debug, Deserialize)]
struct DailyConditions {
    sunrise: Vec<String>,
    sunset: Vec<String>,
    precipitation_probability_max: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sample valid Open-Meteo forecast response
    const VALID_RESPONSE: &str = r#"{
        "latitude": 52.23,
        "longitude": 21.01,
        "generationtime_ms": 0.123,
        "utc_offset_seconds": 3600,
        "timezone": "Europe/Warsaw",
        "timezone_abbreviation": "CET",
        "elevation": 113.0,
        "current_units": {
            "time": "iso8601",
            "interval": "seconds",
            "temperature_2m": "°C",
            "relative_humidity_2m": "%",
            "apparent_temperature": "°C",
            "wind_speed_10m": "km/h",
            "pressure_msl": "hPa",
            "cloud_cover": "%"
        },
        "current": {
            "time": "2024-01-01T10:47",
            "interval": 900,
            "temperature_2m": 3.4,
            "relative_humidity_2m": 87,
            "apparent_temperature": 0.9,
            "wind_speed_10m": 14.2,
            "pressure_msl": 1019.6,
            "cloud_cover": 100
        },
        "daily_units": {
            "time": "iso8601",
            "sunrise": "iso8601",
            "sunset": "iso8601",
            "precipitation_probability_max": "%"
        },
        "daily": {
            "time": ["2024-01-01"],
            "sunrise": ["2024-01-01T07:39"],
            "sunset": ["2024-01-01T15:32"],
            "precipitation_probability_max": [61]
        }
    }"#;

    #[test]
    fn test_reshape_valid_response() {
        let response: ForecastResponse =
            serde_json::from_str(VALID_RESPONSE).expect("Failed to parse valid response");

        let snapshot = reshape_response(response).expect("Failed to reshape response");

        assert!((snapshot.temperature - 3.4).abs() < 0.01);
        assert!((snapshot.feels_like - 0.9).abs() < 0.01);
        assert!((snapshot.humidity - 87.0).abs() < 0.01);
        assert!((snapshot.wind_speed - 14.2).abs() < 0.01);
        assert!((snapshot.pressure - 1019.6).abs() < 0.01);
        assert!((snapshot.cloud_cover - 100.0).abs() < 0.01);
        assert_eq!(snapshot.sunrise, "2024-01-01T07:39");
        assert_eq!(snapshot.sunset, "2024-01-01T15:32");
        assert!((snapshot.precipitation_probability - 61.0).abs() < 0.01);
    }

    #[test]
    fn test_reshaped_output_uses_stable_field_names() {
        let response: ForecastResponse =
            serde_json::from_str(VALID_RESPONSE).expect("Failed to parse valid response");
        let snapshot = reshape_response(response).expect("Failed to reshape response");

        let json = serde_json::to_value(&snapshot).expect("Failed to serialize snapshot");
        for field in [
            "temperature",
            "feelsLike",
            "humidity",
            "windSpeed",
            "pressure",
            "cloudCover",
            "sunrise",
            "sunset",
            "precipitationProbability",
        ] {
            assert!(json.get(field).is_some(), "output should contain {}", field);
        }
        // Upstream names must not leak through
        assert!(json.get("temperature_2m").is_none());
        assert!(json.get("apparent_temperature").is_none());
    }

    #[test]
    fn test_parse_malformed_json() {
        let malformed = "{ invalid json }";
        let result: Result<ForecastResponse, _> = serde_json::from_str(malformed);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_missing_current_block() {
        let missing_current = r#"{
            "daily": {
                "time": ["2024-01-01"],
                "sunrise": ["2024-01-01T07:39"],
                "sunset": ["2024-01-01T15:32"],
                "precipitation_probability_max": [61]
            }
        }"#;

        let result: Result<ForecastResponse, _> = serde_json::from_str(missing_current);
        assert!(result.is_err());
    }

    #[test]
    fn test_reshape_empty_daily_arrays() {
        let empty_arrays = r#"{
            "current": {
                "time": "2024-01-01T10:47",
                "temperature_2m": 3.4,
                "relative_humidity_2m": 87,
                "apparent_temperature": 0.9,
                "wind_speed_10m": 14.2,
                "pressure_msl": 1019.6,
                "cloud_cover": 100
            },
            "daily": {
                "time": [],
                "sunrise": [],
                "sunset": [],
                "precipitation_probability_max": []
            }
        }"#;

        let response: ForecastResponse =
            serde_json::from_str(empty_arrays).expect("Failed to parse");
        let result = reshape_response(response);

        assert!(result.is_err());
        match result {
            Err(WeatherError::MissingField(field)) => {
                assert_eq!(field, "sunrise");
            }
            _ => panic!("Expected MissingField error"),
        }
    }

    #[test]
    fn test_client_default_points_at_open_meteo() {
        let client = WeatherClient::default();
        assert_eq!(client.base_url, FORECAST_BASE_URL);
    }

    #[test]
    fn test_client_with_base_url() {
        let client = WeatherClient::with_base_url("http://127.0.0.1:8080/v1/forecast");
        assert_eq!(client.base_url, "http://127.0.0.1:8080/v1/forecast");
    }
}
