//! Dashboard proxy server
//!
//! Exposes the two upstream-backed endpoints the dashboard consumes:
//!
//! - `GET /api/weatherData?lat=&lon=`
//! - `GET /api/airQualityData?lat=&lon=`
//!
//! Handlers validate the query parameters, delegate to the data clients,
//! and collapse every upstream anomaly into a fixed generic error body.
//! The original error is logged server-side only.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::data::{
    AirQualityClient, AirQualitySnapshot, Coordinates, WeatherClient, WeatherSnapshot,
};

/// Shared state for the proxy handlers
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub weather: WeatherClient,
    pub air_quality: AirQualityClient,
}

/// Query parameters accepted by both endpoints
///
/// Both values are optional at the type level so that missing parameters
/// surface as the dashboard's fixed 400 body instead of a framework
/// rejection.
#[derive(Debug, Deserialize)]
pub struct CoordsQuery {
    lat: Option<f64>,
    lon: Option<f64>,
}

type ApiError = (StatusCode, Json<Value>);

/// The fixed 400 response for a missing `lat` or `lon` parameter
fn missing_params() -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing lat or lon" })),
    )
}

/// The fixed 500 response for an upstream failure
fn upstream_failure(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

fn require_coords(query: &CoordsQuery) -> Result<Coordinates, ApiError> {
    match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
        _ => Err(missing_params()),
    }
}

/// `GET /api/weatherData` - reshaped current weather for a coordinate
pub async fn weather_data(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let coords = require_coords(&query)?;

    match state.weather.fetch_weather(coords).await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(err) => {
            tracing::error!("weather fetch for {coords} failed: {err}");
            Err(upstream_failure("Failed to fetch weather data"))
        }
    }
}

/// `GET /api/airQualityData` - merged current air quality for a coordinate
pub async fn air_quality_data(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> Result<Json<AirQualitySnapshot>, ApiError> {
    let coords = require_coords(&query)?;

    match state.air_quality.fetch_air_quality(coords).await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(err) => {
            tracing::error!("air quality fetch for {coords} failed: {err}");
            Err(upstream_failure("Failed to fetch air quality data"))
        }
    }
}

/// `GET /api/health` - liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the proxy router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/weatherData", get(weather_data))
        .route("/api/airQualityData", get(air_quality_data))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Binds the listener and serves the proxy until the process exits
pub async fn serve(port: u16, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on port {port}");
    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(lat: Option<f64>, lon: Option<f64>) -> CoordsQuery {
        CoordsQuery { lat, lon }
    }

    fn error_message(err: &ApiError) -> &str {
        err.1
             .0
            .get("error")
            .and_then(|value| value.as_str())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_weather_missing_lon_is_400() {
        let result = weather_data(
            State(AppState::default()),
            Query(query(Some(52.23), None)),
        )
        .await;

        let err = result.err().expect("Missing lon should fail");
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&err), "Missing lat or lon");
    }

    #[tokio::test]
    async fn test_weather_missing_lat_is_400() {
        let result = weather_data(
            State(AppState::default()),
            Query(query(None, Some(21.01))),
        )
        .await;

        let err = result.err().expect("Missing lat should fail");
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_air_quality_missing_both_is_400() {
        let result =
            air_quality_data(State(AppState::default()), Query(query(None, None))).await;

        let err = result.err().expect("Missing params should fail");
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&err), "Missing lat or lon");
    }

    #[tokio::test]
    async fn test_weather_upstream_failure_is_500_with_fixed_body() {
        // Point the client at a port nothing listens on
        let state = AppState {
            weather: WeatherClient::with_base_url("http://127.0.0.1:9/v1/forecast"),
            air_quality: AirQualityClient::default(),
        };

        let result = weather_data(
            State(state),
            Query(query(Some(52.23), Some(21.01))),
        )
        .await;

        let err = result.err().expect("Unreachable upstream should fail");
        assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_message(&err), "Failed to fetch weather data");
    }

    #[tokio::test]
    async fn test_air_quality_upstream_failure_is_500_with_fixed_body() {
        let state = AppState {
            weather: WeatherClient::default(),
            air_quality: AirQualityClient::with_base_url("http://127.0.0.1:9/v1/air-quality"),
        };

        let result = air_quality_data(
            State(state),
            Query(query(Some(52.23), Some(21.01))),
        )
        .await;

        let err = result.err().expect("Unreachable upstream should fail");
        assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_message(&err), "Failed to fetch air quality data");
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let Json(body) = health().await;
        assert_eq!(body.get("status").and_then(Value::as_str), Some("ok"));
    }
}
