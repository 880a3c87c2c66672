//! Skycast - weather and air quality dashboard
//!
//! `skycast serve` runs the proxy server over the Open-Meteo APIs;
//! `skycast show` fetches current conditions through the caching client and
//! prints them.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use skycast::cache::{FileStore, MemoryStore, Storage};
use skycast::cli::{resolve_port, Cli, Command};
use skycast::client::DashboardClient;
use skycast::data::{AirQualitySnapshot, Coordinates, WeatherSnapshot};
use skycast::location::LocationService;
use skycast::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => {
            let env_port = std::env::var("PORT").ok();
            let port = resolve_port(port, env_port.as_deref());
            server::serve(port, AppState::default()).await?;
        }
        Command::Show { lat, lon, server, no_cache } => {
            show(lat.zip(lon), server, no_cache).await?;
        }
    }

    Ok(())
}

/// Fetches both snapshots through the cache and prints them
async fn show(
    coords: Option<(f64, f64)>,
    server: String,
    no_cache: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn Storage> = if no_cache {
        Arc::new(MemoryStore::new())
    } else {
        match FileStore::new() {
            Some(store) => Arc::new(store),
            None => {
                tracing::warn!("no cache directory available, caching in memory only");
                Arc::new(MemoryStore::new())
            }
        }
    };

    let coords = match coords {
        Some((lat, lon)) => Coordinates::new(lat, lon),
        None => {
            let location = LocationService::new(Arc::clone(&store));
            location.current_coordinates().await?
        }
    };

    let client = DashboardClient::new(server, store);
    let (weather, air_quality) =
        futures::try_join!(client.get_weather(coords), client.get_air_quality(coords))?;

    print_weather(coords, &weather);
    print_air_quality(&air_quality);
    Ok(())
}

fn print_weather(coords: Coordinates, weather: &WeatherSnapshot) {
    println!("Conditions at {}", coords);
    println!(
        "  Temperature:   {:.1} °C (feels like {:.1} °C)",
        weather.temperature, weather.feels_like
    );
    println!("  Humidity:      {:.0} %", weather.humidity);
    println!("  Wind:          {:.1} km/h", weather.wind_speed);
    println!("  Pressure:      {:.1} hPa", weather.pressure);
    println!("  Cloud cover:   {:.0} %", weather.cloud_cover);
    println!(
        "  Precipitation: {:.0} % chance",
        weather.precipitation_probability
    );
    println!("  Sunrise:       {}", weather.sunrise);
    println!("  Sunset:        {}", weather.sunset);
}

fn print_air_quality(air_quality: &AirQualitySnapshot) {
    println!("Air quality (observed {})", air_quality.time);
    println!("  European AQI:  {:.0}", air_quality.aqi);
    for (name, reading) in &air_quality.pollutants {
        println!("  {:<14} {:.1} {}", format!("{}:", name), reading.value, reading.unit);
    }
    match air_quality.methane {
        Some(methane) => println!("  methane:       {:.1}", methane),
        None => println!("  methane:       unavailable"),
    }
}
