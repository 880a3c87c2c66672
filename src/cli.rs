//! Command-line interface parsing for skycast
//!
//! Two subcommands: `serve` runs the proxy server, `show` fetches current
//! conditions through the caching client and prints them.

use clap::{Parser, Subcommand};

use crate::client::DEFAULT_SERVER_URL;

/// Port used when neither `--port` nor the `PORT` variable is set
pub const DEFAULT_PORT: u16 = 3000;

/// Skycast - weather and air quality dashboard
#[derive(Parser, Debug)]
#[command(name = "skycast")]
#[command(about = "Weather and air quality dashboard proxy and client")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the dashboard proxy server
    Serve {
        /// Port to listen on (falls back to the PORT environment variable,
        /// then 3000)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch and print current conditions for a location
    Show {
        /// Latitude override; defaults to the detected location
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude override; defaults to the detected location
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Base URL of a running proxy server
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,
        /// Skip the persistent response cache for this run
        #[arg(long)]
        no_cache: bool,
    },
}

/// Resolves the port to listen on: flag, then `PORT` variable, then default
pub fn resolve_port(flag: Option<u16>, env_port: Option<&str>) -> u16 {
    flag.or_else(|| env_port.and_then(|raw| raw.parse().ok()))
        .unwrap_or(DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_default() {
        let cli = Cli::parse_from(["skycast", "serve"]);
        match cli.command {
            Command::Serve { port } => assert!(port.is_none()),
            _ => panic!("Expected serve subcommand"),
        }
    }

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::parse_from(["skycast", "serve", "--port", "8080"]);
        match cli.command {
            Command::Serve { port } => assert_eq!(port, Some(8080)),
            _ => panic!("Expected serve subcommand"),
        }
    }

    #[test]
    fn test_parse_show_with_coordinates() {
        let cli = Cli::parse_from(["skycast", "show", "--lat", "52.23", "--lon", "21.01"]);
        match cli.command {
            Command::Show { lat, lon, server, no_cache } => {
                assert_eq!(lat, Some(52.23));
                assert_eq!(lon, Some(21.01));
                assert_eq!(server, DEFAULT_SERVER_URL);
                assert!(!no_cache);
            }
            _ => panic!("Expected show subcommand"),
        }
    }

    #[test]
    fn test_parse_show_lat_requires_lon() {
        let result = Cli::try_parse_from(["skycast", "show", "--lat", "52.23"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_show_defaults() {
        let cli = Cli::parse_from(["skycast", "show"]);
        match cli.command {
            Command::Show { lat, lon, no_cache, .. } => {
                assert!(lat.is_none());
                assert!(lon.is_none());
                assert!(!no_cache);
            }
            _ => panic!("Expected show subcommand"),
        }
    }

    #[test]
    fn test_resolve_port_prefers_flag() {
        assert_eq!(resolve_port(Some(8080), Some("9090")), 8080);
    }

    #[test]
    fn test_resolve_port_falls_back_to_env() {
        assert_eq!(resolve_port(None, Some("9090")), 9090);
    }

    #[test]
    fn test_resolve_port_ignores_bad_env() {
        assert_eq!(resolve_port(None, Some("not a port")), DEFAULT_PORT);
    }

    #[test]
    fn test_resolve_port_default() {
        assert_eq!(resolve_port(None, None), DEFAULT_PORT);
    }
}
