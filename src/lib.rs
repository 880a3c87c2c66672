//! Skycast library
//!
//! A small weather and air-quality dashboard: an HTTP proxy over two public
//! Open-Meteo APIs, and a client that reads through an hourly-keyed response
//! cache. The modules are exposed for the binary and for integration tests.

pub mod cache;
pub mod cli;
pub mod client;
pub mod data;
pub mod location;
pub mod server;
