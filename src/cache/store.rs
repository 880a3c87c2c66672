//! Cache-key derivation and storage backends
//!
//! The key scheme mirrors the dashboard's browser-storage layout:
//! `"{kind}_{lat},{lon}_{day}/{hour}"` for coordinate-scoped data, or the
//! bare kind name for data that is independent of location (the stored
//! geolocation). The hour component is the staleness mechanism; there is no
//! expiry metadata and no eviction.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use directories::ProjectDirs;

use crate::data::Coordinates;

/// The kinds of data the dashboard caches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// Reshaped weather snapshot from the proxy
    Weather,
    /// Reshaped air-quality snapshot from the proxy
    AirQuality,
    /// Coordinates resolved by the location accessor
    Geolocation,
}

impl DataKind {
    /// The kind's name as it appears in cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Weather => "weatherData",
            DataKind::AirQuality => "AQIData",
            DataKind::Geolocation => "geolocation",
        }
    }

    /// Whether keys for this kind embed coordinates and a coarse timestamp
    ///
    /// The stored geolocation uses the bare kind name, so the first
    /// successful lookup in a session is reused regardless of movement.
    pub fn is_location_scoped(&self) -> bool {
        !matches!(self, DataKind::Geolocation)
    }
}

/// Derives the cache key for a kind at the current wall-clock time
pub fn cache_key(kind: DataKind, coords: Coordinates) -> String {
    cache_key_at(kind, coords, Local::now().naive_local())
}

/// Derives the cache key for a kind at an explicit wall-clock time
///
/// Pure in all of its inputs: two calls with the same kind, coordinates,
/// day-of-month, and hour produce the same key.
pub fn cache_key_at(kind: DataKind, coords: Coordinates, now: NaiveDateTime) -> String {
    if !kind.is_location_scoped() {
        return kind.as_str().to_string();
    }
    format!("{}_{}_{}/{}", kind.as_str(), coords, now.day(), now.hour())
}

/// String key-value storage for cached responses
///
/// Values are raw JSON strings. Implementations provide whole-value reads
/// and writes only; near-simultaneous writers to the same key race benignly
/// (last write wins).
pub trait Storage: Send + Sync {
    /// Returns the stored value for a key, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value under a key, overwriting any previous value
    fn set(&self, key: &str, value: &str) -> io::Result<()>;

    /// Existence check for a key
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory storage backend
///
/// Used in tests and for sessions that opt out of persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "storage mutex poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-per-key storage backend under an XDG-compliant cache directory
///
/// Uses `~/.cache/skycast/` on Linux, or the equivalent path elsewhere.
/// Entries accumulate across sessions; the coarse timestamp in the key is
/// the only staleness signal.
#[derive(Debug, Clone)]
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    /// Creates a FileStore in the platform cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g. no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "skycast")?;
        Some(Self {
            cache_dir: project_dirs.cache_dir().to_path_buf(),
        })
    }

    /// Creates a FileStore with a custom directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path to the file backing the given key
    ///
    /// Keys carry a `day/hour` suffix; the slash is replaced so the key maps
    /// to a single file name rather than a nested path.
    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key.replace('/', "-")))
    }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.entry_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        fs::write(self.entry_path(key), value)
    }
}
