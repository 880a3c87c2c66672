//! Client-side response cache
//!
//! Responses are stored as raw JSON strings under keys that embed a coarse
//! timestamp (day-of-month and hour), so staleness is implicit: the key
//! changes every hour and old entries simply stop being read. Nothing is
//! ever evicted.

mod store;

pub use store::{cache_key, cache_key_at, DataKind, FileStore, MemoryStore, Storage};
