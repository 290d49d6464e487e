use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A cached payload plus the bookkeeping needed to decide whether it's
/// still usable. `cached_at` and `ttl_seconds` travel with the payload
/// itself, so validity doesn't depend on filesystem mtimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: Value,
    pub cached_at: u64,
    pub ttl_seconds: u64,
}

impl CacheEntry {
    pub fn new(payload: Value, ttl_seconds: u64) -> Self {
        Self { payload, cached_at: now_unix(), ttl_seconds }
    }

    pub fn is_valid(&self) -> bool {
        now_unix().saturating_sub(self.cached_at) <= self.ttl_seconds
    }
}

pub(crate) fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}
