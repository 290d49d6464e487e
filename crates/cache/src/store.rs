use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::entry::CacheEntry;

/// A keyed content store. Implementations own expiry: a `get` for an
/// entry whose TTL has elapsed must behave as a miss, not return stale
/// payload.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, payload: Value, ttl_seconds: u64) -> bool;
}

/// Backs the store with one JSON file per key under `root`, mirroring the
/// small-file-on-disk pattern used elsewhere in this codebase rather than
/// a database engine.
pub struct FileCacheStore {
    root: PathBuf,
}

impl FileCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn read_entry(&self, path: &Path) -> io::Result<CacheEntry> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn write_entry(&self, path: &Path, entry: &CacheEntry) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let serialized = serde_json::to_vec_pretty(entry).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)?;
        fs::rename(&tmp_path, path)
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.entry_path(key);
        let entry = match self.read_entry(&path) {
            Ok(entry) => entry,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("discarding unreadable cache entry {key}: {err}");
                let _ = fs::remove_file(&path);
                return None;
            }
        };

        if !entry.is_valid() {
            debug!("cache entry {key} expired, evicting");
            let _ = fs::remove_file(&path);
            return None;
        }

        Some(entry.payload)
    }

    fn set(&self, key: &str, payload: Value, ttl_seconds: u64) -> bool {
        let entry = CacheEntry::new(payload, ttl_seconds);
        match self.write_entry(&self.entry_path(key), &entry) {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to persist cache entry {key}: {err}");
                false
            }
        }
    }
}

/// An in-process store for tests and for callers that don't want
/// cross-run persistence.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.is_valid() => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, payload: Value, ttl_seconds: u64) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_owned(), CacheEntry::new(payload, ttl_seconds));
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn file_store_round_trips_a_fresh_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(tmp.path());

        assert!(store.set("analysis_news", json!({"riskScore": 42}), 3600));
        assert_eq!(store.get("analysis_news"), Some(json!({"riskScore": 42})));
    }

    #[test]
    fn file_store_misses_on_absent_key() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(tmp.path());
        assert_eq!(store.get("nope"), None);
    }

    #[test]
    fn file_store_evicts_expired_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(tmp.path());
        let entry = CacheEntry { payload: json!({"x": 1}), cached_at: 0, ttl_seconds: 1 };
        store.write_entry(&store.entry_path("stale"), &entry).unwrap();

        assert_eq!(store.get("stale"), None);
        assert!(!store.entry_path("stale").exists());
    }

    #[test]
    fn in_memory_store_round_trips() {
        let store = InMemoryCacheStore::new();
        store.set("k", json!("v"), 60);
        assert_eq!(store.get("k"), Some(json!("v")));
    }
}
