use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use cua_cache::CacheStore;
use cua_cache::generate_key;

use crate::extension::Extension;
use crate::result::ExtensionDiscoveryResult;
use crate::result::discover_extensions;

/// The serialized shape written to and read from the cache, analogous to
/// `CachedAnalysisPayload` in the analyzer driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedInventoryPayload {
    successful: bool,
    extensions: Vec<Extension>,
    lock_source_used: bool,
    package_state_source_used: bool,
    warnings: Vec<String>,
}

impl From<&ExtensionDiscoveryResult> for CachedInventoryPayload {
    fn from(result: &ExtensionDiscoveryResult) -> Self {
        Self {
            successful: result.successful,
            extensions: result.extensions.clone(),
            lock_source_used: result.lock_source_used,
            package_state_source_used: result.package_state_source_used,
            warnings: result.warnings.clone(),
        }
    }
}

impl From<CachedInventoryPayload> for ExtensionDiscoveryResult {
    fn from(payload: CachedInventoryPayload) -> Self {
        Self {
            successful: payload.successful,
            extensions: payload.extensions,
            lock_source_used: payload.lock_source_used,
            package_state_source_used: payload.package_state_source_used,
            warnings: payload.warnings,
        }
    }
}

fn cache_key(installation_path: &Path, custom_paths: &BTreeMap<String, String>) -> String {
    let custom_paths_repr = custom_paths.iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join(",");
    generate_key("inventory", &[&installation_path.to_string_lossy(), &custom_paths_repr])
}

/// Cache-fronted `discover_extensions`, keyed by `installationPath +
/// customPaths` (§4.2). A cache hit skips both the lock-file and
/// package-state reads entirely; a miss runs discovery and, if
/// successful, stores the merged inventory for next time.
#[allow(clippy::too_many_arguments)]
pub fn discover_extensions_cached(
    cache: &dyn CacheStore,
    ttl_seconds: u64,
    installation_path: &Path,
    custom_paths: &BTreeMap<String, String>,
    lock_path: &Path,
    package_states_path: &Path,
    vendor_dir: &str,
) -> ExtensionDiscoveryResult {
    let key = cache_key(installation_path, custom_paths);

    if let Some(value) = cache.get(&key) {
        match serde_json::from_value::<CachedInventoryPayload>(value) {
            Ok(payload) => {
                debug!("cache hit for extension inventory under {}", installation_path.display());
                return payload.into();
            }
            Err(error) => warn!("discarding unreadable cached inventory entry: {error}"),
        }
    }

    let result = discover_extensions(installation_path, lock_path, package_states_path, vendor_dir);

    if result.successful {
        match serde_json::to_value(CachedInventoryPayload::from(&result)) {
            Ok(value) => {
                cache.set(&key, value, ttl_seconds);
            }
            Err(error) => warn!("failed to serialize extension inventory for caching: {error}"),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use cua_cache::InMemoryCacheStore;

    use super::*;

    #[test]
    fn a_second_call_with_the_same_key_is_served_from_cache() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("composer.lock"), r#"{"packages":[]}"#).unwrap();

        let cache = InMemoryCacheStore::new();
        let custom_paths = BTreeMap::new();
        let lock_path = tmp.path().join("composer.lock");
        let package_states_path = tmp.path().join("typo3conf/PackageStates.php");

        let first = discover_extensions_cached(&cache, 3600, tmp.path(), &custom_paths, &lock_path, &package_states_path, "vendor");
        assert!(first.successful);

        std::fs::remove_file(&lock_path).unwrap();
        let second = discover_extensions_cached(&cache, 3600, tmp.path(), &custom_paths, &lock_path, &package_states_path, "vendor");
        assert_eq!(second.extensions.len(), first.extensions.len());
    }

    #[test]
    fn different_custom_paths_produce_different_cache_entries() {
        assert_ne!(cache_key(std::path::Path::new("/tmp/a"), &BTreeMap::new()), cache_key(std::path::Path::new("/tmp/a"), &BTreeMap::from([("vendor-dir".to_owned(), "libs".to_owned())])));
    }
}
