use std::path::Path;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use sha2::Digest;
use sha2::Sha256;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

use cua_cache::CacheStore;
use cua_inventory::Extension;

use crate::capability::AnalyzerCapability;
use crate::context::AnalysisContext;
use crate::result::AnalysisResult;
use crate::result::CachedAnalysisPayload;

const DIRECTORY_MTIME_WALK_FILE_CAP: usize = 100;

/// The uniform cache-fronted execution shell: every analyzer supplies
/// only `AnalyzerCapability::analyze`, and this drives the cache lookup,
/// invocation, and cache write around it.
pub struct CachedAnalyzerDriver<'a> {
    cache: &'a dyn CacheStore,
}

impl<'a> CachedAnalyzerDriver<'a> {
    pub fn new(cache: &'a dyn CacheStore) -> Self {
        Self { cache }
    }

    /// `extension_path`, when known, enables the additional directory-mtime
    /// validity check (§4.5): a cached entry older than the extension
    /// directory's latest modification is treated as stale even within
    /// its TTL.
    pub fn run<A: AnalyzerCapability>(
        &self,
        analyzer: &A,
        extension: &Extension,
        context: &AnalysisContext,
        extension_path: Option<&Path>,
    ) -> AnalysisResult {
        let analyzer_specific = analyzer.cache_key_components(extension, context);
        let key = compute_cache_key(analyzer.name(), extension, context, &analyzer_specific);
        let directory_mtime = extension_path.and_then(|path| directory_max_mtime(path, DIRECTORY_MTIME_WALK_FILE_CAP));

        if context.caching_enabled {
            if let Some(hit) = self.try_cache_hit(&key, extension, directory_mtime) {
                debug!("cache hit for analyzer '{}' on extension '{}'", analyzer.name(), extension.key);
                return hit;
            }
        }

        match analyzer.analyze(extension, context) {
            Ok(result) => {
                if result.successful && context.caching_enabled {
                    self.store(&key, &result, context.cache_ttl.as_secs());
                }
                result
            }
            Err(error) => {
                warn!("analyzer '{}' failed on extension '{}': {error}", analyzer.name(), extension.key);
                AnalysisResult::builder(analyzer.name(), extension.clone()).failed(error.to_string()).build()
            }
        }
    }

    fn try_cache_hit(&self, key: &str, extension: &Extension, directory_mtime: Option<u64>) -> Option<AnalysisResult> {
        let value = self.cache.get(key)?;
        let payload: CachedAnalysisPayload = serde_json::from_value(value).ok()?;

        if let Some(mtime) = directory_mtime {
            if mtime > payload.cached_at {
                debug!("discarding cache entry for '{}': extension directory changed since caching", extension.key);
                return None;
            }
        }

        Some(payload.into_result(extension.clone()))
    }

    fn store(&self, key: &str, result: &AnalysisResult, ttl_seconds: u64) {
        let payload = CachedAnalysisPayload::from_result(result, now_unix(), ttl_seconds);
        match serde_json::to_value(&payload) {
            Ok(value) => {
                self.cache.set(key, value, ttl_seconds);
            }
            Err(error) => warn!("failed to serialize analysis result for caching: {error}"),
        }
    }
}

/// SHA-256 of the canonical JSON encoding of the universal key components
/// plus whatever the analyzer itself contributes.
fn compute_cache_key(analyzer_name: &str, extension: &Extension, context: &AnalysisContext, analyzer_specific: &Map<String, Value>) -> String {
    let mut components = Map::new();
    components.insert("analyzer".to_owned(), Value::String(analyzer_name.to_owned()));
    components.insert("extensionKey".to_owned(), Value::String(extension.key.clone()));
    components.insert("extensionVersion".to_owned(), Value::String(extension.version.to_string()));
    components.insert("currentVersion".to_owned(), Value::String(context.current_version.to_string()));
    components.insert("targetVersion".to_owned(), Value::String(context.target_version.to_string()));
    components.insert("extensionType".to_owned(), Value::String(format!("{:?}", extension.extension_type).to_lowercase()));
    components.insert("composerName".to_owned(), extension.composer_name.clone().map_or(Value::Null, Value::String));
    components.insert("analyzerSpecific".to_owned(), Value::Object(analyzer_specific.clone()));

    let canonical = serde_json::to_string(&Value::Object(components)).expect("a Map of scalars always serializes");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();

    format!("analysis_{analyzer_name}_{hex}")
}

/// The latest modification time among up to `max_files` PHP source files
/// under `path` (§4.5: "bounded directory walk, ≤ 100 PHP files, max
/// mtime wins"). `None` when the directory has no PHP files to walk.
fn directory_max_mtime(path: &Path, max_files: usize) -> Option<u64> {
    let mut seen = 0usize;
    let mut max_mtime = None;

    for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
        if seen >= max_files {
            break;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("php") {
            continue;
        }

        let Ok(metadata) = entry.metadata() else { continue };
        let Ok(modified) = metadata.modified() else { continue };
        seen += 1;
        let mtime = unix_seconds(modified);
        max_mtime = Some(max_mtime.map_or(mtime, |current: u64| current.max(mtime)));
    }

    max_mtime
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

fn now_unix() -> u64 {
    unix_seconds(SystemTime::now())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::Map as JsonMap;

    use cua_cache::InMemoryCacheStore;
    use cua_inventory::ExtensionType;
    use cua_version::Version;

    use crate::error::AnalyzerError;

    use super::*;

    fn extension() -> Extension {
        Extension::new("news", "News", Version::new(11, 0, 0), ExtensionType::Composer, Some("georgringer/news".to_owned()), true, JsonMap::new())
            .unwrap()
    }

    fn context() -> AnalysisContext {
        AnalysisContext::new(Version::new(11, 0, 0), Version::new(12, 4, 0), "/tmp/installation")
    }

    struct StubAnalyzer {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl AnalyzerCapability for StubAnalyzer {
        fn name(&self) -> &str {
            "stub-analyzer"
        }

        fn description(&self) -> &str {
            "test-only analyzer"
        }

        fn supports(&self, _extension: &Extension) -> bool {
            true
        }

        fn analyze(&self, extension: &Extension, _context: &AnalysisContext) -> Result<AnalysisResult, AnalyzerError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(AnalysisResult::builder(self.name(), extension.clone()).risk_score(3.0).build())
        }
    }

    #[test]
    fn caches_successful_results_across_calls() {
        let cache = InMemoryCacheStore::new();
        let driver = CachedAnalyzerDriver::new(&cache);
        let analyzer = StubAnalyzer { calls: std::sync::atomic::AtomicUsize::new(0) };

        let first = driver.run(&analyzer, &extension(), &context(), None);
        let second = driver.run(&analyzer, &extension(), &context(), None);

        assert_eq!(first.risk_score, second.risk_score);
        assert_eq!(analyzer.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn bypasses_cache_when_caching_is_disabled() {
        let cache = InMemoryCacheStore::new();
        let driver = CachedAnalyzerDriver::new(&cache);
        let analyzer = StubAnalyzer { calls: std::sync::atomic::AtomicUsize::new(0) };
        let context = context().with_caching_enabled(false);

        driver.run(&analyzer, &extension(), &context, None);
        driver.run(&analyzer, &extension(), &context, None);

        assert_eq!(analyzer.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn a_directory_modified_after_caching_invalidates_the_cache_entry() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Foo.php"), "<?php echo 1;").unwrap();

        let cache = InMemoryCacheStore::new();
        let driver = CachedAnalyzerDriver::new(&cache);
        let analyzer = StubAnalyzer { calls: std::sync::atomic::AtomicUsize::new(0) };

        driver.run(&analyzer, &extension(), &context(), Some(tmp.path()));
        assert_eq!(analyzer.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        // Unchanged directory: still a cache hit.
        driver.run(&analyzer, &extension(), &context(), Some(tmp.path()));
        assert_eq!(analyzer.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        // mtime has whole-second resolution; the new file must land in a
        // later second than the cached entry to be observed as newer.
        std::thread::sleep(std::time::Duration::from_secs(1));
        std::fs::write(tmp.path().join("Bar.php"), "<?php echo 2;").unwrap();
        driver.run(&analyzer, &extension(), &context(), Some(tmp.path()));
        assert_eq!(analyzer.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    struct FailingAnalyzer;

    impl AnalyzerCapability for FailingAnalyzer {
        fn name(&self) -> &str {
            "failing-analyzer"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn supports(&self, _extension: &Extension) -> bool {
            true
        }

        fn analyze(&self, _extension: &Extension, _context: &AnalysisContext) -> Result<AnalysisResult, AnalyzerError> {
            Err(AnalyzerError::ToolUnavailable("rector".to_owned()))
        }
    }

    #[test]
    fn converts_an_analyzer_error_into_an_unsuccessful_result() {
        let cache = InMemoryCacheStore::new();
        let driver = CachedAnalyzerDriver::new(&cache);

        let result = driver.run(&FailingAnalyzer, &extension(), &context(), None);
        assert!(!result.successful);
        assert!(result.error.unwrap().contains("rector"));
    }
}
