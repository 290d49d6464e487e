use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::Map;
use serde_json::Value;

use cua_version::Version;

const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;

/// Immutable context passed to every analyzer: the upgrade window, the
/// installation's location, and per-run tuning knobs.
///
/// Carries `working_directory` explicitly rather than letting analyzers
/// reach for the process's implicit current directory. `cancelled` is
/// shared (via `Arc`) across every clone handed to a Level-1 task, so the
/// orchestrator's single flag reaches every in-flight analyzer.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub current_version: Version,
    pub target_version: Version,
    pub installation_path: PathBuf,
    pub working_directory: PathBuf,
    pub custom_paths: std::collections::BTreeMap<String, String>,
    pub configuration: Map<String, Value>,
    pub caching_enabled: bool,
    pub cache_ttl: Duration,
    cancelled: Arc<AtomicBool>,
}

impl AnalysisContext {
    pub fn new(current_version: Version, target_version: Version, installation_path: impl Into<PathBuf>) -> Self {
        let installation_path = installation_path.into();
        Self {
            current_version,
            target_version,
            working_directory: installation_path.clone(),
            installation_path,
            custom_paths: std::collections::BTreeMap::new(),
            configuration: Map::new(),
            caching_enabled: true,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares `flag` as this context's cancellation signal, so a caller
    /// holding the same `Arc` can cancel every clone of this context at once.
    pub fn with_cancellation_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = flag;
        self
    }

    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn with_working_directory(mut self, working_directory: impl Into<PathBuf>) -> Self {
        self.working_directory = working_directory.into();
        self
    }

    pub fn with_custom_paths(mut self, custom_paths: std::collections::BTreeMap<String, String>) -> Self {
        self.custom_paths = custom_paths;
        self
    }

    pub fn with_caching_enabled(mut self, caching_enabled: bool) -> Self {
        self.caching_enabled = caching_enabled;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn installation_path(&self) -> &Path {
        &self.installation_path
    }
}
