use std::path::PathBuf;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use config::FileFormat;
use config::Value;
use config::ValueKind;
use serde::Deserialize;
use serde::Serialize;

const CONFIGURATION_FILE: &str = "cms-upgrade";
const ENVIRONMENT_PREFIX: &str = "CMS_UPGRADE";

const DEFAULT_REWRITE_HOST: &str = "https://packages.typo3.org";
const DEFAULT_COMPOSER_HOST: &str = "https://packagist.org";

/// Run-wide tuning, distinct from any CLI project-config file: worker
/// pool sizing, per-source timeouts, and cache behavior for the core
/// crates themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfiguration {
    pub worker_threads: usize,
    pub rewrite_analyzer_concurrency: usize,
    pub source_timeout_seconds: u64,
    pub tool_timeout_seconds: u64,
    pub cache_ttl_seconds: u64,
    pub cache_root: PathBuf,
    pub community_registry_host: String,
    pub composer_registry_host: String,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1);
        Self {
            worker_threads: cores,
            rewrite_analyzer_concurrency: (cores / 2).max(1),
            source_timeout_seconds: 10,
            tool_timeout_seconds: 300,
            cache_ttl_seconds: 3600,
            cache_root: PathBuf::from(".cms-upgrade-cache/"),
            community_registry_host: DEFAULT_REWRITE_HOST.to_owned(),
            composer_registry_host: DEFAULT_COMPOSER_HOST.to_owned(),
        }
    }
}

impl RunConfiguration {
    /// Layers compiled-in defaults, an optional `cms-upgrade.toml`, then
    /// `CMS_UPGRADE_`-prefixed environment variables, then validates.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let builder = Config::builder()
            .set_default("worker_threads", Value::new(None, ValueKind::U64(defaults.worker_threads as u64)))?
            .set_default("rewrite_analyzer_concurrency", Value::new(None, ValueKind::U64(defaults.rewrite_analyzer_concurrency as u64)))?
            .set_default("source_timeout_seconds", Value::new(None, ValueKind::U64(defaults.source_timeout_seconds)))?
            .set_default("tool_timeout_seconds", Value::new(None, ValueKind::U64(defaults.tool_timeout_seconds)))?
            .set_default("cache_ttl_seconds", Value::new(None, ValueKind::U64(defaults.cache_ttl_seconds)))?
            .set_default("cache_root", Value::new(None, ValueKind::String(defaults.cache_root.to_string_lossy().into_owned())))?
            .set_default("community_registry_host", Value::new(None, ValueKind::String(defaults.community_registry_host.clone())))?
            .set_default("composer_registry_host", Value::new(None, ValueKind::String(defaults.composer_registry_host.clone())))?
            .add_source(File::with_name(CONFIGURATION_FILE).required(false).format(FileFormat::Toml))
            .add_source(Environment::with_prefix(ENVIRONMENT_PREFIX).try_parsing(true));

        let mut configuration: Self = builder.build()?.try_deserialize()?;
        configuration.normalize();
        Ok(configuration)
    }

    fn normalize(&mut self) {
        if self.worker_threads == 0 {
            tracing::info!("worker_threads configured as zero, falling back to logical CPU count");
            self.worker_threads = std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1);
        }
        if self.rewrite_analyzer_concurrency == 0 {
            tracing::warn!("rewrite_analyzer_concurrency configured as zero, raising to 1");
            self.rewrite_analyzer_concurrency = 1;
        }
        if self.source_timeout_seconds == 0 {
            tracing::warn!("source_timeout_seconds configured as zero, raising to the default of 10s");
            self.source_timeout_seconds = 10;
        }
        if self.tool_timeout_seconds == 0 {
            tracing::warn!("tool_timeout_seconds configured as zero, raising to the default of 300s");
            self.tool_timeout_seconds = 300;
        }
        if self.cache_root.as_os_str().is_empty() {
            tracing::warn!("cache_root configured empty, falling back to .cms-upgrade-cache/");
            self.cache_root = PathBuf::from(".cms-upgrade-cache/");
        }
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_seconds)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_seconds)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let configuration = RunConfiguration::default();
        assert!(configuration.worker_threads >= 1);
        assert!(configuration.rewrite_analyzer_concurrency >= 1);
        assert_eq!(configuration.cache_ttl_seconds, 3600);
    }

    #[test]
    fn normalize_repairs_a_zero_timeout() {
        let mut configuration = RunConfiguration::default();
        configuration.source_timeout_seconds = 0;
        configuration.normalize();
        assert_eq!(configuration.source_timeout_seconds, 10);
    }
}
