use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use cua_resolver::InstallationType;
use cua_version::Version;

use crate::configuration::DiscoveredConfiguration;

/// The root record the rest of the pipeline is built against: where the
/// installation lives, how it's managed, and what version it's running.
///
/// `configurations` is populated by Configuration Discovery before this
/// value is handed to any analyzer; `metadata` carries provenance details
/// (e.g. `version_reliability`) that don't warrant their own field.
#[derive(Debug, Clone)]
pub struct Installation {
    pub path: PathBuf,
    pub installation_type: InstallationType,
    pub version: Version,
    pub version_strategy: String,
    pub version_reliability: f64,
    pub custom_paths: BTreeMap<String, String>,
    pub configurations: BTreeMap<String, DiscoveredConfiguration>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Installation {
    pub fn composer_lock_path(&self) -> PathBuf {
        self.path.join("composer.lock")
    }

    pub fn composer_json_path(&self) -> PathBuf {
        self.path.join("composer.json")
    }

    pub fn is_composer_managed(&self) -> bool {
        self.installation_type == InstallationType::Composer
    }

    pub fn looks_like(path: &Path) -> bool {
        path.is_dir()
    }
}
