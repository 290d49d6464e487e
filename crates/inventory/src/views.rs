use serde_json::Map;
use serde_json::Value;

use cua_version::Version;

/// One extension as seen through the lock file (`composer.lock`): the
/// authoritative source for `composerName` and canonical version.
#[derive(Debug, Clone)]
pub struct LockExtensionView {
    pub key: String,
    pub composer_name: String,
    pub version: Version,
}

/// One extension as seen through the package-state file
/// (`PackageStates.php`), enriched with its manifest (`ext_emconf.php`):
/// the authoritative source for the active flag and local metadata.
#[derive(Debug, Clone)]
pub struct PackageStateExtensionView {
    pub key: String,
    pub active: bool,
    pub title: String,
    pub version: Option<Version>,
    pub em_configuration: Map<String, Value>,
    pub package_path: String,
}
