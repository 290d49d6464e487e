use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ComposerError;

/// One `packages[]` entry of a `composer.lock` file.
#[derive(Debug, Clone, Deserialize)]
pub struct LockPackage {
    pub name: String,
    pub version: String,
    #[serde(rename = "type", default)]
    pub package_type: Option<String>,
    #[serde(default)]
    pub extra: Value,
}

impl LockPackage {
    /// The framework's extension packages are tagged with a `typo3-cms-*` type.
    pub fn is_framework_extension(&self, framework_type_prefix: &str) -> bool {
        self.package_type.as_deref().is_some_and(|t| t.starts_with(framework_type_prefix))
    }

    /// `extra.typo3/cms.extension-key`, when present, is the preferred source
    /// of truth for the extension key; otherwise it is derived from the last
    /// path segment of `name`, with hyphens folded to underscores.
    pub fn extension_key(&self) -> String {
        let from_extra = self
            .extra
            .get("typo3/cms")
            .and_then(|v| v.get("extension-key"))
            .and_then(Value::as_str)
            .map(str::to_owned);

        from_extra.unwrap_or_else(|| derive_key_from_package_name(&self.name))
    }
}

/// Derives an extension key from a Composer package name's last segment,
/// e.g. `vendor/ext-name` -> `ext_name`.
pub fn derive_key_from_package_name(name: &str) -> String {
    let last_segment = name.rsplit('/').next().unwrap_or(name);
    last_segment.replace('-', "_")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposerLock {
    #[serde(default)]
    pub packages: Vec<LockPackage>,
    #[serde(rename = "packages-dev", default)]
    pub packages_dev: Vec<LockPackage>,
}

impl ComposerLock {
    pub fn parse_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn read_from(path: &Path) -> Result<Self, ComposerError> {
        let content = std::fs::read_to_string(path).map_err(|e| ComposerError::Io(path.to_path_buf(), e))?;
        Self::parse_str(&content).map_err(|e| ComposerError::Json(path.to_path_buf(), e))
    }

    /// All packages (production and dev) whose type matches the given
    /// framework extension type prefix (e.g. `typo3-cms-`).
    pub fn framework_extensions<'a>(&'a self, framework_type_prefix: &'a str) -> impl Iterator<Item = &'a LockPackage> {
        self.packages
            .iter()
            .chain(self.packages_dev.iter())
            .filter(move |p| p.is_framework_extension(framework_type_prefix))
    }

    /// The locked version of a specific package, e.g. `typo3/cms-core`.
    pub fn version_of(&self, package_name: &str) -> Option<&str> {
        self.packages
            .iter()
            .chain(self.packages_dev.iter())
            .find(|p| p.name == package_name)
            .map(|p| p.version.as_str())
    }
}
