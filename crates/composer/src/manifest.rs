use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ComposerError;

/// A `composer.json` manifest, reduced to the fields this system consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposerManifest {
    #[serde(default)]
    pub require: BTreeMap<String, String>,
    #[serde(rename = "require-dev", default)]
    pub require_dev: BTreeMap<String, String>,
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl ComposerManifest {
    pub fn parse_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn read_from(path: &Path) -> Result<Self, ComposerError> {
        let content = std::fs::read_to_string(path).map_err(|e| ComposerError::Io(path.to_path_buf(), e))?;
        Self::parse_str(&content).map_err(|e| ComposerError::Json(path.to_path_buf(), e))
    }

    /// The raw version constraint string for a required package, if present
    /// in either `require` or `require-dev`.
    pub fn constraint_for(&self, package_name: &str) -> Option<&str> {
        self.require.get(package_name).or_else(|| self.require_dev.get(package_name)).map(String::as_str)
    }

    /// Custom path overrides under `extra.cms-upgrade-analyzer.paths`, layered
    /// on top of the defaults the path resolver falls back to.
    pub fn custom_paths(&self) -> BTreeMap<String, String> {
        self.extra
            .get("cms-upgrade-analyzer")
            .and_then(|v| v.get("paths"))
            .and_then(|v| v.as_object())
            .map(|map| {
                map.iter().filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_owned()))).collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_require_constraint() {
        let manifest = ComposerManifest::parse_str(r#"{"require": {"typo3/cms-core": "^12.4"}}"#).unwrap();
        assert_eq!(manifest.constraint_for("typo3/cms-core"), Some("^12.4"));
    }

    #[test]
    fn reads_custom_paths_from_extra() {
        let manifest = ComposerManifest::parse_str(
            r#"{"require": {}, "extra": {"cms-upgrade-analyzer": {"paths": {"web-dir": "web"}}}}"#,
        )
        .unwrap();

        assert_eq!(manifest.custom_paths().get("web-dir").map(String::as_str), Some("web"));
    }
}
