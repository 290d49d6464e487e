use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use cua_version::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionType {
    System,
    Local,
    Composer,
}

/// A discovered extension (plugin/module).
///
/// `key` is the canonical underscored identifier (`tt_address`), validated
/// against `^[a-z][a-z0-9_]*$` at construction time — see [`is_valid_key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extension {
    pub key: String,
    pub title: String,
    pub version: Version,
    pub extension_type: ExtensionType,
    pub composer_name: Option<String>,
    pub active: bool,
    pub em_configuration: Map<String, Value>,
}

impl Extension {
    /// Fails (returns `None`) if `key` or `composer_name` don't satisfy
    /// their respective invariants, so malformed entries never reach the
    /// rest of the pipeline rather than being discovered and silently
    /// violating the invariant later.
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        version: Version,
        extension_type: ExtensionType,
        composer_name: Option<String>,
        active: bool,
        em_configuration: Map<String, Value>,
    ) -> Option<Self> {
        let key = key.into();
        if !is_valid_key(&key) {
            return None;
        }
        if let Some(name) = &composer_name {
            if !is_valid_composer_name(name) {
                return None;
            }
        }

        Some(Self { key, title: title.into(), version, extension_type, composer_name, active, em_configuration })
    }

    pub fn identifier(&self) -> ExtensionIdentifier {
        ExtensionIdentifier {
            key: self.key.clone(),
            version: self.version.clone(),
            extension_type: self.extension_type,
            composer_name: self.composer_name.clone(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.extension_type == ExtensionType::System
    }
}

/// A thin query key for an extension, used by the path resolver and
/// analyzers without needing the full `Extension` value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionIdentifier {
    pub key: String,
    pub version: Version,
    pub extension_type: ExtensionType,
    pub composer_name: Option<String>,
}

/// `^[a-z][a-z0-9_]*$`
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// `<vendor>/<package>`, both non-empty, exactly one separator.
pub fn is_valid_composer_name(name: &str) -> bool {
    match name.split_once('/') {
        Some((vendor, package)) => !vendor.is_empty() && !package.is_empty() && !package.contains('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_keys() {
        assert!(is_valid_key("tt_address"));
        assert!(is_valid_key("news"));
        assert!(is_valid_key("a1"));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("Tt_address"));
        assert!(!is_valid_key("1news"));
        assert!(!is_valid_key("tt-address"));
    }

    #[test]
    fn validates_composer_name_shape() {
        assert!(is_valid_composer_name("friendsoftypo3/tt-address"));
        assert!(!is_valid_composer_name("tt-address"));
        assert!(!is_valid_composer_name("a/b/c"));
    }
}
