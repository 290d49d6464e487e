use std::path::Path;

use serde_json::Map;

use cua_composer::ComposerLock;
use cua_config_parser::ParserRegistry;
use cua_version::Version;

use crate::views::LockExtensionView;
use crate::views::PackageStateExtensionView;

const FRAMEWORK_TYPE_PREFIX: &str = "typo3-cms-";

/// Reads `composer.lock` and derives one [`LockExtensionView`] per
/// framework extension package. A missing or unparseable lock file yields
/// an empty list and a warning, not a fatal error.
pub fn read_lock_views(lock_path: &Path) -> (Vec<LockExtensionView>, Vec<String>) {
    if !lock_path.exists() {
        return (vec![], vec![format!("lock file not found at {}", lock_path.display())]);
    }

    match ComposerLock::read_from(lock_path) {
        Ok(lock) => {
            let views = lock
                .framework_extensions(FRAMEWORK_TYPE_PREFIX)
                .filter_map(|package| {
                    Version::parse(&package.version).map(|version| LockExtensionView {
                        key: package.extension_key(),
                        composer_name: package.name.clone(),
                        version,
                    })
                })
                .collect();
            (views, vec![])
        }
        Err(error) => (vec![], vec![format!("failed to parse lock file: {error}")]),
    }
}

/// Reads `PackageStates.php`, then each referenced extension's
/// `ext_emconf.php`, deriving one [`PackageStateExtensionView`] per entry.
/// A single corrupt manifest is skipped with a warning; the rest proceed.
pub fn read_package_state_views(package_states_path: &Path, installation_path: &Path) -> (Vec<PackageStateExtensionView>, Vec<String>) {
    if !package_states_path.exists() {
        return (vec![], vec![format!("package state file not found at {}", package_states_path.display())]);
    }

    let registry = ParserRegistry::default();
    let result = registry.parse(package_states_path);
    if !result.success {
        return (vec![], result.errors.iter().map(|e| format!("failed to parse package states: {e}")).collect());
    }

    let mut warnings: Vec<String> = result.warnings;
    let Some(packages) = result.data.get("packages").and_then(|v| v.as_object()) else {
        warnings.push("package state file has no `packages` map".to_owned());
        return (vec![], warnings);
    };

    let mut views = Vec::new();
    for (key, entry) in packages {
        let Some(entry) = entry.as_object() else {
            warnings.push(format!("package state entry for '{key}' is not an object, skipping"));
            continue;
        };

        let package_path = entry.get("packagePath").and_then(|v| v.as_str()).unwrap_or_default().to_owned();
        let active = entry.get("state").and_then(|v| v.as_str()).is_some_and(|s| s == "active");

        let manifest_path = installation_path.join(&package_path).join("ext_emconf.php");
        let (title, version, em_configuration) = match read_manifest(&manifest_path, &registry) {
            Some(manifest) => manifest,
            None => {
                warnings.push(format!("could not read manifest for '{key}' at {}, skipping", manifest_path.display()));
                continue;
            }
        };

        views.push(PackageStateExtensionView { key: key.clone(), active, title, version, em_configuration, package_path });
    }

    (views, warnings)
}

fn read_manifest(manifest_path: &Path, registry: &ParserRegistry) -> Option<(String, Option<Version>, Map<String, serde_json::Value>)> {
    if !manifest_path.exists() {
        return None;
    }

    let result = registry.parse(manifest_path);
    if !result.success {
        return None;
    }

    let title = result.data.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_owned();
    let version = result.data.get("version").and_then(|v| v.as_str()).and_then(Version::parse);

    Some((title, version, result.data))
}
