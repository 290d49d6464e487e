use std::collections::BTreeMap;

use serde_json::Map;

use crate::classify::classify;
use crate::extension::Extension;
use crate::views::LockExtensionView;
use crate::views::PackageStateExtensionView;

/// Merges the lock-file and package-state extension views into a single
/// list, following the precedence rule: the package-state entry wins for
/// `active` and local metadata (`title`, `emConfiguration`); the lock entry
/// wins for `composerName` and the canonical version. An extension present
/// in only one source is taken verbatim. Associative and idempotent: running
/// the merge again over its own output (paired with an empty second source)
/// reproduces it.
pub fn merge(lock: &[LockExtensionView], package_state: &[PackageStateExtensionView], vendor_dir: &str) -> Vec<Extension> {
    let mut by_key: BTreeMap<String, (Option<&LockExtensionView>, Option<&PackageStateExtensionView>)> = BTreeMap::new();

    for entry in lock {
        by_key.entry(entry.key.clone()).or_insert((None, None)).0 = Some(entry);
    }
    for entry in package_state {
        by_key.entry(entry.key.clone()).or_insert((None, None)).1 = Some(entry);
    }

    by_key
        .into_iter()
        .filter_map(|(key, (lock_entry, state_entry))| build_extension(&key, lock_entry, state_entry, vendor_dir))
        .collect()
}

fn build_extension(
    key: &str,
    lock_entry: Option<&LockExtensionView>,
    state_entry: Option<&PackageStateExtensionView>,
    vendor_dir: &str,
) -> Option<Extension> {
    let title = state_entry.map(|s| s.title.clone()).unwrap_or_else(|| key.to_owned());
    let active = state_entry.map(|s| s.active).unwrap_or(false);
    let em_configuration = state_entry.map(|s| s.em_configuration.clone()).unwrap_or_else(Map::new);
    let composer_name = lock_entry.map(|l| l.composer_name.clone());

    let version = match (lock_entry, state_entry) {
        (Some(lock), _) => lock.version.clone(),
        (None, Some(state)) => state.version.clone()?,
        (None, None) => return None,
    };

    let package_path = state_entry.map(|s| s.package_path.as_str());
    let extension_type = classify(package_path, lock_entry.is_some(), vendor_dir);

    Extension::new(key, title, version, extension_type, composer_name, active, em_configuration)
}
