use std::path::Path;

use tracing::warn;

use crate::extension::Extension;
use crate::loader::read_lock_views;
use crate::loader::read_package_state_views;
use crate::merge::merge;

/// The outcome of building the extension inventory: the merged list, plus
/// which of the two enumeration sources actually succeeded.
#[derive(Debug, Clone)]
pub struct ExtensionDiscoveryResult {
    pub successful: bool,
    pub extensions: Vec<Extension>,
    pub lock_source_used: bool,
    pub package_state_source_used: bool,
    pub warnings: Vec<String>,
}

/// Builds the extension inventory for an installation: reads the lock file
/// and the package-state file (each independently tolerant of being
/// missing or malformed), then merges the two views.
///
/// If both sources are missing or unparseable, returns `successful: true`
/// with an empty extension list and a logged warning, per §4.2's failure
/// semantics — this is not considered a fatal condition.
pub fn discover_extensions(installation_path: &Path, lock_path: &Path, package_states_path: &Path, vendor_dir: &str) -> ExtensionDiscoveryResult {
    let (lock_views, lock_warnings) = read_lock_views(lock_path);
    let (state_views, state_warnings) = read_package_state_views(package_states_path, installation_path);

    let mut warnings = Vec::new();
    warnings.extend(lock_warnings);
    warnings.extend(state_warnings);

    let lock_source_used = !lock_views.is_empty();
    let package_state_source_used = !state_views.is_empty();

    if !lock_source_used && !package_state_source_used {
        warnings.push("both extension enumeration sources are missing or empty; inventory is empty".to_owned());
        for warning in &warnings {
            warn!("{warning}");
        }
        return ExtensionDiscoveryResult { successful: true, extensions: vec![], lock_source_used, package_state_source_used, warnings };
    }

    for warning in &warnings {
        warn!("{warning}");
    }

    let extensions = merge(&lock_views, &state_views, vendor_dir);

    ExtensionDiscoveryResult { successful: true, extensions, lock_source_used, package_state_source_used, warnings }
}
