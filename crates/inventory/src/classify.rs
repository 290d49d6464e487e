use crate::extension::ExtensionType;

/// Classifies an extension's type from whatever path information the
/// inventory sources provide.
///
/// - `system` iff the path contains the framework's system-extension
///   directory segment (`sysext/`).
/// - `composer` iff it originates from the lock file and the path lies
///   under the vendor directory (or no path is known at all yet, which is
///   the common case for a composer-only extension before path resolution
///   has run).
/// - `local` otherwise.
pub fn classify(package_path: Option<&str>, originates_from_lock: bool, vendor_dir: &str) -> ExtensionType {
    if let Some(path) = package_path {
        let normalized = path.replace('\\', "/");
        if normalized.contains("sysext/") {
            return ExtensionType::System;
        }
        if originates_from_lock && normalized.contains(&format!("{vendor_dir}/")) {
            return ExtensionType::Composer;
        }
        return ExtensionType::Local;
    }

    if originates_from_lock { ExtensionType::Composer } else { ExtensionType::Local }
}
