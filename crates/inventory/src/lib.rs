//! Merges the lock-file and package-state extension enumerations into one
//! authoritative inventory, with provenance tracking of which source(s)
//! actually contributed.

mod cache;
mod classify;
mod extension;
mod loader;
mod merge;
mod result;
mod views;

pub use cache::discover_extensions_cached;
pub use extension::Extension;
pub use extension::ExtensionIdentifier;
pub use extension::ExtensionType;
pub use extension::is_valid_composer_name;
pub use extension::is_valid_key;
pub use merge::merge;
pub use result::ExtensionDiscoveryResult;
pub use result::discover_extensions;
pub use views::LockExtensionView;
pub use views::PackageStateExtensionView;
