//! Parses and models `composer.lock` and `composer.json` files: the
//! authoritative sources for an installation's root version, its locked
//! extension packages, and (as a fallback) unresolved version constraints.

pub mod constraint;
pub mod error;
pub mod lock;
pub mod manifest;

pub use constraint::is_constraint_compatible;
pub use lock::ComposerLock;
pub use lock::LockPackage;
pub use lock::derive_key_from_package_name;
pub use manifest::ComposerManifest;
