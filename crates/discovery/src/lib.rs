//! Detects how an installation is managed (Composer vs. legacy) and what
//! framework version it's running, then assembles the [`Installation`]
//! record the rest of the pipeline is built against.

mod configuration;
mod detection;
mod installation;
mod result;
mod validation;
mod version_strategy;

pub use configuration::ConfigurationDiscovery;
pub use configuration::DiscoveredConfiguration;
pub use detection::AttemptedDetection;
pub use detection::ComposerDetectionStrategy;
pub use detection::DiscoveryStrategy;
pub use detection::LegacyDetectionStrategy;
pub use installation::Installation;
pub use result::AttemptedStrategy;
pub use result::InstallationDiscoveryResult;
pub use result::discover;
pub use validation::ValidationIssue;
pub use validation::ValidationRule;
pub use validation::ValidationSeverity;
pub use version_strategy::AttemptedVersionDetection;
pub use version_strategy::ComposerJsonConstraintVersionStrategy;
pub use version_strategy::ComposerLockVersionStrategy;
pub use version_strategy::PackageStatesCoreVersionStrategy;
pub use version_strategy::PartialConstantVersionStrategy;
pub use version_strategy::VersionStrategy;
