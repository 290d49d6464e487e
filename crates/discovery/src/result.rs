use std::path::Path;

use tracing::info;
use tracing::warn;

use crate::configuration::ConfigurationDiscovery;
use crate::detection;
use crate::installation::Installation;
use crate::validation;
use crate::validation::ValidationIssue;
use crate::version_strategy;

/// One strategy's attempt, win or lose, in the shape the reporter
/// consumes (§6.5): `{strategy, supported, result|reason, priority,
/// reliability?}`. `priority` is a detection strategy's registered
/// priority, or a version strategy's reliability rescaled to the same
/// integer space, so both strategy families share one surface.
#[derive(Debug, Clone)]
pub struct AttemptedStrategy {
    pub strategy: String,
    pub supported: bool,
    pub result: Option<String>,
    pub reason: Option<String>,
    pub priority: u32,
    pub reliability: Option<f64>,
}

impl From<&detection::AttemptedDetection> for AttemptedStrategy {
    fn from(attempt: &detection::AttemptedDetection) -> Self {
        Self {
            strategy: attempt.strategy.to_owned(),
            supported: attempt.supported,
            result: attempt.installation_type.map(|installation_type| format!("{installation_type:?}")),
            reason: (!attempt.supported).then(|| "required indicators missing".to_owned()),
            priority: attempt.priority,
            reliability: None,
        }
    }
}

impl From<&version_strategy::AttemptedVersionDetection> for AttemptedStrategy {
    fn from(attempt: &version_strategy::AttemptedVersionDetection) -> Self {
        Self {
            strategy: attempt.strategy.to_owned(),
            supported: attempt.supported,
            result: attempt.version.as_ref().map(ToString::to_string),
            reason: (!attempt.supported).then(|| "no version signal found".to_owned()),
            priority: (attempt.reliability * 100.0).round() as u32,
            reliability: Some(attempt.reliability),
        }
    }
}

/// The outcome of running installation discovery against one path.
#[derive(Debug)]
pub struct InstallationDiscoveryResult {
    pub successful: bool,
    pub installation: Option<Installation>,
    pub validation_issues: Vec<ValidationIssue>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub attempted_strategies: Vec<AttemptedStrategy>,
}

impl InstallationDiscoveryResult {
    fn failure(error: String, attempted_strategies: Vec<AttemptedStrategy>) -> Self {
        Self { successful: false, installation: None, validation_issues: Vec::new(), warnings: Vec::new(), errors: vec![error], attempted_strategies }
    }
}

/// Runs the full discovery pass: management-style detection, version
/// detection, configuration-file discovery, and validation. A failure to
/// determine either the management style or the version is fatal — every
/// downstream module needs both.
pub fn discover(installation_path: &Path) -> InstallationDiscoveryResult {
    if !installation_path.is_dir() {
        return InstallationDiscoveryResult::failure(
            format!("installation path '{}' does not exist or is not a directory", installation_path.display()),
            Vec::new(),
        );
    }

    let detection_strategies = detection::default_strategies();
    let (detection_attempts, detection_winner) = detection::detect_installation_type(&detection_strategies, installation_path);
    let mut attempted_strategies: Vec<AttemptedStrategy> = detection_attempts.iter().map(AttemptedStrategy::from).collect();

    let Some((detection_strategy_name, installation_type)) = detection_winner else {
        return InstallationDiscoveryResult::failure(
            "could not determine installation management style (no composer.lock or typo3conf/PackageStates.php found)".to_owned(),
            attempted_strategies,
        );
    };
    info!("detected installation type {installation_type:?} via '{detection_strategy_name}'");

    let version_strategies = version_strategy::default_strategies();
    let (version_attempts, version_winner) = version_strategy::detect_version(&version_strategies, installation_path);
    attempted_strategies.extend(version_attempts.iter().map(AttemptedStrategy::from));

    let Some((version_strategy_name, reliability, version)) = version_winner else {
        return InstallationDiscoveryResult::failure("could not determine the installation's core version from any available source".to_owned(), attempted_strategies);
    };
    info!("detected core version {version} via '{version_strategy_name}' (reliability {reliability})");

    // Configuration Discovery runs before the Installation is assembled:
    // its output belongs on the Installation itself, not bolted on
    // afterward. A failure here is logged and downgrades to best-effort,
    // never failing the discovery (§4.1 step 5).
    let configurations = ConfigurationDiscovery::default()
        .discover(installation_path)
        .into_iter()
        .map(|configuration| (configuration.identifier.clone(), configuration))
        .collect();

    let mut metadata = serde_json::Map::new();
    metadata.insert("version_strategy".to_owned(), serde_json::Value::String(version_strategy_name.to_owned()));
    metadata.insert("version_reliability".to_owned(), serde_json::json!(reliability));

    let installation = Installation {
        path: installation_path.to_path_buf(),
        installation_type,
        version,
        version_strategy: version_strategy_name.to_owned(),
        version_reliability: reliability,
        custom_paths: std::collections::BTreeMap::new(),
        configurations,
        metadata,
    };

    let rules = validation::default_rules();
    let validation_issues = validation::run_rules(&rules, &installation);
    let warnings: Vec<String> = validation_issues.iter().map(|issue| issue.message.clone()).collect();
    for warning in &warnings {
        warn!("{warning}");
    }

    InstallationDiscoveryResult { successful: true, installation: Some(installation), validation_issues, warnings, errors: Vec::new(), attempted_strategies }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use cua_version::Version;

    use super::*;

    #[test]
    fn discovers_a_composer_managed_installation() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("composer.lock"), r#"{"packages":[{"name":"typo3/cms-core", "version":"12.4.8"}]}"#).unwrap();
        std::fs::write(tmp.path().join("composer.json"), r#"{"require":{"typo3/cms-core":"^12.4"}}"#).unwrap();

        let result = discover(tmp.path());
        assert!(result.successful);
        let installation = result.installation.unwrap();
        assert_eq!(installation.version, Version::new(12, 4, 8));
        assert!(result.warnings.is_empty());
        assert!(result.validation_issues.is_empty());
        assert!(!result.attempted_strategies.is_empty());
    }

    #[test]
    fn fails_when_nothing_identifies_the_installation() {
        let tmp = tempfile::tempdir().unwrap();
        let result = discover(tmp.path());
        assert!(!result.successful);
        assert!(!result.errors.is_empty());
        assert!(!result.attempted_strategies.is_empty());
        assert!(result.attempted_strategies.iter().all(|attempt| !attempt.supported));
    }

    #[test]
    fn fails_for_a_nonexistent_path() {
        let result = discover(Path::new("/no/such/installation"));
        assert!(!result.successful);
        assert!(result.attempted_strategies.is_empty());
    }
}
