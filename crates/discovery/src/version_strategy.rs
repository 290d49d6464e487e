use std::path::Path;

use regex::Regex;

use cua_composer::ComposerLock;
use cua_composer::ComposerManifest;
use cua_config_parser::ConfigurationParser;
use cua_config_parser::PhpArrayParser;
use cua_version::Version;

const CORE_PACKAGE_NAME: &str = "typo3/cms-core";

/// A candidate source of the installation's core version, ranked by
/// `reliability` so the discovery pass can prefer the strongest signal
/// and fall back when it's absent.
pub trait VersionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn reliability(&self) -> f64;
    fn detect(&self, installation_path: &Path) -> Option<Version>;
}

/// One strategy's attempt, win or lose, kept for the discovery result's
/// `attemptedStrategies` surface (§6.5).
#[derive(Debug, Clone)]
pub struct AttemptedVersionDetection {
    pub strategy: &'static str,
    pub reliability: f64,
    pub supported: bool,
    pub version: Option<Version>,
}

/// The locked, resolved version: as authoritative as it gets.
pub struct ComposerLockVersionStrategy;

impl VersionStrategy for ComposerLockVersionStrategy {
    fn name(&self) -> &'static str {
        "composer-lock"
    }

    fn reliability(&self) -> f64 {
        1.0
    }

    fn detect(&self, installation_path: &Path) -> Option<Version> {
        let lock = ComposerLock::read_from(&installation_path.join("composer.lock")).ok()?;
        Version::parse(lock.version_of(CORE_PACKAGE_NAME)?)
    }
}

/// An unresolved constraint (`^12.4`) only narrows to a major/minor pair,
/// with patch assumed `0` — considerably weaker than a lock entry.
pub struct ComposerJsonConstraintVersionStrategy;

impl VersionStrategy for ComposerJsonConstraintVersionStrategy {
    fn name(&self) -> &'static str {
        "composer-json-constraint"
    }

    fn reliability(&self) -> f64 {
        0.6
    }

    fn detect(&self, installation_path: &Path) -> Option<Version> {
        let manifest = ComposerManifest::read_from(&installation_path.join("composer.json")).ok()?;
        parse_constraint_major_minor(manifest.constraint_for(CORE_PACKAGE_NAME)?)
    }
}

fn parse_constraint_major_minor(constraint: &str) -> Option<Version> {
    let pattern = Regex::new(r"(\d+)\.(\d+)").expect("static regex is valid");
    let captures = pattern.captures(constraint)?;
    let major = captures.get(1)?.as_str().parse().ok()?;
    let minor = captures.get(2)?.as_str().parse().ok()?;
    Some(Version::new(major, minor, 0))
}

/// `typo3conf/PackageStates.php` records the active core package's own
/// version field in legacy (non-Composer) installations.
pub struct PackageStatesCoreVersionStrategy;

impl VersionStrategy for PackageStatesCoreVersionStrategy {
    fn name(&self) -> &'static str {
        "package-states-core"
    }

    fn reliability(&self) -> f64 {
        0.4
    }

    fn detect(&self, installation_path: &Path) -> Option<Version> {
        let path = installation_path.join("typo3conf/PackageStates.php");
        let result = PhpArrayParser.parse_file(&path);
        if !result.success {
            return None;
        }

        let version_str = result.data.get("packages")?.get("core")?.get("version")?.as_str()?;
        Version::parse(version_str)
    }
}

/// Last resort: grep the core's own `Typo3Version` class for its hardcoded
/// version constant. Brittle (no parsing, just a pattern match over a
/// known file), but it's the only signal available once a legacy
/// installation is stripped of `PackageStates.php` metadata.
pub struct PartialConstantVersionStrategy;

const CANDIDATE_FILES: &[&str] = &["typo3/sysext/core/Classes/Information/Typo3Version.php", "typo3_src/typo3/sysext/core/Classes/Information/Typo3Version.php"];

impl VersionStrategy for PartialConstantVersionStrategy {
    fn name(&self) -> &'static str {
        "partial-constant"
    }

    fn reliability(&self) -> f64 {
        0.2
    }

    fn detect(&self, installation_path: &Path) -> Option<Version> {
        let pattern = Regex::new(r"version\s*=\s*'([\d.]+)'").expect("static regex is valid");
        for candidate in CANDIDATE_FILES {
            let full_path = installation_path.join(candidate);
            let Ok(content) = std::fs::read_to_string(&full_path) else { continue };
            if let Some(captures) = pattern.captures(&content) {
                if let Some(version) = Version::parse(captures.get(1)?.as_str()) {
                    return Some(version);
                }
            }
        }
        None
    }
}

pub fn default_strategies() -> Vec<Box<dyn VersionStrategy>> {
    vec![
        Box::new(ComposerLockVersionStrategy),
        Box::new(ComposerJsonConstraintVersionStrategy),
        Box::new(PackageStatesCoreVersionStrategy),
        Box::new(PartialConstantVersionStrategy),
    ]
}

/// Runs `strategies` in descending reliability order, returning every
/// attempt alongside the winner (if any).
pub fn detect_version(strategies: &[Box<dyn VersionStrategy>], installation_path: &Path) -> (Vec<AttemptedVersionDetection>, Option<(&'static str, f64, Version)>) {
    let mut ordered: Vec<&Box<dyn VersionStrategy>> = strategies.iter().collect();
    ordered.sort_by(|a, b| b.reliability().total_cmp(&a.reliability()));

    let mut attempts = Vec::with_capacity(ordered.len());
    let mut winner = None;

    for strategy in ordered {
        let version = strategy.detect(installation_path);
        attempts.push(AttemptedVersionDetection { strategy: strategy.name(), reliability: strategy.reliability(), supported: version.is_some(), version: version.clone() });
        if winner.is_none() {
            if let Some(version) = version {
                winner = Some((strategy.name(), strategy.reliability(), version));
            }
        }
    }

    (attempts, winner)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn prefers_composer_lock_over_constraint() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("composer.lock"), r#"{"packages":[{"name":"typo3/cms-core","version":"12.4.8"}]}"#).unwrap();
        std::fs::write(tmp.path().join("composer.json"), r#"{"require":{"typo3/cms-core":"^11.5"}}"#).unwrap();

        let strategies = default_strategies();
        let (attempts, winner) = detect_version(&strategies, tmp.path());
        let (name, reliability, version) = winner.unwrap();
        assert_eq!(name, "composer-lock");
        assert_eq!(reliability, 1.0);
        assert_eq!(version, Version::new(12, 4, 8));
        assert_eq!(attempts.len(), 4);
    }

    #[test]
    fn falls_back_to_constraint_when_lock_absent() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("composer.json"), r#"{"require":{"typo3/cms-core":"^12.4"}}"#).unwrap();

        let strategies = default_strategies();
        let (_, winner) = detect_version(&strategies, tmp.path());
        let (name, _, version) = winner.unwrap();
        assert_eq!(name, "composer-json-constraint");
        assert_eq!(version, Version::new(12, 4, 0));
    }

    #[test]
    fn falls_back_to_package_states_in_legacy_installations() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("typo3conf")).unwrap();
        std::fs::write(
            tmp.path().join("typo3conf/PackageStates.php"),
            "<?php return ['packages' => ['core' => ['state' => 'active', 'version' => '11.5.30']]];",
        )
        .unwrap();

        let strategies = default_strategies();
        let (_, winner) = detect_version(&strategies, tmp.path());
        let (name, _, version) = winner.unwrap();
        assert_eq!(name, "package-states-core");
        assert_eq!(version, Version::new(11, 5, 30));
    }

    #[test]
    fn returns_none_when_no_strategy_detects_anything() {
        let tmp = tempfile::tempdir().unwrap();
        let strategies = default_strategies();
        let (attempts, winner) = detect_version(&strategies, tmp.path());
        assert!(winner.is_none());
        assert!(attempts.iter().all(|a| !a.supported));
    }
}
