use std::path::Path;

use cua_resolver::InstallationType;

/// Probes an installation path for one management style. Strategies are
/// tried in descending `priority` order; the first to return `Some` wins.
pub trait DiscoveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn priority(&self) -> u32;
    fn detect(&self, installation_path: &Path) -> Option<InstallationType>;
}

/// One strategy's attempt, win or lose, kept for the discovery result's
/// `attemptedStrategies` surface (§6.5).
#[derive(Debug, Clone)]
pub struct AttemptedDetection {
    pub strategy: &'static str,
    pub priority: u32,
    pub supported: bool,
    pub installation_type: Option<InstallationType>,
}

/// A `composer.lock` at the installation root is the strongest signal:
/// Composer owns the dependency graph and (usually) the locked core
/// version too.
pub struct ComposerDetectionStrategy;

impl DiscoveryStrategy for ComposerDetectionStrategy {
    fn name(&self) -> &'static str {
        "composer-detection"
    }

    fn priority(&self) -> u32 {
        100
    }

    fn detect(&self, installation_path: &Path) -> Option<InstallationType> {
        installation_path.join("composer.lock").is_file().then_some(InstallationType::Composer)
    }
}

/// A `typo3conf/PackageStates.php` without a lock file is the classic
/// non-Composer layout.
pub struct LegacyDetectionStrategy;

impl DiscoveryStrategy for LegacyDetectionStrategy {
    fn name(&self) -> &'static str {
        "legacy-detection"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn detect(&self, installation_path: &Path) -> Option<InstallationType> {
        installation_path.join("typo3conf/PackageStates.php").is_file().then_some(InstallationType::Legacy)
    }
}

pub fn default_strategies() -> Vec<Box<dyn DiscoveryStrategy>> {
    vec![Box::new(ComposerDetectionStrategy), Box::new(LegacyDetectionStrategy)]
}

/// Runs `strategies` in descending priority order, returning every attempt
/// alongside the winner (if any) so callers can report the full attempt
/// history, not just what succeeded.
pub fn detect_installation_type(strategies: &[Box<dyn DiscoveryStrategy>], installation_path: &Path) -> (Vec<AttemptedDetection>, Option<(&'static str, InstallationType)>) {
    let mut ordered: Vec<&Box<dyn DiscoveryStrategy>> = strategies.iter().collect();
    ordered.sort_by_key(|s| std::cmp::Reverse(s.priority()));

    let mut attempts = Vec::with_capacity(ordered.len());
    let mut winner = None;

    for strategy in ordered {
        let detected = strategy.detect(installation_path);
        attempts.push(AttemptedDetection { strategy: strategy.name(), priority: strategy.priority(), supported: detected.is_some(), installation_type: detected });
        if winner.is_none() {
            if let Some(detected) = detected {
                winner = Some((strategy.name(), detected));
            }
        }
    }

    (attempts, winner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composer_strategy_outranks_legacy_when_both_match() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("composer.lock"), "{}").unwrap();
        std::fs::create_dir_all(tmp.path().join("typo3conf")).unwrap();
        std::fs::write(tmp.path().join("typo3conf/PackageStates.php"), "<?php return [];").unwrap();

        let strategies = default_strategies();
        let (attempts, winner) = detect_installation_type(&strategies, tmp.path());
        let (name, detected) = winner.unwrap();
        assert_eq!(name, "composer-detection");
        assert_eq!(detected, InstallationType::Composer);
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().all(|a| a.supported));
    }

    #[test]
    fn falls_back_to_legacy_without_a_lock_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("typo3conf")).unwrap();
        std::fs::write(tmp.path().join("typo3conf/PackageStates.php"), "<?php return [];").unwrap();

        let strategies = default_strategies();
        let (attempts, winner) = detect_installation_type(&strategies, tmp.path());
        let (name, detected) = winner.unwrap();
        assert_eq!(name, "legacy-detection");
        assert_eq!(detected, InstallationType::Legacy);
        assert!(attempts.iter().find(|a| a.strategy == "composer-detection").unwrap().supported.eq(&false));
    }

    #[test]
    fn detects_nothing_on_an_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let strategies = default_strategies();
        let (attempts, winner) = detect_installation_type(&strategies, tmp.path());
        assert!(winner.is_none());
        assert_eq!(attempts.len(), 2);
        assert!(attempts.iter().all(|a| !a.supported));
    }
}
