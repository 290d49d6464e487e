use std::collections::BTreeMap;

use crate::installation::Installation;

/// Severity of a validation issue. Mirrors the error taxonomy's "synthetic
/// ERROR issues" framing (§4.1 policies) without being fatal to discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// One validation rule's finding against a discovered [`Installation`].
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub rule: String,
    pub severity: ValidationSeverity,
    pub message: String,
    pub category: String,
    pub context: BTreeMap<String, String>,
    pub affected_paths: Vec<String>,
    pub recommendations: Vec<String>,
}

/// A non-fatal sanity check over a discovered [`Installation`]. A failing
/// rule downgrades to an issue in the discovery result rather than
/// aborting discovery — by the time a rule runs, detection has already
/// succeeded.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, installation: &Installation) -> Option<ValidationIssue>;
}

/// A Composer-managed installation without its manifest alongside the lock
/// file is unusual enough to flag, even though the lock alone is enough to
/// proceed.
pub struct ComposerManifestPresentRule;

impl ValidationRule for ComposerManifestPresentRule {
    fn name(&self) -> &'static str {
        "composer-manifest-present"
    }

    fn validate(&self, installation: &Installation) -> Option<ValidationIssue> {
        if installation.is_composer_managed() && !installation.composer_json_path().is_file() {
            return Some(ValidationIssue {
                rule: self.name().to_owned(),
                severity: ValidationSeverity::Warning,
                message: "composer-managed installation has a lock file but no composer.json".to_owned(),
                category: "composer".to_owned(),
                context: BTreeMap::new(),
                affected_paths: vec![installation.composer_json_path().to_string_lossy().into_owned()],
                recommendations: vec!["add a composer.json alongside composer.lock so manifest-derived signals (require-dev, extra.*) are available".to_owned()],
            });
        }
        None
    }
}

/// A version detected from anything weaker than the lock or manifest
/// constraint is worth surfacing, since downstream risk scoring treats it
/// as less certain.
pub struct VersionReliabilityRule {
    pub minimum: f64,
}

impl Default for VersionReliabilityRule {
    fn default() -> Self {
        Self { minimum: 0.5 }
    }
}

impl ValidationRule for VersionReliabilityRule {
    fn name(&self) -> &'static str {
        "version-reliability"
    }

    fn validate(&self, installation: &Installation) -> Option<ValidationIssue> {
        if installation.version_reliability < self.minimum {
            let mut context = BTreeMap::new();
            context.insert("strategy".to_owned(), installation.version_strategy.clone());
            context.insert("reliability".to_owned(), format!("{:.1}", installation.version_reliability));
            context.insert("threshold".to_owned(), format!("{:.1}", self.minimum));

            return Some(ValidationIssue {
                rule: self.name().to_owned(),
                severity: ValidationSeverity::Warning,
                message: format!(
                    "core version {} was detected via '{}' (reliability {:.1}), below the {:.1} confidence threshold",
                    installation.version, installation.version_strategy, installation.version_reliability, self.minimum
                ),
                category: "version-detection".to_owned(),
                context,
                affected_paths: vec![installation.path.to_string_lossy().into_owned()],
                recommendations: vec!["confirm the detected core version manually, or provide a stronger version signal (composer.lock)".to_owned()],
            });
        }
        None
    }
}

pub fn default_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![Box::new(ComposerManifestPresentRule), Box::new(VersionReliabilityRule::default())]
}

pub fn run_rules(rules: &[Box<dyn ValidationRule>], installation: &Installation) -> Vec<ValidationIssue> {
    rules.iter().filter_map(|rule| rule.validate(installation)).collect()
}

#[cfg(test)]
mod tests {
    use cua_resolver::InstallationType;
    use cua_version::Version;

    use super::*;

    fn installation(version_reliability: f64, version_strategy: &str) -> Installation {
        Installation {
            path: std::env::temp_dir(),
            installation_type: InstallationType::Composer,
            version: Version::new(12, 4, 8),
            version_strategy: version_strategy.to_owned(),
            version_reliability,
            custom_paths: BTreeMap::new(),
            configurations: BTreeMap::new(),
            metadata: serde_json::Map::new(),
        }
    }

    #[test]
    fn flags_low_reliability_version_detection() {
        let rules = default_rules();
        let issues = run_rules(&rules, &installation(0.2, "partial-constant"));
        assert!(issues.iter().any(|issue| issue.rule == "version-reliability"));
        assert!(issues.iter().all(|issue| issue.severity == ValidationSeverity::Warning));
    }

    #[test]
    fn no_issues_for_a_high_confidence_composer_lock_detection() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("composer.json"), "{}").unwrap();
        let mut installation = installation(1.0, "composer-lock");
        installation.path = tmp.path().to_path_buf();

        let rules = default_rules();
        assert!(run_rules(&rules, &installation).is_empty());
    }
}
