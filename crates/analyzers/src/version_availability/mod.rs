mod client;

pub use client::GitAnalysis;
pub use client::GitHostClient;
pub use client::RegistryClient;
pub use client::UreqCommunityRegistryClient;
pub use client::UreqComposerRegistryClient;
pub use client::UreqGitHostClient;

use cua_analyzer_core::AnalysisContext;
use cua_analyzer_core::AnalysisResult;
use cua_analyzer_core::AnalyzerCapability;
use cua_analyzer_core::AnalyzerError;
use cua_inventory::Extension;

/// Checks whether an extension has an available release compatible with
/// the target core version, across up to three independent sources:
/// the community registry, the Composer registry, and (when a repository
/// URL is known) a git host. Each source is queried with its own timeout
/// and a source failure degrades the composite score rather than failing
/// the analyzer outright.
pub struct VersionAvailabilityAnalyzer {
    community_registry: Box<dyn RegistryClient>,
    composer_registry: Box<dyn RegistryClient>,
    git_host: Box<dyn GitHostClient>,
}

impl VersionAvailabilityAnalyzer {
    pub fn new(community_registry: Box<dyn RegistryClient>, composer_registry: Box<dyn RegistryClient>, git_host: Box<dyn GitHostClient>) -> Self {
        Self { community_registry, composer_registry, git_host }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct SourceOutcomes {
    community_available: Option<bool>,
    composer_available: Option<bool>,
    git: Option<(bool, f64)>,
}

impl AnalyzerCapability for VersionAvailabilityAnalyzer {
    fn name(&self) -> &str {
        "version-availability"
    }

    fn description(&self) -> &str {
        "Checks whether a compatible extension release exists for the target core version"
    }

    fn supports(&self, extension: &Extension) -> bool {
        !extension.is_system()
    }

    fn analyze(&self, extension: &Extension, context: &AnalysisContext) -> Result<AnalysisResult, AnalyzerError> {
        if extension.is_system() {
            return Ok(AnalysisResult::builder(self.name(), extension.clone())
                .risk_score(1.0)
                .recommendation("System extension; version availability is governed by core itself".to_owned())
                .metric("shortCircuited", serde_json::Value::Bool(true))
                .build());
        }

        let target = &context.target_version;
        let mut outcomes = SourceOutcomes::default();

        // The three sources are independent: a fixed fan-out of 3, run
        // concurrently rather than sequentially timing out one after another.
        let (community_result, (composer_result, git_outcome)) = rayon::join(
            || self.community_registry.has_version_for(&extension.key, target),
            || {
                rayon::join(
                    || extension.composer_name.as_deref().map(|name| self.composer_registry.has_version_for(name, target)),
                    || {
                        let url = extension.composer_name.as_deref().and_then(|name| self.composer_registry.repository_url(name).ok().flatten())?;
                        let analysis = self.git_host.analyze_extension(&url, target).ok()?;
                        Some((url, analysis))
                    },
                )
            },
        );

        outcomes.community_available = community_result.ok();
        outcomes.composer_available = composer_result.and_then(Result::ok);

        let repository_url = git_outcome.as_ref().map(|(url, _)| url.clone());

        if let Some((_, analysis)) = &git_outcome {
            outcomes.git = Some((analysis.has_compatible_version, analysis.health_score));
        }

        let (risk_score, recommendation) = score(&outcomes);

        let mut metrics = serde_json::Map::new();
        metrics.insert("communityAvailable".to_owned(), opt_bool_value(outcomes.community_available));
        metrics.insert("composerAvailable".to_owned(), opt_bool_value(outcomes.composer_available));
        metrics.insert("gitHasCompatibleVersion".to_owned(), opt_bool_value(outcomes.git.map(|(has, _)| has)));
        metrics.insert("gitHealthScore".to_owned(), outcomes.git.map_or(serde_json::Value::Null, |(_, health)| serde_json::json!(health)));
        if let Some(url) = &repository_url {
            metrics.insert("repositoryUrl".to_owned(), serde_json::Value::String(url.clone()));
        }

        Ok(AnalysisResult::builder(self.name(), extension.clone()).risk_score(risk_score).recommendation(recommendation).metrics(metrics).build())
    }
}

fn opt_bool_value(value: Option<bool>) -> serde_json::Value {
    value.map_or(serde_json::Value::Null, serde_json::Value::Bool)
}

/// `W = 4*T + 3*P + (G ? max(2*H, 1) : 0)`, mapped onto a risk band.
fn score(outcomes: &SourceOutcomes) -> (f64, String) {
    let t = f64::from(outcomes.community_available.unwrap_or(false));
    let p = f64::from(outcomes.composer_available.unwrap_or(false));
    let weight = 4.0 * t + 3.0 * p
        + match outcomes.git {
            Some((has_compatible, health)) if has_compatible => (2.0 * health).max(1.0),
            _ => 0.0,
        };

    let risk_score = if weight >= 6.0 {
        1.5
    } else if weight >= 4.0 {
        2.5
    } else if weight >= 2.0 {
        5.0
    } else if weight >= 1.0 {
        7.0
    } else {
        9.0
    };

    let recommendation = if risk_score <= 2.5 {
        "A compatible release is available; upgrade should be straightforward".to_owned()
    } else if risk_score <= 5.0 {
        "Partial evidence of a compatible release; verify manually before upgrading".to_owned()
    } else {
        "No compatible release found across the checked sources; budget time for a custom fork or replacement".to_owned()
    };

    (risk_score, recommendation)
}

#[cfg(test)]
mod tests {
    use cua_inventory::ExtensionType;
    use cua_version::Version;
    use serde_json::Map as JsonMap;

    use super::*;

    struct FixedRegistry(Result<bool, String>, Option<String>);

    impl RegistryClient for FixedRegistry {
        fn has_version_for(&self, _key: &str, _target: &Version) -> Result<bool, String> {
            self.0.clone()
        }

        fn repository_url(&self, _key: &str) -> Result<Option<String>, String> {
            Ok(self.1.clone())
        }
    }

    struct FixedGitHost(Result<GitAnalysis, String>);

    impl GitHostClient for FixedGitHost {
        fn analyze_extension(&self, _repository_url: &str, _target: &Version) -> Result<GitAnalysis, String> {
            self.0.clone()
        }
    }

    fn extension(extension_type: ExtensionType) -> Extension {
        Extension::new("news", "News", Version::new(11, 0, 0), extension_type, Some("georgringer/news".to_owned()), true, JsonMap::new()).unwrap()
    }

    fn context() -> AnalysisContext {
        AnalysisContext::new(Version::new(11, 0, 0), Version::new(12, 4, 0), "/tmp/installation")
    }

    #[test]
    fn system_extensions_short_circuit_to_low_risk() {
        let analyzer = VersionAvailabilityAnalyzer::new(
            Box::new(FixedRegistry(Ok(false), None)),
            Box::new(FixedRegistry(Ok(false), None)),
            Box::new(FixedGitHost(Err("unused".to_owned()))),
        );

        let result = analyzer.analyze(&extension(ExtensionType::System), &context()).unwrap();
        assert_eq!(result.risk_score, 1.0);
    }

    #[test]
    fn all_sources_positive_yields_the_lowest_risk_band() {
        let analyzer = VersionAvailabilityAnalyzer::new(
            Box::new(FixedRegistry(Ok(true), None)),
            Box::new(FixedRegistry(Ok(true), Some("https://github.com/georgringer/news".to_owned()))),
            Box::new(FixedGitHost(Ok(GitAnalysis { has_compatible_version: true, health_score: 1.0, url: None, latest_compatible_version: None }))),
        );

        let result = analyzer.analyze(&extension(ExtensionType::Composer), &context()).unwrap();
        assert_eq!(result.risk_score, 1.5);
    }

    #[test]
    fn no_source_evidence_yields_the_highest_risk_band() {
        let analyzer = VersionAvailabilityAnalyzer::new(
            Box::new(FixedRegistry(Ok(false), None)),
            Box::new(FixedRegistry(Ok(false), None)),
            Box::new(FixedGitHost(Err("no repository".to_owned()))),
        );

        let result = analyzer.analyze(&extension(ExtensionType::Composer), &context()).unwrap();
        assert_eq!(result.risk_score, 9.0);
    }

    #[test]
    fn a_single_strong_source_lands_in_the_middle_band() {
        let analyzer = VersionAvailabilityAnalyzer::new(
            Box::new(FixedRegistry(Ok(true), None)),
            Box::new(FixedRegistry(Ok(false), None)),
            Box::new(FixedGitHost(Err("no repository".to_owned()))),
        );

        let result = analyzer.analyze(&extension(ExtensionType::Composer), &context()).unwrap();
        assert_eq!(result.risk_score, 5.0);
    }
}
