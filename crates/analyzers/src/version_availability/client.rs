use std::time::Duration;

use serde_json::Value;

use cua_composer::is_constraint_compatible;
use cua_version::Version;

/// One of the two JSON-over-HTTP registries queried by the
/// version-availability analyzer. Abstracted behind a trait so the live
/// `ureq`-backed implementation and a deterministic in-memory test double
/// share call sites.
pub trait RegistryClient: Send + Sync {
    fn has_version_for(&self, key: &str, target: &Version) -> Result<bool, String>;

    /// The package's source repository URL, when the registry's payload
    /// carries one. Only the composer registry does.
    fn repository_url(&self, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }
}

/// The outcome of the git-host compatibility check.
#[derive(Debug, Clone)]
pub struct GitAnalysis {
    pub has_compatible_version: bool,
    pub health_score: f64,
    pub url: Option<String>,
    pub latest_compatible_version: Option<String>,
}

pub trait GitHostClient: Send + Sync {
    fn analyze_extension(&self, repository_url: &str, target: &Version) -> Result<GitAnalysis, String>;
}

fn agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder().timeout_global(Some(timeout)).build();
    ureq::Agent::new_with_config(config)
}

/// The community extension registry: `GET /packages/<extKey>.json`.
pub struct UreqCommunityRegistryClient {
    pub host: String,
    pub timeout: Duration,
}

impl RegistryClient for UreqCommunityRegistryClient {
    fn has_version_for(&self, key: &str, target: &Version) -> Result<bool, String> {
        let url = format!("{}/packages/{key}.json", self.host);
        let json: Value = agent(self.timeout).get(&url).header("Accept", "application/json").call().map_err(|e| e.to_string())?.body_mut().read_json().map_err(|e| e.to_string())?;

        Ok(any_version_satisfies(&json, target))
    }
}

/// The composer package registry (`packagist.org`-shaped):
/// `GET /packages/<composerName>.json`.
pub struct UreqComposerRegistryClient {
    pub host: String,
    pub timeout: Duration,
}

impl RegistryClient for UreqComposerRegistryClient {
    fn has_version_for(&self, composer_name: &str, target: &Version) -> Result<bool, String> {
        let url = format!("{}/packages/{composer_name}.json", self.host);
        let json: Value = agent(self.timeout).get(&url).header("Accept", "application/json").call().map_err(|e| e.to_string())?.body_mut().read_json().map_err(|e| e.to_string())?;

        Ok(any_version_satisfies(&json, target))
    }

    fn repository_url(&self, composer_name: &str) -> Result<Option<String>, String> {
        let url = format!("{}/packages/{composer_name}.json", self.host);
        let json: Value = agent(self.timeout).get(&url).header("Accept", "application/json").call().map_err(|e| e.to_string())?.body_mut().read_json().map_err(|e| e.to_string())?;

        Ok(json.get("package").and_then(|p| p.get("repository")).and_then(Value::as_str).map(str::to_owned))
    }
}

/// Walks `package.versions`, treating each version entry's `require` map
/// as a Composer constraint set; compatible iff its `typo3/cms-core`
/// constraint (if any) is satisfied by `target`.
fn any_version_satisfies(package_json: &Value, target: &Version) -> bool {
    let Some(versions) = package_json.get("package").and_then(|p| p.get("versions")).and_then(Value::as_object) else {
        return false;
    };

    versions.values().any(|entry| match entry.get("require").and_then(|r| r.get("typo3/cms-core")).and_then(Value::as_str) {
        Some(constraint) => is_constraint_compatible(constraint, target),
        None => false,
    })
}

/// Resolves a GitHub `owner/repo` repository and checks its tags for a
/// release matching `target`'s major.minor. `health_score` is a simple
/// tag-count-based heuristic — the specification leaves its computation
/// unspecified beyond the `[0,1]` range.
pub struct UreqGitHostClient {
    pub timeout: Duration,
}

impl GitHostClient for UreqGitHostClient {
    fn analyze_extension(&self, repository_url: &str, target: &Version) -> Result<GitAnalysis, String> {
        let Some((owner, repo)) = parse_github_repository(repository_url) else {
            return Ok(GitAnalysis { has_compatible_version: false, health_score: 0.0, url: Some(repository_url.to_owned()), latest_compatible_version: None });
        };

        let url = format!("https://api.github.com/repos/{owner}/{repo}/tags");
        let tags: Vec<Value> = agent(self.timeout)
            .get(&url)
            .header("User-Agent", "cms-upgrade-analyzer")
            .header("Accept", "application/vnd.github.v3+json")
            .call()
            .map_err(|e| e.to_string())?
            .body_mut()
            .read_json()
            .map_err(|e| e.to_string())?;

        let mut latest_compatible: Option<Version> = None;
        for tag in &tags {
            let Some(name) = tag.get("name").and_then(Value::as_str) else { continue };
            let Some(version) = Version::parse(name) else { continue };
            if version.major_minor() == target.major_minor() && latest_compatible.as_ref().is_none_or(|current| version > *current) {
                latest_compatible = Some(version);
            }
        }

        Ok(GitAnalysis {
            has_compatible_version: latest_compatible.is_some(),
            health_score: (tags.len() as f64 / 10.0).min(1.0),
            url: Some(repository_url.to_owned()),
            latest_compatible_version: latest_compatible.map(|v| v.to_string()),
        })
    }
}

fn parse_github_repository(url: &str) -> Option<(String, String)> {
    let trimmed = url.trim_end_matches(".git").trim_end_matches('/');
    let after_host = trimmed.split("github.com").nth(1)?;
    let mut segments = after_host.trim_start_matches(['/', ':']).split('/');
    let owner = segments.next()?.to_owned();
    let repo = segments.next()?.to_owned();
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner, repo))
}
