//! Given an extension identifier and an installation's layout hints,
//! returns the canonical on-disk location of that extension under any
//! supported layout (including user-customized directory names).
//!
//! Deterministic and read-only: the same request against the same
//! filesystem snapshot always returns the same response, and resolution
//! never creates directories.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use cua_inventory::ExtensionIdentifier;

const DEFAULT_VENDOR_DIR: &str = "vendor";
const DEFAULT_WEB_DIR: &str = "public";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    Extension,
    Vendor,
    Web,
    Typo3conf,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationType {
    Composer,
    Legacy,
    AutoDetect,
}

#[derive(Debug, Clone, Default)]
pub struct PathConfiguration {
    pub custom_paths: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct PathResolutionRequest {
    pub installation_path: PathBuf,
    pub path_type: PathType,
    pub installation_type: InstallationType,
    pub path_configuration: PathConfiguration,
    pub extension_identifier: Option<ExtensionIdentifier>,
}

#[derive(Debug, Clone)]
pub struct PathResolutionResponse {
    pub success: bool,
    pub resolved_path: Option<PathBuf>,
    pub errors: Vec<String>,
}

impl PathResolutionResponse {
    fn ok(path: PathBuf) -> Self {
        Self { success: true, resolved_path: Some(path), errors: vec![] }
    }

    fn failed(errors: Vec<String>) -> Self {
        Self { success: false, resolved_path: None, errors }
    }
}

struct LayoutRoots {
    vendor_dir: String,
    web_dir: String,
    typo3conf_dir: String,
}

fn layout_roots(custom_paths: &BTreeMap<String, String>) -> LayoutRoots {
    let vendor_dir = custom_paths.get("vendor-dir").cloned().unwrap_or_else(|| DEFAULT_VENDOR_DIR.to_owned());
    let web_dir = custom_paths.get("web-dir").cloned().unwrap_or_else(|| DEFAULT_WEB_DIR.to_owned());
    let typo3conf_dir = custom_paths.get("typo3conf-dir").cloned().unwrap_or_else(|| format!("{web_dir}/typo3conf"));
    LayoutRoots { vendor_dir, web_dir, typo3conf_dir }
}

/// Whether the installation looks like a Composer-managed layout, probed
/// by the presence of a lock file versus a package-state file alone.
fn detect_installation_type(installation_path: &Path) -> InstallationType {
    if installation_path.join("composer.lock").exists() {
        InstallationType::Composer
    } else {
        InstallationType::Legacy
    }
}

pub fn resolve(request: &PathResolutionRequest) -> PathResolutionResponse {
    match request.path_type {
        PathType::Extension => resolve_extension(request),
        PathType::Vendor => resolve_simple(request, |roots, _| roots.vendor_dir.clone()),
        PathType::Web => resolve_simple(request, |roots, _| roots.web_dir.clone()),
        PathType::Typo3conf => resolve_simple(request, |roots, _| roots.typo3conf_dir.clone()),
        PathType::System => resolve_system(request),
    }
}

fn resolve_simple(request: &PathResolutionRequest, pick: impl Fn(&LayoutRoots, &PathResolutionRequest) -> String) -> PathResolutionResponse {
    let roots = layout_roots(&request.path_configuration.custom_paths);
    let relative = pick(&roots, request);
    PathResolutionResponse::ok(request.installation_path.join(relative))
}

fn resolve_system(request: &PathResolutionRequest) -> PathResolutionResponse {
    let roots = layout_roots(&request.path_configuration.custom_paths);
    let installation_type = effective_installation_type(request);

    match installation_type {
        InstallationType::Legacy | InstallationType::AutoDetect if request.installation_path.join("typo3/sysext").is_dir() => {
            PathResolutionResponse::ok(request.installation_path.join("typo3/sysext"))
        }
        _ => PathResolutionResponse::ok(request.installation_path.join(&roots.vendor_dir).join("typo3")),
    }
}

fn effective_installation_type(request: &PathResolutionRequest) -> InstallationType {
    match request.installation_type {
        InstallationType::AutoDetect => detect_installation_type(&request.installation_path),
        other => other,
    }
}

fn resolve_extension(request: &PathResolutionRequest) -> PathResolutionResponse {
    let Some(identifier) = &request.extension_identifier else {
        return PathResolutionResponse::failed(vec!["extension path resolution requires an extension identifier".to_owned()]);
    };

    let roots = layout_roots(&request.path_configuration.custom_paths);
    let key = &identifier.key;
    let key_with_hyphens = key.replace('_', "-");

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(composer_name) = &identifier.composer_name {
        candidates.push(request.installation_path.join(&roots.vendor_dir).join(composer_name));
    }
    candidates.push(request.installation_path.join(&roots.typo3conf_dir).join("ext").join(key));
    candidates.push(request.installation_path.join("typo3/sysext").join(key));
    candidates.push(request.installation_path.join(&roots.vendor_dir).join("typo3").join(format!("cms-{key_with_hyphens}")));
    candidates.push(request.installation_path.join(&roots.web_dir).join("typo3conf/ext").join(key));

    let mut tried = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let candidate_str = candidate.to_string_lossy().into_owned();
        if has_wildcard(&candidate_str) {
            if let Some(resolved) = first_glob_match(&candidate_str) {
                return PathResolutionResponse::ok(resolved);
            }
        } else if candidate.is_dir() {
            return PathResolutionResponse::ok(candidate);
        }
        tried.push(candidate_str);
    }

    PathResolutionResponse::failed(tried.into_iter().map(|c| format!("candidate not found: {c}")).collect())
}

fn has_wildcard(path: &str) -> bool {
    path.contains('*') || path.contains('?')
}

fn first_glob_match(pattern: &str) -> Option<PathBuf> {
    glob::glob(pattern).ok()?.filter_map(Result::ok).find(|p| p.is_dir())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use cua_inventory::ExtensionType;
    use cua_version::Version;

    use super::*;

    fn identifier(key: &str, composer_name: Option<&str>) -> ExtensionIdentifier {
        ExtensionIdentifier {
            key: key.to_owned(),
            version: Version::new(1, 0, 0),
            extension_type: ExtensionType::Composer,
            composer_name: composer_name.map(str::to_owned),
        }
    }

    #[test]
    fn prefers_vendor_path_when_both_candidates_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("vendor/georgringer/news")).unwrap();
        std::fs::create_dir_all(root.join("typo3conf/ext/news")).unwrap();

        let request = PathResolutionRequest {
            installation_path: root.to_path_buf(),
            path_type: PathType::Extension,
            installation_type: InstallationType::Composer,
            path_configuration: PathConfiguration::default(),
            extension_identifier: Some(identifier("news", Some("georgringer/news"))),
        };

        let response = resolve(&request);
        assert!(response.success);
        assert_eq!(response.resolved_path, Some(root.join("vendor/georgringer/news")));
    }

    #[test]
    fn falls_back_to_typo3conf_ext_when_no_composer_name() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("public/typo3conf/ext/my_ext")).unwrap();

        let request = PathResolutionRequest {
            installation_path: root.to_path_buf(),
            path_type: PathType::Extension,
            installation_type: InstallationType::Legacy,
            path_configuration: PathConfiguration::default(),
            extension_identifier: Some(identifier("my_ext", None)),
        };

        let response = resolve(&request);
        assert!(response.success);
        assert_eq!(response.resolved_path, Some(root.join("public/typo3conf/ext/my_ext")));
    }

    #[test]
    fn reports_all_tried_candidates_on_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let request = PathResolutionRequest {
            installation_path: tmp.path().to_path_buf(),
            path_type: PathType::Extension,
            installation_type: InstallationType::Legacy,
            path_configuration: PathConfiguration::default(),
            extension_identifier: Some(identifier("missing_ext", None)),
        };

        let response = resolve(&request);
        assert!(!response.success);
        assert!(!response.errors.is_empty());
    }
}
