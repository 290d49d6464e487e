use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use walkdir::WalkDir;

use cua_config_parser::ParseResult;
use cua_config_parser::ParserRegistry;

const DEFAULT_MAX_DEPTH: usize = 6;
const DEFAULT_MAX_FILES: usize = 500;

/// One parsed configuration file, alongside its path relative to the
/// installation root and the stable identifier Configuration Discovery
/// assigns it (§4.4).
#[derive(Debug, Clone)]
pub struct DiscoveredConfiguration {
    pub identifier: String,
    pub relative_path: PathBuf,
    pub result: ParseResult,
}

/// Walks an installation's well-known configuration locations (legacy
/// `typo3conf/`, `config/*.php`, `config/Services.yaml`,
/// `config/sites/*/config.yaml`, and extension-local
/// `Configuration/Services.yaml`), bounded by depth and file count so a
/// pathological checkout can't stall discovery, and parses every file a
/// registered parser recognizes.
pub struct ConfigurationDiscovery {
    registry: ParserRegistry,
    max_depth: usize,
    max_files: usize,
}

impl Default for ConfigurationDiscovery {
    fn default() -> Self {
        Self { registry: ParserRegistry::default(), max_depth: DEFAULT_MAX_DEPTH, max_files: DEFAULT_MAX_FILES }
    }
}

impl ConfigurationDiscovery {
    pub fn discover(&self, installation_path: &Path) -> Vec<DiscoveredConfiguration> {
        let mut discovered = Vec::new();
        let mut seen = BTreeSet::new();

        for root in [installation_path.join("typo3conf"), installation_path.join("config")] {
            self.walk_root(installation_path, &root, &mut discovered, &mut seen);
        }

        // Extension-local `Configuration/Services.yaml` can live anywhere
        // under the installation (vendor packages, `typo3conf/ext/*`); a
        // third walk from the root catches what the two well-known trees
        // above miss, still bounded by the shared caps.
        self.walk_root(installation_path, installation_path, &mut discovered, &mut seen);

        discovered
    }

    fn walk_root(&self, installation_path: &Path, root: &Path, discovered: &mut Vec<DiscoveredConfiguration>, seen: &mut BTreeSet<PathBuf>) {
        if !root.is_dir() {
            return;
        }

        for entry in WalkDir::new(root).max_depth(self.max_depth).into_iter().filter_map(Result::ok) {
            if discovered.len() >= self.max_files {
                debug!("configuration discovery hit its {} file cap under {}", self.max_files, root.display());
                break;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative_path = path.strip_prefix(installation_path).unwrap_or(path).to_path_buf();
            if !seen.insert(relative_path.clone()) {
                continue;
            }

            let Some(parser) = self.registry.parser_for(path) else { continue };
            let result = parser.parse_file(path);
            let identifier = derive_identifier(&relative_path);
            discovered.push(DiscoveredConfiguration { identifier, relative_path, result });
        }
    }
}

/// Assigns the stable identifier Configuration Discovery uses to key
/// `Installation.configurations` (§4.4): `Site.<siteName>` for
/// `config/sites/<siteName>/config.yaml`, `Services.<extKey>` for
/// extension-local `<extKey>/Configuration/Services.yaml`, and the bare
/// filename otherwise.
fn derive_identifier(relative_path: &Path) -> String {
    let components: Vec<String> = relative_path.iter().map(|part| part.to_string_lossy().into_owned()).collect();
    let file_name = relative_path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    if file_name == "config.yaml" {
        if let Some(sites_index) = components.iter().position(|c| c == "sites") {
            if let Some(site_name) = components.get(sites_index + 1) {
                return format!("Site.{site_name}");
            }
        }
    }

    if file_name == "Services.yaml" && components.len() >= 3 {
        let parent = &components[components.len() - 2];
        if parent == "Configuration" {
            let grandparent = &components[components.len() - 3];
            if grandparent != "config" {
                return format!("Services.{grandparent}");
            }
        }
    }

    file_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_and_parses_recognized_configuration_files() {
        let tmp = tempfile::tempdir().unwrap();
        let conf_dir = tmp.path().join("typo3conf");
        std::fs::create_dir_all(conf_dir.join("ext/news/Configuration")).unwrap();
        std::fs::write(conf_dir.join("ext/news/Configuration/Services.yaml"), "services: {}\n").unwrap();
        std::fs::write(conf_dir.join("ext/news/README.md"), "not a config file").unwrap();

        let discovered = ConfigurationDiscovery::default().discover(tmp.path());
        assert_eq!(discovered.len(), 1);
        assert!(discovered[0].result.success);
        assert_eq!(discovered[0].identifier, "Services.news");
    }

    #[test]
    fn returns_empty_when_nothing_is_present() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(ConfigurationDiscovery::default().discover(tmp.path()).is_empty());
    }

    #[test]
    fn discovers_root_and_site_configuration() {
        let tmp = tempfile::tempdir().unwrap();
        let config_dir = tmp.path().join("config");
        std::fs::create_dir_all(config_dir.join("sites/main")).unwrap();
        std::fs::write(config_dir.join("Services.yaml"), "services: {}\n").unwrap();
        std::fs::write(config_dir.join("sites/main/config.yaml"), "base: /\n").unwrap();

        let discovered = ConfigurationDiscovery::default().discover(tmp.path());
        let identifiers: BTreeSet<String> = discovered.iter().map(|d| d.identifier.clone()).collect();
        assert!(identifiers.contains("Services.yaml"));
        assert!(identifiers.contains("Site.main"));
    }
}
