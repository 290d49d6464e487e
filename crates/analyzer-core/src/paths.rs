use std::path::PathBuf;

use cua_inventory::Extension;
use cua_resolver::InstallationType;
use cua_resolver::PathConfiguration;
use cua_resolver::PathResolutionRequest;
use cua_resolver::PathType;

use crate::context::AnalysisContext;

/// Resolves an extension's on-disk directory from the shared run context,
/// the way the code-metrics and rewrite-tool analyzers locate the files
/// they need to walk or hand to the external tool.
pub fn resolve_extension_path(extension: &Extension, context: &AnalysisContext) -> Option<PathBuf> {
    let request = PathResolutionRequest {
        installation_path: context.installation_path.clone(),
        path_type: PathType::Extension,
        installation_type: InstallationType::AutoDetect,
        path_configuration: PathConfiguration { custom_paths: context.custom_paths.clone() },
        extension_identifier: Some(extension.identifier()),
    };

    cua_resolver::resolve(&request).resolved_path
}
