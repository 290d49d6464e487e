//! Thin CLI shell over the analysis crates.
//!
//! Discovers an installation, builds the extension inventory, runs the
//! three analyzers over every non-system extension through the
//! orchestrator's worker pool, and prints a terse per-extension summary.
//! A full HTML/Markdown report is an external collaborator's concern,
//! not this binary's.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cua_analyzer_core::AnalysisContext;
use cua_analyzer_core::AnalyzerCapability;
use cua_analyzer_core::RunConfiguration;
use cua_analyzers::CodeMetricsAnalyzer;
use cua_analyzers::RewriteToolAnalyzer;
use cua_analyzers::UreqCommunityRegistryClient;
use cua_analyzers::UreqComposerRegistryClient;
use cua_analyzers::UreqGitHostClient;
use cua_analyzers::VersionAvailabilityAnalyzer;
use cua_cache::FileCacheStore;
use cua_composer::ComposerManifest;
use cua_orchestrator::Pipeline;
use cua_version::Version;

use crate::cli::CliArguments;
use crate::error::Error;

mod cli;
mod error;

const VENDOR_DIR: &str = "vendor";

pub fn main() -> ExitCode {
    let result = run();

    result.unwrap_or_else(|error| {
        tracing::error!("{error}");
        ExitCode::FAILURE
    })
}

fn run() -> Result<ExitCode, Error> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let arguments = CliArguments::parse();
    let configuration = RunConfiguration::load()?;

    let Some(target_version) = Version::parse(&arguments.target) else {
        return Err(Error::InvalidTargetVersion(arguments.target));
    };

    let discovery = cua_discovery::discover(&arguments.installation_path);
    let Some(installation) = discovery.installation else {
        return Err(Error::Discovery(discovery.errors.join("; ")));
    };

    let custom_paths = ComposerManifest::read_from(&installation.composer_json_path()).map(|manifest| manifest.custom_paths()).unwrap_or_else(|error| {
        tracing::debug!("no custom paths from {}: {error}", installation.composer_json_path().display());
        Default::default()
    });

    let cache = FileCacheStore::new(configuration.cache_root.clone());

    let package_states_path = installation.path.join("typo3conf/PackageStates.php");
    let inventory = cua_inventory::discover_extensions_cached(
        &cache,
        configuration.cache_ttl().as_secs(),
        &installation.path,
        &custom_paths,
        &installation.composer_lock_path(),
        &package_states_path,
        VENDOR_DIR,
    );

    tracing::info!(
        "discovered {} extensions (core {} -> {target_version})",
        inventory.extensions.len(),
        installation.version
    );

    let context = AnalysisContext::new(installation.version.clone(), target_version, installation.path.clone())
        .with_cache_ttl(configuration.cache_ttl())
        .with_caching_enabled(true)
        .with_custom_paths(custom_paths);

    let version_availability = VersionAvailabilityAnalyzer::new(
        Box::new(UreqCommunityRegistryClient { host: configuration.community_registry_host.clone(), timeout: configuration.source_timeout() }),
        Box::new(UreqComposerRegistryClient { host: configuration.composer_registry_host.clone(), timeout: configuration.source_timeout() }),
        Box::new(UreqGitHostClient { timeout: configuration.source_timeout() }),
    );
    let rewrite_tool = RewriteToolAnalyzer::new(arguments.rewrite_tool.clone(), configuration.tool_timeout());
    let code_metrics = CodeMetricsAnalyzer::default();

    let pipeline = Pipeline::new(&cache, configuration.worker_threads, configuration.rewrite_analyzer_concurrency)
        .register(Box::new(version_availability))
        .register(Box::new(rewrite_tool))
        .register(Box::new(code_metrics));

    let non_system_extensions: Vec<_> = inventory.extensions.into_iter().filter(|extension| !extension.is_system()).collect();

    let results = pipeline.run(&non_system_extensions, &context, Arc::new(AtomicBool::new(false)))?;

    print_summary(&results);

    Ok(ExitCode::SUCCESS)
}

fn print_summary(results: &[cua_analyzer_core::AnalysisResult]) {
    use std::collections::BTreeMap;

    let mut by_extension: BTreeMap<&str, Vec<&cua_analyzer_core::AnalysisResult>> = BTreeMap::new();
    for result in results {
        by_extension.entry(result.extension.key.as_str()).or_default().push(result);
    }

    for (key, extension_results) in by_extension {
        let overall_risk = extension_results.iter().map(|r| r.risk_score).fold(0.0_f64, f64::max);
        let breakdown: Vec<String> = extension_results
            .iter()
            .map(|r| format!("{}: {}", r.analyzer_name, if r.successful { format!("{:.1}", r.risk_score) } else { "failed".to_owned() }))
            .collect();

        println!("{key}: {overall_risk:.1} ({})", breakdown.join(", "));
    }
}
