//! The three non-trivial analyzers: version availability, static rewrite
//! analysis, and code metrics. Each implements [`cua_analyzer_core::AnalyzerCapability`]
//! and is otherwise independent — the orchestrator fans them out per extension.

mod code_metrics;
mod rewrite;
mod version_availability;

pub use code_metrics::CodeMetricsAnalyzer;
pub use rewrite::RewriteToolAnalyzer;
pub use rewrite::ToolError;
pub use rewrite::rule_registry;
pub use version_availability::GitAnalysis;
pub use version_availability::GitHostClient;
pub use version_availability::RegistryClient;
pub use version_availability::UreqCommunityRegistryClient;
pub use version_availability::UreqComposerRegistryClient;
pub use version_availability::UreqGitHostClient;
pub use version_availability::VersionAvailabilityAnalyzer;
