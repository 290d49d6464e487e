use serde_json::Map;
use serde_json::Value;

use cua_inventory::Extension;

use crate::context::AnalysisContext;
use crate::error::AnalyzerError;
use crate::result::AnalysisResult;

/// The shape every analyzer implements; `AbstractCachedAnalyzer`'s
/// inheritance hierarchy collapses to this one capability set plus the
/// generic cache envelope in [`crate::driver`].
pub trait AnalyzerCapability: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn supports(&self, extension: &Extension) -> bool;

    /// Binary/tool names this analyzer needs on `PATH` to run at all. An
    /// empty list (the default) means the analyzer has no external
    /// dependency.
    fn required_tools(&self) -> Vec<String> {
        Vec::new()
    }

    fn analyze(&self, extension: &Extension, context: &AnalysisContext) -> Result<AnalysisResult, AnalyzerError>;

    /// Extra components folded into the cache key beyond the universal
    /// ones (analyzer name, extension identity, version window) — e.g.
    /// the rewrite analyzer's tool version and rule-set count.
    fn cache_key_components(&self, _extension: &Extension, _context: &AnalysisContext) -> Map<String, Value> {
        Map::new()
    }
}
