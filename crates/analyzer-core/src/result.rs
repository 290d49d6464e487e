use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use cua_inventory::Extension;

/// One analyzer's verdict for one extension: metrics, a risk score, and
/// recommendations. Always constructed through [`AnalysisResultBuilder`]
/// and immutable thereafter.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub analyzer_name: String,
    pub extension: Extension,
    pub metrics: Map<String, Value>,
    pub risk_score: f64,
    pub recommendations: Vec<String>,
    pub successful: bool,
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn builder(analyzer_name: impl Into<String>, extension: Extension) -> AnalysisResultBuilder {
        AnalysisResultBuilder::new(analyzer_name, extension)
    }
}

/// The serialized shape written to and read from the cache. The extension
/// itself travels separately — the caller's current `Extension` instance
/// is reattached on deserialization so identity is preserved across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnalysisPayload {
    pub analyzer_name: String,
    pub extension_key: String,
    pub metrics: Map<String, Value>,
    pub risk_score: f64,
    pub recommendations: Vec<String>,
    pub successful: bool,
    pub error: Option<String>,
    pub cached_at: u64,
    pub cache_ttl_seconds: u64,
}

impl CachedAnalysisPayload {
    pub fn from_result(result: &AnalysisResult, cached_at: u64, cache_ttl_seconds: u64) -> Self {
        Self {
            analyzer_name: result.analyzer_name.clone(),
            extension_key: result.extension.key.clone(),
            metrics: result.metrics.clone(),
            risk_score: result.risk_score,
            recommendations: result.recommendations.clone(),
            successful: result.successful,
            error: result.error.clone(),
            cached_at,
            cache_ttl_seconds,
        }
    }

    /// Reattaches `extension` (the caller's current instance, not
    /// whatever was cached) to reconstitute an `AnalysisResult`.
    pub fn into_result(self, extension: Extension) -> AnalysisResult {
        AnalysisResult {
            analyzer_name: self.analyzer_name,
            extension,
            metrics: self.metrics,
            risk_score: self.risk_score,
            recommendations: self.recommendations,
            successful: self.successful,
            error: self.error,
        }
    }
}

/// Accumulates an `AnalysisResult` incrementally; `build()` clamps
/// `risk_score` to `[0, 10]` and yields the immutable value.
pub struct AnalysisResultBuilder {
    analyzer_name: String,
    extension: Extension,
    metrics: Map<String, Value>,
    risk_score: f64,
    recommendations: Vec<String>,
    successful: bool,
    error: Option<String>,
}

impl AnalysisResultBuilder {
    pub fn new(analyzer_name: impl Into<String>, extension: Extension) -> Self {
        Self {
            analyzer_name: analyzer_name.into(),
            extension,
            metrics: Map::new(),
            risk_score: 0.0,
            recommendations: Vec::new(),
            successful: true,
            error: None,
        }
    }

    pub fn metric(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }

    pub fn metrics(mut self, metrics: Map<String, Value>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn risk_score(mut self, risk_score: f64) -> Self {
        self.risk_score = risk_score;
        self
    }

    pub fn recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }

    pub fn recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.successful = false;
        self.error = Some(error.into());
        self
    }

    pub fn build(self) -> AnalysisResult {
        AnalysisResult {
            analyzer_name: self.analyzer_name,
            extension: self.extension,
            metrics: self.metrics,
            risk_score: self.risk_score.clamp(0.0, 10.0),
            recommendations: self.recommendations,
            successful: self.successful,
            error: self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use cua_inventory::ExtensionType;
    use cua_version::Version;

    use super::*;

    fn extension() -> Extension {
        Extension::new("news", "News", Version::new(11, 0, 0), ExtensionType::Composer, Some("georgringer/news".to_owned()), true, Map::new())
            .unwrap()
    }

    #[test]
    fn clamps_risk_score_to_the_valid_range() {
        let result = AnalysisResult::builder("code-metrics", extension()).risk_score(15.0).build();
        assert_eq!(result.risk_score, 10.0);

        let result = AnalysisResult::builder("code-metrics", extension()).risk_score(-3.0).build();
        assert_eq!(result.risk_score, 0.0);
    }

    #[test]
    fn round_trips_through_the_cache_payload_shape() {
        let original = AnalysisResult::builder("code-metrics", extension()).risk_score(4.5).recommendation("review it").build();

        let payload = CachedAnalysisPayload::from_result(&original, 1_700_000_000, 3600);
        let serialized = serde_json::to_value(&payload).unwrap();
        let deserialized: CachedAnalysisPayload = serde_json::from_value(serialized).unwrap();
        let reattached = deserialized.into_result(extension());

        assert_eq!(reattached.risk_score, original.risk_score);
        assert_eq!(reattached.recommendations, original.recommendations);
    }
}
