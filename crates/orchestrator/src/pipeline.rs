use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use rayon::ThreadPoolBuilder;

use cua_analyzer_core::AnalysisContext;
use cua_analyzer_core::AnalysisResult;
use cua_analyzer_core::AnalyzerCapability;
use cua_analyzer_core::CachedAnalyzerDriver;
use cua_analyzer_core::resolve_extension_path;
use cua_cache::CacheStore;
use cua_inventory::Extension;

use crate::error::OrchestratorError;

/// Runs every `(extension, analyzer)` pair that `analyzer.supports(extension)`
/// accepts, through the cache-fronted execution envelope, via a bounded
/// worker pool. Results are returned sorted by `(analyzerName, extension.key)`
/// — the only ordering guarantee the design makes.
pub struct Pipeline<'a> {
    cache: &'a dyn CacheStore,
    analyzers: Vec<Box<dyn AnalyzerCapability>>,
    worker_threads: usize,
    rewrite_analyzer_concurrency: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(cache: &'a dyn CacheStore, worker_threads: usize, rewrite_analyzer_concurrency: usize) -> Self {
        Self { cache, analyzers: Vec::new(), worker_threads: worker_threads.max(1), rewrite_analyzer_concurrency: rewrite_analyzer_concurrency.max(1) }
    }

    pub fn register(mut self, analyzer: Box<dyn AnalyzerCapability>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    /// Runs every extension through every supporting analyzer. `cancelled`
    /// is shared into each extension's `AnalysisContext`, so setting it
    /// from another thread reaches every in-flight analyzer within one
    /// scheduling tick and halts dispatch of not-yet-started tasks.
    pub fn run(&self, extensions: &[Extension], context: &AnalysisContext, cancelled: Arc<AtomicBool>) -> Result<Vec<AnalysisResult>, OrchestratorError> {
        if self.analyzers.is_empty() {
            return Err(OrchestratorError::NoAnalyzersConfigured);
        }

        let pool = ThreadPoolBuilder::new().num_threads(self.worker_threads).build().map_err(|error| OrchestratorError::WorkerPoolBuild(error.to_string()))?;

        // The rewrite analyzer is memory-intensive; its own invocations are
        // additionally capped by a scoped sub-pool even when the global
        // pool above is larger.
        let rewrite_pool =
            ThreadPoolBuilder::new().num_threads(self.rewrite_analyzer_concurrency).build().map_err(|error| OrchestratorError::WorkerPoolBuild(error.to_string()))?;

        let driver = CachedAnalyzerDriver::new(self.cache);

        let tasks: Vec<(&Extension, &Box<dyn AnalyzerCapability>)> = extensions
            .iter()
            .flat_map(|extension| self.analyzers.iter().filter(move |analyzer| analyzer.supports(extension)).map(move |analyzer| (extension, analyzer)))
            .collect();

        let mut results: Vec<AnalysisResult> = pool.install(|| {
            use rayon::prelude::*;

            tasks
                .into_par_iter()
                .filter_map(|(extension, analyzer)| {
                    if cancelled.load(Ordering::Relaxed) {
                        tracing::debug!("skipping '{}' on '{}': run was cancelled", analyzer.name(), extension.key);
                        return None;
                    }

                    let extension_context = context.clone().with_cancellation_flag(Arc::clone(&cancelled));
                    let extension_path = resolve_extension_path(extension, &extension_context);

                    let result = if analyzer.name() == "rewrite-tool" {
                        rewrite_pool.install(|| driver.run(analyzer.as_ref(), extension, &extension_context, extension_path.as_deref()))
                    } else {
                        driver.run(analyzer.as_ref(), extension, &extension_context, extension_path.as_deref())
                    };

                    Some(result)
                })
                .collect()
        });

        results.sort_by(|a, b| (a.analyzer_name.as_str(), a.extension.key.as_str()).cmp(&(b.analyzer_name.as_str(), b.extension.key.as_str())));

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use cua_analyzer_core::AnalyzerError;
    use cua_cache::InMemoryCacheStore;
    use cua_inventory::ExtensionType;
    use cua_version::Version;
    use serde_json::Map;

    use super::*;

    struct FixedRiskAnalyzer {
        name: &'static str,
        risk: f64,
    }

    impl AnalyzerCapability for FixedRiskAnalyzer {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test-only analyzer"
        }

        fn supports(&self, _extension: &Extension) -> bool {
            true
        }

        fn analyze(&self, extension: &Extension, _context: &AnalysisContext) -> Result<AnalysisResult, AnalyzerError> {
            Ok(AnalysisResult::builder(self.name(), extension.clone()).risk_score(self.risk).build())
        }
    }

    fn extension(key: &str) -> Extension {
        Extension::new(key, key, Version::new(11, 0, 0), ExtensionType::Local, None, true, Map::new()).unwrap()
    }

    fn context() -> AnalysisContext {
        AnalysisContext::new(Version::new(11, 0, 0), Version::new(12, 4, 0), "/tmp/installation")
    }

    #[test]
    fn results_are_sorted_by_analyzer_name_then_extension_key() {
        let cache = InMemoryCacheStore::new();
        let pipeline = Pipeline::new(&cache, 2, 1)
            .register(Box::new(FixedRiskAnalyzer { name: "zeta", risk: 1.0 }))
            .register(Box::new(FixedRiskAnalyzer { name: "alpha", risk: 2.0 }));

        let extensions = vec![extension("news"), extension("bootstrap_package")];
        let results = pipeline.run(&extensions, &context(), Arc::new(AtomicBool::new(false))).unwrap();

        let keys: Vec<(String, String)> = results.iter().map(|r| (r.analyzer_name.clone(), r.extension.key.clone())).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn a_pre_cancelled_flag_skips_every_task() {
        let cache = InMemoryCacheStore::new();
        let pipeline = Pipeline::new(&cache, 2, 1).register(Box::new(FixedRiskAnalyzer { name: "alpha", risk: 2.0 }));

        let results = pipeline.run(&[extension("news")], &context(), Arc::new(AtomicBool::new(true))).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn running_with_no_registered_analyzers_is_an_error() {
        let cache = InMemoryCacheStore::new();
        let pipeline = Pipeline::new(&cache, 2, 1);
        assert!(pipeline.run(&[extension("news")], &context(), Arc::new(AtomicBool::new(false))).is_err());
    }
}
