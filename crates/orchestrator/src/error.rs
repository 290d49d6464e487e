use std::fmt;

/// Failures in orchestrating a run, distinct from a single analyzer's
/// own failure (which becomes a field on its `AnalysisResult` instead).
#[derive(Debug)]
pub enum OrchestratorError {
    NoAnalyzersConfigured,
    WorkerPoolBuild(String),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAnalyzersConfigured => write!(f, "no analyzers were registered with the orchestrator"),
            Self::WorkerPoolBuild(message) => write!(f, "failed to build the worker pool: {message}"),
        }
    }
}

impl std::error::Error for OrchestratorError {}
