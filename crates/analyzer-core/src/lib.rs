//! The cache-fronted execution envelope every analyzer runs inside.
//!
//! `AbstractCachedAnalyzer`'s inheritance hierarchy collapses to
//! [`AnalyzerCapability`] plus [`driver::CachedAnalyzerDriver`], a generic
//! cache envelope that wraps any implementation of the capability trait.

mod capability;
mod config;
mod context;
mod driver;
mod error;
mod finding;
mod paths;
mod result;

pub use capability::AnalyzerCapability;
pub use config::RunConfiguration;
pub use context::AnalysisContext;
pub use driver::CachedAnalyzerDriver;
pub use error::AnalyzerError;
pub use finding::ChangeType;
pub use finding::Finding;
pub use finding::Severity;
pub use paths::resolve_extension_path;
pub use result::AnalysisResult;
pub use result::AnalysisResultBuilder;
pub use result::CachedAnalysisPayload;
