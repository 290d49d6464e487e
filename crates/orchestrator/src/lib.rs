//! Fans the registered analyzers out over a discovered extension list.
//!
//! Scheduling follows two levels: Level 1 submits one task per
//! `(extension, analyzer)` pair onto a bounded worker pool (`rayon`,
//! matching the teacher's own fan-out tool); Level 2 — the
//! version-availability analyzer's own three-source fan-out — lives inside
//! that analyzer and is invisible here. No ordering is guaranteed between
//! tasks; [`Pipeline::run`] sorts its output by `(analyzerName, extension.key)`
//! before returning, which is the only ordering the design promises.

mod error;
mod pipeline;

pub use error::OrchestratorError;
pub use pipeline::Pipeline;
