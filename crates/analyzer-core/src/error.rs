use std::fmt;

/// Failures that can legitimately escape an analyzer's boundary.
///
/// Per the core's error-handling design, everything else an analyzer
/// encounters (a remote source being down, the external tool missing, a
/// malformed file) is recoverable and becomes a field on `AnalysisResult`
/// instead — this enum is only for conditions the driver has no
/// meaningful way to paper over.
#[derive(Debug)]
pub enum AnalyzerError {
    Io(std::io::Error),
    Json(serde_json::Error),
    ToolUnavailable(String),
    Timeout(String),
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "{error}"),
            Self::Json(error) => write!(f, "{error}"),
            Self::ToolUnavailable(tool) => write!(f, "required tool '{tool}' is not available"),
            Self::Timeout(detail) => write!(f, "operation timed out: {detail}"),
        }
    }
}

impl std::error::Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Json(error) => Some(error),
            Self::ToolUnavailable(_) | Self::Timeout(_) => None,
        }
    }
}

impl From<std::io::Error> for AnalyzerError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}
