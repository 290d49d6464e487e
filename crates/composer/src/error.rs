use std::fmt;

/// Fatal failures reading or parsing a composer file.
///
/// Per the core's error-handling design, these are only raised for the
/// file-not-found/unparseable-JSON cases; callers that want "skip and warn"
/// semantics (the common case — see the discovery and inventory crates)
/// catch these and downgrade them to a logged warning rather than letting
/// them propagate as a hard failure.
#[derive(Debug)]
pub enum ComposerError {
    Io(std::path::PathBuf, std::io::Error),
    Json(std::path::PathBuf, serde_json::Error),
}

impl fmt::Display for ComposerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, error) => write!(f, "failed to read '{}': {error}", path.display()),
            Self::Json(path, error) => write!(f, "failed to parse '{}' as JSON: {error}", path.display()),
        }
    }
}

impl std::error::Error for ComposerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(_, error) => Some(error),
            Self::Json(_, error) => Some(error),
        }
    }
}
