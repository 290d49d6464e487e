use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;

/// The uniform outcome of parsing one configuration file.
///
/// Never propagates an exception out of a parser: I/O failures and parse
/// errors are captured here as `errors`, with `success = false`. Non-fatal
/// issues (deprecated keys, a single unparseable array entry) accumulate in
/// `warnings` without demoting `success`.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub success: bool,
    pub data: Map<String, Value>,
    pub format: String,
    pub path: PathBuf,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl ParseResult {
    pub fn success(data: Map<String, Value>, format: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            success: true,
            data,
            format: format.into(),
            path: path.into(),
            warnings: Vec::new(),
            errors: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn failure(errors: Vec<String>, format: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            success: false,
            data: Map::new(),
            format: format.into(),
            path: path.into(),
            warnings: Vec::new(),
            errors,
            metadata: Map::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
