use std::io::Write as _;
use std::path::Path;
use std::process::Command;
use std::process::Stdio;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::time::Duration;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;

use crate::rewrite::rule_registry::RuleSet;

/// One finding as reported by the external tool, in either accepted shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRector {
    ClassName(String),
    Detailed { class: String, message: Option<String>, line: Option<u32>, old: Option<String>, new: Option<String> },
}

impl RawRector {
    pub fn class(&self) -> &str {
        match self {
            RawRector::ClassName(class) => class,
            RawRector::Detailed { class, .. } => class,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFileDiff {
    pub file: String,
    #[serde(default)]
    pub applied_rectors: Vec<RawRector>,
    #[serde(default)]
    pub diff: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawChangedFile {
    Name(String),
    Diff(RawFileDiff),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTotals {
    #[serde(default)]
    pub changed_files: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawToolOutput {
    #[serde(default)]
    pub totals: RawTotals,
    #[serde(default)]
    pub file_diffs: Vec<RawFileDiff>,
    #[serde(default)]
    pub changed_files: Vec<RawChangedFile>,
    #[serde(default)]
    pub errors: Vec<Value>,
}

impl RawToolOutput {
    /// Normalizes both accepted shapes into one list of file diffs; a
    /// bare filename in `changed_files` becomes a diff with no rectors.
    pub fn all_file_diffs(&self) -> Vec<RawFileDiff> {
        if !self.file_diffs.is_empty() {
            return self.file_diffs.clone();
        }

        self.changed_files
            .iter()
            .map(|entry| match entry {
                RawChangedFile::Name(name) => RawFileDiff { file: name.clone(), applied_rectors: Vec::new(), diff: None },
                RawChangedFile::Diff(diff) => diff.clone(),
            })
            .collect()
    }
}

#[derive(Debug)]
pub enum ToolError {
    Unavailable,
    Timeout,
    Cancelled,
    Spawn(String),
    UnparseableOutput(String),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Unavailable => write!(f, "rewrite tool binary not found on PATH"),
            ToolError::Timeout => write!(f, "rewrite tool exceeded its wall-clock timeout"),
            ToolError::Cancelled => write!(f, "rewrite tool invocation was cancelled"),
            ToolError::Spawn(message) => write!(f, "failed to spawn rewrite tool: {message}"),
            ToolError::UnparseableOutput(message) => write!(f, "rewrite tool output was not parseable JSON: {message}"),
        }
    }
}

impl std::error::Error for ToolError {}

/// True when `binary` resolves on `PATH`, used to set `hasRequiredTools`.
pub fn tool_is_available(binary: &str) -> bool {
    Command::new(binary).arg("--version").stdout(Stdio::null()).stderr(Stdio::null()).status().is_ok()
}

/// Writes a minimal rule-set-selecting configuration file for the tool,
/// scoped to a temporary directory the caller owns and cleans up.
pub fn write_tool_configuration(directory: &Path, sets: &[RuleSet]) -> std::io::Result<std::path::PathBuf> {
    let path = directory.join("rewrite-tool-config.php");
    let mut file = std::fs::File::create(&path)?;

    writeln!(file, "<?php")?;
    writeln!(file, "return [")?;
    writeln!(file, "    'sets' => [")?;
    for set in sets {
        writeln!(file, "        '{}',", set.id)?;
    }
    writeln!(file, "    ],")?;
    writeln!(file, "];")?;

    Ok(path)
}

/// Spawns `binary <extension_path> --config <config_path> --dry-run
/// --output-format json --no-progress-bar`, enforcing a wall-clock
/// timeout by polling the child and killing it on expiry. Also polls
/// `cancelled`, killing the child within one poll tick if the caller
/// requests cancellation.
pub fn run_tool(binary: &str, extension_path: &Path, config_path: &Path, timeout: Duration, cancelled: &AtomicBool) -> Result<RawToolOutput, ToolError> {
    let mut child = Command::new(binary)
        .arg(extension_path)
        .arg("--config")
        .arg(config_path)
        .arg("--dry-run")
        .arg("--output-format")
        .arg("json")
        .arg("--no-progress-bar")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|error| ToolError::Spawn(error.to_string()))?;

    let stdout = child.stdout.take().expect("stdout was piped");
    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        use std::io::Read;
        let mut stdout = stdout;
        let mut buffer = String::new();
        let _ = stdout.read_to_string(&mut buffer);
        let _ = sender.send(buffer);
    });

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(_status)) => break,
            Ok(None) => {
                if cancelled.load(Ordering::Relaxed) {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ToolError::Cancelled);
                }
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ToolError::Timeout);
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(error) => return Err(ToolError::Spawn(error.to_string())),
        }
    }

    let output = receiver.recv_timeout(Duration::from_secs(1)).unwrap_or_default();
    serde_json::from_str(&output).map_err(|error| ToolError::UnparseableOutput(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_file_diffs_over_changed_files_when_both_present() {
        let output = RawToolOutput {
            totals: RawTotals::default(),
            file_diffs: vec![RawFileDiff { file: "a.php".to_owned(), applied_rectors: Vec::new(), diff: None }],
            changed_files: vec![RawChangedFile::Name("b.php".to_owned())],
            errors: Vec::new(),
        };

        let diffs = output.all_file_diffs();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].file, "a.php");
    }

    #[test]
    fn falls_back_to_changed_files_as_bare_names() {
        let output = RawToolOutput {
            totals: RawTotals::default(),
            file_diffs: Vec::new(),
            changed_files: vec![RawChangedFile::Name("b.php".to_owned())],
            errors: Vec::new(),
        };

        let diffs = output.all_file_diffs();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].file, "b.php");
        assert!(diffs[0].applied_rectors.is_empty());
    }

    #[test]
    fn parses_both_rector_entry_shapes() {
        let json = serde_json::json!({
            "file_diffs": [{
                "file": "Domain/Model/News.php",
                "applied_rectors": [
                    "RemoveMethodRector",
                    {"class": "SubstituteConstructorRector", "message": "use DI", "line": 12, "old": "new X()", "new": "GeneralUtility::makeInstance(X::class)"}
                ]
            }]
        });

        let parsed: RawToolOutput = serde_json::from_value(json).unwrap();
        let diffs = parsed.all_file_diffs();
        assert_eq!(diffs[0].applied_rectors.len(), 2);
        assert_eq!(diffs[0].applied_rectors[0].class(), "RemoveMethodRector");
        assert_eq!(diffs[0].applied_rectors[1].class(), "SubstituteConstructorRector");
    }
}
