mod classifier;

use std::path::Path;

use walkdir::WalkDir;

use cua_analyzer_core::AnalysisContext;
use cua_analyzer_core::AnalysisResult;
use cua_analyzer_core::AnalyzerCapability;
use cua_analyzer_core::AnalyzerError;
use cua_analyzer_core::resolve_extension_path;
use cua_inventory::Extension;

use classifier::LineClassifier;
use classifier::LineKind;

const EXCLUDED_SEGMENTS: [&str; 4] = ["vendor", "node_modules", "Tests", "tests"];

#[derive(Debug, Clone, Default)]
struct FileMetrics {
    path: String,
    total_lines: usize,
    blank_lines: usize,
    comment_lines: usize,
    code_lines: usize,
    classlikes: usize,
    methods: usize,
    functions: usize,
}

#[derive(Debug, Clone, Default)]
struct AggregateMetrics {
    php_files: usize,
    total_lines: usize,
    blank_lines: usize,
    comment_lines: usize,
    code_lines: usize,
    classlikes: usize,
    methods: usize,
    functions: usize,
    largest_file_lines: usize,
    largest_file_path: String,
}

impl AggregateMetrics {
    fn accumulate(&mut self, file: &FileMetrics) {
        self.php_files += 1;
        self.total_lines += file.total_lines;
        self.blank_lines += file.blank_lines;
        self.comment_lines += file.comment_lines;
        self.code_lines += file.code_lines;
        self.classlikes += file.classlikes;
        self.methods += file.methods;
        self.functions += file.functions;

        if file.total_lines > self.largest_file_lines {
            self.largest_file_lines = file.total_lines;
            self.largest_file_path = file.path.clone();
        }
    }

    fn average_file_size(&self) -> usize {
        if self.php_files == 0 {
            0
        } else {
            (self.total_lines as f64 / self.php_files as f64).round() as usize
        }
    }

    fn methods_per_file(&self) -> f64 {
        if self.php_files == 0 {
            0.0
        } else {
            (self.methods + self.functions) as f64 / self.php_files as f64
        }
    }
}

fn is_excluded(path: &Path) -> bool {
    path.components().any(|component| EXCLUDED_SEGMENTS.iter().any(|segment| component.as_os_str() == *segment))
}

fn analyze_file(content: &str, path: &str) -> FileMetrics {
    let mut metrics = FileMetrics { path: path.to_owned(), ..Default::default() };
    let mut classifier = LineClassifier::new();
    let mut file_has_classlike = false;

    for line in content.lines() {
        metrics.total_lines += 1;
        match classifier.classify(line) {
            LineKind::Blank => metrics.blank_lines += 1,
            LineKind::Comment => metrics.comment_lines += 1,
            LineKind::Code => {
                metrics.code_lines += 1;
                if classifier::is_classlike(line) {
                    metrics.classlikes += 1;
                    file_has_classlike = true;
                }
            }
        }
    }

    // Function/method detection runs over the whole file once classlike
    // presence is known, so ordering within the file doesn't matter.
    for line in content.lines() {
        if classifier::is_function_like(line) {
            if file_has_classlike {
                metrics.methods += 1;
            } else {
                metrics.functions += 1;
            }
        }
    }

    metrics
}

fn risk_bands(aggregate: &AggregateMetrics) -> f64 {
    let mut score = 0.0;

    score += match aggregate.total_lines {
        n if n > 200_000 => 4.0,
        n if n > 50_000 => 2.5,
        n if n > 10_000 => 1.0,
        _ => 0.0,
    };

    score += match aggregate.largest_file_lines {
        n if n > 5_000 => 3.0,
        n if n > 2_000 => 1.5,
        n if n > 1_000 => 0.5,
        _ => 0.0,
    };

    score += match aggregate.methods_per_file() {
        ratio if ratio > 40.0 => 3.0,
        ratio if ratio > 20.0 => 1.5,
        ratio if ratio > 10.0 => 0.5,
        _ => 0.0,
    };

    score.clamp(0.0, 10.0)
}

pub struct CodeMetricsAnalyzer {
    source_extension: String,
}

impl Default for CodeMetricsAnalyzer {
    fn default() -> Self {
        Self { source_extension: "php".to_owned() }
    }
}

impl CodeMetricsAnalyzer {
    pub fn new(source_extension: impl Into<String>) -> Self {
        Self { source_extension: source_extension.into() }
    }
}

impl AnalyzerCapability for CodeMetricsAnalyzer {
    fn name(&self) -> &str {
        "code-metrics"
    }

    fn description(&self) -> &str {
        "Classifies source lines and structural constructs, scoring risk by size and density"
    }

    fn supports(&self, _extension: &Extension) -> bool {
        true
    }

    fn analyze(&self, extension: &Extension, context: &AnalysisContext) -> Result<AnalysisResult, AnalyzerError> {
        let Some(extension_path) = resolve_extension_path(extension, context) else {
            return Ok(AnalysisResult::builder(self.name(), extension.clone()).failed("could not resolve the extension's directory").build());
        };

        let mut aggregate = AggregateMetrics::default();

        for entry in WalkDir::new(&extension_path).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            if is_excluded(entry.path()) {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some(self.source_extension.as_str()) {
                continue;
            }

            let content = match std::fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(_) => continue,
            };

            let file_metrics = analyze_file(&content, &entry.path().to_string_lossy());
            aggregate.accumulate(&file_metrics);
        }

        let mut metrics = serde_json::Map::new();
        metrics.insert("phpFiles".to_owned(), serde_json::json!(aggregate.php_files));
        metrics.insert("totalLines".to_owned(), serde_json::json!(aggregate.total_lines));
        metrics.insert("blankLines".to_owned(), serde_json::json!(aggregate.blank_lines));
        metrics.insert("commentLines".to_owned(), serde_json::json!(aggregate.comment_lines));
        metrics.insert("codeLines".to_owned(), serde_json::json!(aggregate.code_lines));
        metrics.insert("classlikes".to_owned(), serde_json::json!(aggregate.classlikes));
        metrics.insert("methods".to_owned(), serde_json::json!(aggregate.methods));
        metrics.insert("functions".to_owned(), serde_json::json!(aggregate.functions));
        metrics.insert("largestFileLines".to_owned(), serde_json::json!(aggregate.largest_file_lines));
        metrics.insert("largestFilePath".to_owned(), serde_json::Value::String(aggregate.largest_file_path.clone()));
        metrics.insert("averageFileSize".to_owned(), serde_json::json!(aggregate.average_file_size()));

        Ok(AnalysisResult::builder(self.name(), extension.clone()).risk_score(risk_bands(&aggregate)).metrics(metrics).build())
    }
}
