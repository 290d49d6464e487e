mod findings;
pub mod rule_registry;
mod tool;

pub use tool::ToolError;

use std::collections::BTreeMap;

use cua_analyzer_core::AnalysisContext;
use cua_analyzer_core::AnalysisResult;
use cua_analyzer_core::AnalyzerCapability;
use cua_analyzer_core::AnalyzerError;
use cua_analyzer_core::Finding;
use cua_analyzer_core::Severity;
use cua_analyzer_core::resolve_extension_path;
use cua_inventory::Extension;

/// Derived counts and scores for one tool run, independent of the two
/// accepted wire shapes.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub total_findings: usize,
    pub critical_issues: usize,
    pub warnings: usize,
    pub info_issues: usize,
    pub suggestions: usize,
    pub affected_files: usize,
    pub total_files: usize,
    pub rule_breakdown: BTreeMap<String, usize>,
    pub file_breakdown: BTreeMap<String, usize>,
    pub type_breakdown: BTreeMap<String, usize>,
    pub complexity_score: f64,
    pub estimated_fix_time_minutes: u64,
}

impl Summary {
    fn from_findings(findings: &[Finding], total_files: usize) -> Self {
        let mut summary = Summary { total_files, ..Default::default() };
        let mut affected = std::collections::BTreeSet::new();

        for finding in findings {
            affected.insert(finding.file.clone());
            *summary.rule_breakdown.entry(finding.rule_class.clone()).or_insert(0) += 1;
            *summary.file_breakdown.entry(finding.file.clone()).or_insert(0) += 1;
            *summary.type_breakdown.entry(format!("{:?}", finding.change_type)).or_insert(0) += 1;
            summary.estimated_fix_time_minutes += u64::from(finding.estimated_effort_minutes());

            match finding.severity {
                Severity::Critical => summary.critical_issues += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info_issues += 1,
                Severity::Suggestion => summary.suggestions += 1,
            }
        }

        summary.total_findings = findings.len();
        summary.affected_files = affected.len();
        summary.complexity_score = complexity_score(&summary);
        summary
    }

    fn file_impact_ratio(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.affected_files as f64 / self.total_files as f64
        }
    }

    fn upgrade_readiness_score(&self) -> f64 {
        (10.0 - risk_score(self)).max(0.0)
    }

    fn risk_level(&self) -> &'static str {
        match risk_score(self) {
            score if score >= 8.0 => "critical",
            score if score >= 5.0 => "high",
            score if score >= 2.5 => "medium",
            _ => "low",
        }
    }
}

fn complexity_score(summary: &Summary) -> f64 {
    let weighted = summary.critical_issues as f64 * 3.0 + summary.warnings as f64 * 1.5 + summary.info_issues as f64 * 0.5;
    (weighted / (summary.total_files.max(1) as f64)).min(10.0)
}

/// Zero findings score 0.0 outright (a clean extension is fully ready, not
/// merely at the baseline). Otherwise: baseline 1.0, weighted issue
/// counts, file-impact term scaled by complexity, and an effort-band
/// bonus, clamped to 10.
fn risk_score(summary: &Summary) -> f64 {
    if summary.total_findings == 0 {
        return 0.0;
    }

    let mut score = 1.0;
    score += 1.2 * summary.critical_issues as f64 + 0.6 * summary.warnings as f64 + 0.2 * summary.info_issues as f64;
    score += 1.5 * summary.file_impact_ratio();
    score *= 1.0 + summary.complexity_score / 20.0;

    let hours = summary.estimated_fix_time_minutes as f64 / 60.0;
    score += if hours > 16.0 {
        2.0
    } else if hours > 8.0 {
        1.0
    } else if hours > 4.0 {
        0.5
    } else {
        0.0
    };

    score.clamp(0.0, 10.0)
}

pub struct RewriteToolAnalyzer {
    binary: String,
    timeout: std::time::Duration,
}

impl RewriteToolAnalyzer {
    pub fn new(binary: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self { binary: binary.into(), timeout }
    }
}

impl AnalyzerCapability for RewriteToolAnalyzer {
    fn name(&self) -> &str {
        "rewrite-tool"
    }

    fn description(&self) -> &str {
        "Runs an external refactoring tool in dry-run mode and scores the findings"
    }

    fn supports(&self, extension: &Extension) -> bool {
        !extension.is_system()
    }

    fn required_tools(&self) -> Vec<String> {
        vec![self.binary.clone()]
    }

    fn analyze(&self, extension: &Extension, context: &AnalysisContext) -> Result<AnalysisResult, AnalyzerError> {
        if !tool::tool_is_available(&self.binary) {
            return Ok(AnalysisResult::builder(self.name(), extension.clone())
                .failed("required tool is not available on PATH")
                .metric("hasRequiredTools", serde_json::Value::Bool(false))
                .build());
        }

        let Some(extension_path) = resolve_extension_path(extension, context) else {
            return Ok(AnalysisResult::builder(self.name(), extension.clone()).failed("could not resolve the extension's directory").build());
        };

        let sets = rule_registry::get_sets_for_version_upgrade(&context.current_version, &context.target_version);

        let temp_dir = tempfile::tempdir().map_err(AnalyzerError::Io)?;
        let config_path = tool::write_tool_configuration(temp_dir.path(), &sets).map_err(AnalyzerError::Io)?;

        let cancellation_flag = context.cancellation_flag();
        let output = match tool::run_tool(&self.binary, &extension_path, &config_path, self.timeout, cancellation_flag.as_ref()) {
            Ok(output) => output,
            Err(tool::ToolError::Timeout) => {
                return Ok(AnalysisResult::builder(self.name(), extension.clone()).failed("timeout").build());
            }
            Err(error) => {
                return Ok(AnalysisResult::builder(self.name(), extension.clone()).failed(error.to_string()).build());
            }
        };

        let diffs = output.all_file_diffs();
        let findings: Vec<Finding> = diffs.iter().flat_map(findings::findings_for_file).collect();
        let summary = Summary::from_findings(&findings, diffs.len().max(output.totals.changed_files as usize));

        let mut metrics = serde_json::Map::new();
        metrics.insert("totalFindings".to_owned(), serde_json::json!(summary.total_findings));
        metrics.insert("criticalIssues".to_owned(), serde_json::json!(summary.critical_issues));
        metrics.insert("warnings".to_owned(), serde_json::json!(summary.warnings));
        metrics.insert("infoIssues".to_owned(), serde_json::json!(summary.info_issues));
        metrics.insert("suggestions".to_owned(), serde_json::json!(summary.suggestions));
        metrics.insert("affectedFiles".to_owned(), serde_json::json!(summary.affected_files));
        metrics.insert("totalFiles".to_owned(), serde_json::json!(summary.total_files));
        metrics.insert("ruleBreakdown".to_owned(), serde_json::json!(summary.rule_breakdown));
        metrics.insert("fileBreakdown".to_owned(), serde_json::json!(summary.file_breakdown));
        metrics.insert("typeBreakdown".to_owned(), serde_json::json!(summary.type_breakdown));
        metrics.insert("complexityScore".to_owned(), serde_json::json!(summary.complexity_score));
        metrics.insert("estimatedFixTimeMinutes".to_owned(), serde_json::json!(summary.estimated_fix_time_minutes));
        metrics.insert("upgradeReadinessScore".to_owned(), serde_json::json!(summary.upgrade_readiness_score()));
        metrics.insert("fileImpactPercentage".to_owned(), serde_json::json!(summary.file_impact_ratio() * 100.0));
        metrics.insert("riskLevel".to_owned(), serde_json::Value::String(summary.risk_level().to_owned()));

        let recommendations: Vec<String> = if findings.is_empty() {
            vec!["extension appears ready for the upgrade; no findings were raised".to_owned()]
        } else {
            findings.iter().filter(|f| f.requires_manual_intervention()).filter_map(|f| f.suggested_fix.clone()).take(10).collect()
        };

        Ok(AnalysisResult::builder(self.name(), extension.clone()).risk_score(risk_score(&summary)).recommendations(recommendations).metrics(metrics).build())
    }
}

#[cfg(test)]
mod tests {
    use cua_analyzer_core::ChangeType;

    use super::*;

    fn finding(severity: Severity, change_type: ChangeType) -> Finding {
        Finding {
            file: "Classes/Domain/Model/News.php".to_owned(),
            line: 10,
            rule_class: "RemoveMethodRector".to_owned(),
            message: "removed".to_owned(),
            severity,
            change_type,
            old_code: None,
            new_code: None,
            suggested_fix: Some("Remove: 'old()'".to_owned()),
            context: serde_json::Map::new(),
        }
    }

    #[test]
    fn a_single_critical_finding_raises_the_risk_score_above_baseline() {
        let findings = vec![finding(Severity::Critical, ChangeType::MethodSignature)];
        let summary = Summary::from_findings(&findings, 5);
        assert!(risk_score(&summary) > 1.0);
        assert_eq!(summary.affected_files, 1);
    }

    #[test]
    fn no_findings_yields_a_perfect_score() {
        let summary = Summary::from_findings(&[], 5);
        assert_eq!(risk_score(&summary), 0.0);
        assert_eq!(summary.upgrade_readiness_score(), 10.0);
        assert_eq!(summary.risk_level(), "low");
    }

    #[test]
    fn many_critical_findings_push_the_risk_level_to_critical() {
        let findings: Vec<Finding> = (0..20).map(|_| finding(Severity::Critical, ChangeType::ClassRemoval)).collect();
        let summary = Summary::from_findings(&findings, 20);
        assert_eq!(summary.risk_level(), "critical");
    }
}
