use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// How urgently a finding needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Suggestion,
}

impl Severity {
    fn weight(self) -> u32 {
        match self {
            Self::Critical => 4,
            Self::Warning => 3,
            Self::Info => 2,
            Self::Suggestion => 1,
        }
    }
}

/// What kind of change the finding represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    BreakingChange,
    Deprecation,
    MethodSignature,
    ClassRemoval,
    InterfaceChange,
    ConfigurationChange,
    BestPractice,
    CodeStyle,
}

impl ChangeType {
    fn tie_break_weight(self) -> f64 {
        match self {
            Self::BreakingChange => 0.8,
            Self::ClassRemoval => 0.7,
            Self::InterfaceChange => 0.6,
            Self::MethodSignature => 0.5,
            Self::ConfigurationChange => 0.4,
            Self::Deprecation => 0.3,
            Self::BestPractice => 0.2,
            Self::CodeStyle => 0.1,
        }
    }

    fn estimated_effort_minutes(self) -> u32 {
        match self {
            Self::ClassRemoval => 45,
            Self::BreakingChange => 30,
            Self::InterfaceChange => 25,
            Self::MethodSignature => 20,
            Self::Deprecation => 15,
            Self::ConfigurationChange => 10,
            Self::BestPractice => 5,
            Self::CodeStyle => 2,
        }
    }

    fn requires_manual_intervention(self) -> bool {
        matches!(self, Self::BreakingChange | Self::MethodSignature | Self::ClassRemoval | Self::InterfaceChange)
    }
}

/// A single issue reported by the external rewrite tool, keyed by file,
/// line, and rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    pub line: u32,
    pub rule_class: String,
    pub message: String,
    pub severity: Severity,
    pub change_type: ChangeType,
    pub old_code: Option<String>,
    pub new_code: Option<String>,
    pub suggested_fix: Option<String>,
    pub context: Map<String, Value>,
}

impl Finding {
    /// Strictly monotone in `severity` for a fixed `change_type`: the
    /// severity term dominates, the change-type term only breaks ties
    /// between findings of equal severity.
    pub fn priority_score(&self) -> f64 {
        f64::from(self.severity.weight()) * 10.0 + self.change_type.tie_break_weight()
    }

    pub fn estimated_effort_minutes(&self) -> u32 {
        self.change_type.estimated_effort_minutes()
    }

    pub fn requires_manual_intervention(&self) -> bool {
        self.change_type.requires_manual_intervention()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(severity: Severity, change_type: ChangeType) -> Finding {
        Finding {
            file: "Classes/Controller/NewsController.php".to_owned(),
            line: 42,
            rule_class: "RemoveMethodRector".to_owned(),
            message: "method removed".to_owned(),
            severity,
            change_type,
            old_code: None,
            new_code: None,
            suggested_fix: None,
            context: Map::new(),
        }
    }

    #[test]
    fn priority_score_is_monotone_in_severity_for_a_fixed_change_type() {
        let critical = finding(Severity::Critical, ChangeType::MethodSignature).priority_score();
        let warning = finding(Severity::Warning, ChangeType::MethodSignature).priority_score();
        let info = finding(Severity::Info, ChangeType::MethodSignature).priority_score();
        let suggestion = finding(Severity::Suggestion, ChangeType::MethodSignature).priority_score();

        assert!(critical > warning);
        assert!(warning > info);
        assert!(info > suggestion);
    }

    #[test]
    fn method_signature_removal_matches_the_pinned_scenario() {
        let finding = finding(Severity::Critical, ChangeType::MethodSignature);
        assert!(finding.requires_manual_intervention());
        assert_eq!(finding.estimated_effort_minutes(), 20);
    }
}
