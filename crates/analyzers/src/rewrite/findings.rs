use cua_analyzer_core::ChangeType;
use cua_analyzer_core::Finding;
use cua_analyzer_core::Severity;

use crate::rewrite::tool::RawFileDiff;
use crate::rewrite::tool::RawRector;

/// Classifies a rule-class name into `(severity, changeType)` by substring
/// matching, per the rule set's heuristic.
pub fn classify(rule_class: &str) -> (Severity, ChangeType) {
    if rule_class.contains("Remove") {
        if rule_class.contains("Method") {
            return (Severity::Critical, ChangeType::MethodSignature);
        }
        if rule_class.contains("Class") {
            return (Severity::Critical, ChangeType::ClassRemoval);
        }
        return (Severity::Critical, ChangeType::BreakingChange);
    }

    if rule_class.contains("Substitute") || rule_class.contains("Replace") {
        return (Severity::Warning, ChangeType::Deprecation);
    }

    if rule_class.contains("Migrate") {
        return (Severity::Warning, ChangeType::ConfigurationChange);
    }

    (Severity::Info, ChangeType::BestPractice)
}

/// `"Replace '<old>' with '<new>'"` / `"Add: '<new>'"` / `"Remove: '<old>'"`,
/// falling back to the first removed/added hunk line of a unified diff.
pub fn suggest_fix(old: Option<&str>, new: Option<&str>, diff: Option<&str>) -> Option<String> {
    match (old, new) {
        (Some(old), Some(new)) => Some(format!("Replace '{old}' with '{new}'")),
        (None, Some(new)) => Some(format!("Add: '{new}'")),
        (Some(old), None) => Some(format!("Remove: '{old}'")),
        (None, None) => suggest_fix_from_diff(diff?),
    }
}

fn suggest_fix_from_diff(diff: &str) -> Option<String> {
    let removed = diff.lines().find(|line| line.starts_with('-') && !line.starts_with("---")).map(|line| line.trim_start_matches('-').trim());
    let added = diff.lines().find(|line| line.starts_with('+') && !line.starts_with("+++")).map(|line| line.trim_start_matches('+').trim());

    match (removed, added) {
        (Some(old), Some(new)) => Some(format!("Replace '{old}' with '{new}'")),
        (None, Some(new)) => Some(format!("Add: '{new}'")),
        (Some(old), None) => Some(format!("Remove: '{old}'")),
        (None, None) => None,
    }
}

/// Builds one [`Finding`] per rector applied to a file diff. A diff with
/// no rectors but a raw diff body still yields one best-effort finding.
pub fn findings_for_file(diff: &RawFileDiff) -> Vec<Finding> {
    if diff.applied_rectors.is_empty() {
        return match &diff.diff {
            Some(body) => vec![finding_from_rector(&diff.file, &RawRector::ClassName("UnknownRector".to_owned()), Some(body))],
            None => Vec::new(),
        };
    }

    diff.applied_rectors.iter().map(|rector| finding_from_rector(&diff.file, rector, diff.diff.as_deref())).collect()
}

fn finding_from_rector(file: &str, rector: &RawRector, diff: Option<&str>) -> Finding {
    let (severity, change_type) = classify(rector.class());

    let (message, line, old, new) = match rector {
        RawRector::ClassName(class) => (class.clone(), 0, None, None),
        RawRector::Detailed { class, message, line, old, new } => (message.clone().unwrap_or_else(|| class.clone()), line.unwrap_or(0), old.clone(), new.clone()),
    };

    let suggested_fix = suggest_fix(old.as_deref(), new.as_deref(), diff);

    Finding {
        file: file.to_owned(),
        line,
        rule_class: rector.class().to_owned(),
        message,
        severity,
        change_type,
        old_code: old,
        new_code: new,
        suggested_fix,
        context: serde_json::Map::new(),
    }
}
