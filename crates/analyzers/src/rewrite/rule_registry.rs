use std::collections::BTreeMap;

use cua_version::Version;

/// Metadata for one rule set the external rewrite tool can be configured
/// with. Sets are identified by opaque strings (`TYPO3_12`) — the registry
/// only knows their applicability window, not their internals.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub id: &'static str,
    pub category: &'static str,
    pub version_range: (u32, u32),
    pub severity: &'static str,
    pub change_type: &'static str,
    pub description: &'static str,
    pub effort_minutes: u32,
}

/// Always applied regardless of the upgrade window.
const GENERAL: &str = "general";
/// Applied in addition to version-specific sets on a major version jump.
const CODE_QUALITY: &str = "code_quality";

fn rule_sets() -> Vec<RuleSet> {
    vec![
        RuleSet {
            id: GENERAL,
            category: "general",
            version_range: (0, u32::MAX),
            severity: "info",
            change_type: "best_practice",
            description: "Baseline coding-standard rules applied to every upgrade",
            effort_minutes: 2,
        },
        RuleSet {
            id: CODE_QUALITY,
            category: "code_quality",
            version_range: (0, u32::MAX),
            severity: "info",
            change_type: "code_style",
            description: "Broader code-quality cleanups recommended on a major version jump",
            effort_minutes: 5,
        },
        RuleSet {
            id: "TYPO3_11",
            category: "core_api",
            version_range: (10, 11),
            severity: "warning",
            change_type: "deprecation",
            description: "Deprecations and signature changes introduced by TYPO3 11",
            effort_minutes: 15,
        },
        RuleSet {
            id: "TYPO3_12",
            category: "core_api",
            version_range: (11, 12),
            severity: "warning",
            change_type: "deprecation",
            description: "Deprecations and signature changes introduced by TYPO3 12",
            effort_minutes: 15,
        },
        RuleSet {
            id: "TYPO3_13",
            category: "core_api",
            version_range: (12, 13),
            severity: "critical",
            change_type: "breaking_change",
            description: "Breaking API removals introduced by TYPO3 13",
            effort_minutes: 30,
        },
    ]
}

/// The union of sets whose version range intersects `(from, to]`, plus
/// the always-on `general` set and, on a major-version jump, `code_quality`.
pub fn get_sets_for_version_upgrade(from: &Version, to: &Version) -> Vec<RuleSet> {
    let mut matched: Vec<RuleSet> = rule_sets()
        .into_iter()
        .filter(|set| set.id == GENERAL || (set.version_range.0 as u64) < to.major as u64 && (set.version_range.1 as u64) >= from.major as u64 + 1)
        .collect();

    if to.major > from.major && !matched.iter().any(|set| set.id == CODE_QUALITY) {
        if let Some(quality) = rule_sets().into_iter().find(|set| set.id == CODE_QUALITY) {
            matched.push(quality);
        }
    }

    matched
}

pub fn get_sets_by_category(category: &str) -> Vec<RuleSet> {
    rule_sets().into_iter().filter(|set| set.category == category).collect()
}

pub fn get_version_specific_sets(version: &Version) -> Vec<RuleSet> {
    rule_sets().into_iter().filter(|set| set.version_range.0 < version.major && set.version_range.1 >= version.major).collect()
}

pub fn is_version_supported(version: &Version) -> bool {
    !get_version_specific_sets(version).is_empty()
}

#[derive(Debug, Clone, Default)]
pub struct RuleSetStatistics {
    pub total_sets: usize,
    pub sets_by_category: BTreeMap<String, usize>,
}

pub fn get_sets_statistics() -> RuleSetStatistics {
    let sets = rule_sets();
    let mut sets_by_category = BTreeMap::new();
    for set in &sets {
        *sets_by_category.entry(set.category.to_owned()).or_insert(0) += 1;
    }
    RuleSetStatistics { total_sets: sets.len(), sets_by_category }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_minor_upgrade_pulls_in_the_matching_version_specific_set_and_general() {
        let sets = get_sets_for_version_upgrade(&Version::new(11, 5, 0), &Version::new(12, 4, 0));
        let ids: Vec<&str> = sets.iter().map(|s| s.id).collect();
        assert!(ids.contains(&"TYPO3_12"));
        assert!(ids.contains(&GENERAL));
        assert!(!ids.contains(&CODE_QUALITY));
    }

    #[test]
    fn a_major_jump_also_pulls_in_code_quality() {
        let sets = get_sets_for_version_upgrade(&Version::new(11, 5, 0), &Version::new(13, 0, 0));
        let ids: Vec<&str> = sets.iter().map(|s| s.id).collect();
        assert!(ids.contains(&CODE_QUALITY));
        assert!(ids.contains(&"TYPO3_12"));
        assert!(ids.contains(&"TYPO3_13"));
    }

    #[test]
    fn version_support_and_statistics_are_internally_consistent() {
        assert!(is_version_supported(&Version::new(12, 0, 0)));
        assert!(!is_version_supported(&Version::new(99, 0, 0)));

        let stats = get_sets_statistics();
        assert_eq!(stats.total_sets, rule_sets().len());
        assert!(stats.sets_by_category.contains_key("core_api"));
    }
}
