use cua_version::Version;

/// Interprets a Composer version constraint string against a target version,
/// per the compatibility rules in the core's remote-endpoint contract:
///
/// - a wildcard (`*`, empty) is always compatible;
/// - `^N.x` / `N.x` is compatible iff `N == target.major`;
/// - an explicit version (`typo3/cms-core: "12.4.8"`) is compatible iff
///   `major.minor` matches the target and the constraint's patch is at
///   least the target's patch.
pub fn is_constraint_compatible(constraint: &str, target: &Version) -> bool {
    let constraint = constraint.trim();
    if constraint.is_empty() || constraint == "*" {
        return true;
    }

    let body = constraint.strip_prefix('^').or_else(|| constraint.strip_prefix('~')).unwrap_or(constraint);

    if let Some(major_str) = body.strip_suffix(".x").or_else(|| body.strip_suffix(".*")) {
        return major_str.parse::<u32>().is_ok_and(|major| major == target.major);
    }

    match Version::parse(body) {
        Some(explicit) => explicit.major == target.major && explicit.minor == target.minor && explicit.patch >= target.patch,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Version {
        Version::new(12, 4, 0)
    }

    #[test]
    fn wildcard_is_always_compatible() {
        assert!(is_constraint_compatible("*", &target()));
        assert!(is_constraint_compatible("", &target()));
    }

    #[test]
    fn caret_major_wildcard_matches_major_only() {
        assert!(is_constraint_compatible("^12.x", &target()));
        assert!(is_constraint_compatible("12.x", &target()));
        assert!(!is_constraint_compatible("^11.x", &target()));
    }

    #[test]
    fn explicit_version_requires_major_minor_match_and_patch_at_least_target() {
        assert!(is_constraint_compatible("12.4.8", &target()));
        assert!(!is_constraint_compatible("12.3.8", &target()));
        assert!(!is_constraint_compatible("13.4.8", &Version::new(12, 4, 8)));
    }
}
