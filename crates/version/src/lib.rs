//! Modeling CMS versions (`major.minor.patch[-suffix]`).
//!
//! Accepts the handful of shapes actually found in lock files, composer
//! constraints, and extension manifests: `v12.4.8`, `12.4.8-rc1`, and the
//! `dev-12.4` branch-alias shape used by Composer for unreleased core
//! branches. Purely symbolic branch names (`dev-main`) are rejected, since
//! there is no version ordering to assign to them.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// A parsed, comparable version.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub suffix: Option<String>,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch, suffix: None }
    }

    pub fn with_suffix(major: u32, minor: u32, patch: u32, suffix: impl Into<String>) -> Self {
        Self { major, minor, patch, suffix: Some(suffix.into()) }
    }

    /// Parses a version string, normalizing the shapes described in the
    /// module docs. Returns `None` for anything that isn't a recognizable
    /// version (including purely symbolic branch names).
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let stripped = input.strip_prefix('v').or_else(|| input.strip_prefix('V')).unwrap_or(input);

        if let Some(rest) = stripped.strip_prefix("dev-") {
            return Self::parse_dev_branch(rest);
        }

        Self::parse_plain(stripped)
    }

    /// `dev-12.4` -> `12.4.0`, `dev-12.4.8` -> `12.4.8`. Anything with a
    /// non-numeric or wildcard (`x`) component, or fewer than two numeric
    /// components, is rejected.
    fn parse_dev_branch(rest: &str) -> Option<Self> {
        let parts: Vec<&str> = rest.split('.').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return None;
        }

        let mut numbers = Vec::with_capacity(3);
        for part in &parts {
            if part.eq_ignore_ascii_case("x") {
                // `dev-12.4.x` is a wildcard branch alias, not a concrete version.
                return None;
            }
            numbers.push(part.parse::<u32>().ok()?);
        }

        let major = numbers[0];
        let minor = numbers[1];
        let patch = numbers.get(2).copied().unwrap_or(0);

        Some(Self::new(major, minor, patch))
    }

    fn parse_plain(input: &str) -> Option<Self> {
        let (version_part, suffix) = match input.split_once('-') {
            Some((v, s)) => (v, Some(s.to_owned())),
            None => (input, None),
        };

        let mut segments = version_part.split('.');
        let major = segments.next()?.parse::<u32>().ok()?;
        let minor = segments.next()?.parse::<u32>().ok()?;
        let patch = segments.next()?.parse::<u32>().ok()?;
        if segments.next().is_some() {
            return None;
        }

        Some(Self { major, minor, patch, suffix })
    }

    pub fn major_minor(&self) -> (u32, u32) {
        (self.major, self.minor)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(suffix) = &self.suffix {
            write!(f, "-{suffix}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor && self.patch == other.patch
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_plain_version() {
        assert_eq!(Version::parse("12.4.8"), Some(Version::new(12, 4, 8)));
        assert_eq!(Version::parse("v12.4.8"), Some(Version::new(12, 4, 8)));
        assert_eq!(Version::parse("12.4.8-rc1"), Some(Version::with_suffix(12, 4, 8, "rc1")));
    }

    #[test]
    fn parses_dev_branch() {
        assert_eq!(Version::parse("dev-12.4"), Some(Version::new(12, 4, 0)));
        assert_eq!(Version::parse("dev-12.4.8"), Some(Version::new(12, 4, 8)));
    }

    #[test]
    fn rejects_symbolic_branches() {
        assert_eq!(Version::parse("dev-main"), None);
        assert_eq!(Version::parse("dev-12.4.x"), None);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Version::parse("not-a-version"), None);
        assert_eq!(Version::parse("12.4"), None);
    }

    #[test]
    fn orders_by_numeric_components_only() {
        assert!(Version::new(12, 4, 8) < Version::new(12, 4, 9));
        assert!(Version::new(12, 4, 8) < Version::new(12, 5, 0));
        assert_eq!(Version::with_suffix(12, 4, 8, "rc1"), Version::new(12, 4, 8));
    }

    proptest! {
        #[test]
        fn round_trips_through_display(major in 0u32..100, minor in 0u32..100, patch in 0u32..100) {
            let version = Version::new(major, minor, patch);
            prop_assert_eq!(Version::parse(&version.to_string()), Some(version));
        }
    }
}
