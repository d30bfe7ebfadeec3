//! Library version parsing and inclusive version ranges.
//!
//! Wraps the `semver` crate. Versions reported by the inspected library are
//! normalized once to a plain `major.minor.patch` triple; pre-release and
//! build metadata never take part in formatter gating.

use std::fmt;

use crate::error::{HostError, Result};

/// A parsed semantic version.
pub type Version = semver::Version;

/// Parse the version string reported by the inspected library.
///
/// Accepts `"3.3.0"`, `"3.3.0-beta"`, `"v3.3.0"` and the two-component form
/// `"3.3"`. The result only carries the numeric triple.
pub fn parse_library_version(s: &str) -> Result<Version> {
    let trimmed = s.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(HostError::VersionUnavailable {
            detail: "empty version string".to_string(),
        });
    }

    // Split off pre-release/build suffixes before counting components.
    let numeric_end = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (numeric, suffix) = trimmed.split_at(numeric_end);
    let normalized = match numeric.split('.').count() {
        2 => format!("{numeric}.0{suffix}"),
        _ => trimmed.to_string(),
    };

    let parsed = Version::parse(&normalized).map_err(|e| HostError::VersionUnavailable {
        detail: format!("'{s}' is not a version: {e}"),
    })?;
    Ok(Version::new(parsed.major, parsed.minor, parsed.patch))
}

/// An inclusive range of library versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    /// Lowest supported version.
    pub min: Version,
    /// Highest supported version.
    pub max: Version,
}

impl VersionRange {
    /// Create a range from two versions. The range is not validated here;
    /// see [`VersionRange::is_valid`].
    pub fn new(min: Version, max: Version) -> Self {
        VersionRange { min, max }
    }

    /// Create a range from `(major, minor, patch)` triples.
    pub fn from_triples(min: (u64, u64, u64), max: (u64, u64, u64)) -> Self {
        VersionRange {
            min: Version::new(min.0, min.1, min.2),
            max: Version::new(max.0, max.1, max.2),
        }
    }

    /// A range that covers every version.
    pub fn any() -> Self {
        VersionRange {
            min: Version::new(0, 0, 0),
            max: Version::new(u64::MAX, u64::MAX, u64::MAX),
        }
    }

    /// Whether `min <= max`.
    pub fn is_valid(&self) -> bool {
        triple(&self.min) <= triple(&self.max)
    }

    /// Check if a version lies within the range (both bounds inclusive).
    pub fn contains(&self, version: &Version) -> bool {
        let v = triple(version);
        triple(&self.min) <= v && v <= triple(&self.max)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == VersionRange::any() {
            return write!(f, "*");
        }
        write!(f, "{}..={}", self.min, self.max)
    }
}

fn triple(v: &Version) -> (u64, u64, u64) {
    (v.major, v.minor, v.patch)
}
