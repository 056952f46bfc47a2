//! Version constraints carried by dependency requests.
//!
//! Upstream references use two shapes: an exact version string, which need
//! not be semver (`nbi.1.5.0`), and a bracketed range (`[^12.3]`,
//! `[>=1.0 <2.0]`). Ranges are parsed with `semver` so a fetcher can test
//! candidate versions against them.

use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::{Serialize, Serializer};

/// Error returned when a constraint cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version constraint `{input}`: {reason}")]
pub struct ConstraintParseError {
    pub input: String,
    pub reason: String,
}

/// An exact version or a version range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    Exact(String),
    Range(VersionReq),
}

impl VersionConstraint {
    /// Check whether a concrete version satisfies this constraint.
    pub fn matches(&self, version: &str) -> bool {
        match self {
            VersionConstraint::Exact(exact) => exact == version,
            VersionConstraint::Range(req) => {
                parse_version_lenient(version).is_some_and(|v| req.matches(&v))
            }
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, VersionConstraint::Range(_))
    }
}

impl FromStr for VersionConstraint {
    type Err = ConstraintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConstraintParseError {
                input: s.to_string(),
                reason: "empty constraint".to_string(),
            });
        }

        match s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            Some(inner) => {
                // Space-separated comparators become semver's comma form
                let normalized = inner
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ");
                VersionReq::parse(&normalized)
                    .map(VersionConstraint::Range)
                    .map_err(|e| ConstraintParseError {
                        input: s.to_string(),
                        reason: e.to_string(),
                    })
            }
            None if s.contains(char::is_whitespace) || s.starts_with('[') => {
                Err(ConstraintParseError {
                    input: s.to_string(),
                    reason: "exact versions cannot contain spaces or brackets".to_string(),
                })
            }
            None => Ok(VersionConstraint::Exact(s.to_string())),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Exact(v) => f.write_str(v),
            VersionConstraint::Range(req) => write!(f, "[{}]", req),
        }
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a version string, allowing for incomplete versions.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = s.split('.').collect();
    match parts.len() {
        1 => {
            let major: u64 = parts[0].parse().ok()?;
            Some(Version::new(major, 0, 0))
        }
        2 => {
            let major: u64 = parts[0].parse().ok()?;
            let minor: u64 = parts[1].parse().ok()?;
            Some(Version::new(major, minor, 0))
        }
        _ => None,
    }
}
