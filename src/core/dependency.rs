//! Dependency specification.
//!
//! A [`DependencySpec`] is declared once per upstream library and turns
//! into a [`DependencyRequest`] only when its [`Condition`] holds against
//! the resolved options.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::option::{OptionName, ResolvedOptions};
use crate::resolver::version::VersionConstraint;

/// Predicate deciding whether a dependency is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    Always,
    /// Requested when the option is `True`
    Enabled(OptionName),
    /// Requested when the option is absent or `False`
    Disabled(OptionName),
}

impl Condition {
    /// Evaluate against a resolved option set.
    pub fn holds(&self, options: &ResolvedOptions) -> bool {
        match self {
            Condition::Always => true,
            Condition::Enabled(name) => options.enabled(*name),
            Condition::Disabled(name) => !options.enabled(*name),
        }
    }
}

impl FromStr for Condition {
    type Err = crate::core::errors::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix('!') {
            Some(name) => Ok(Condition::Disabled(name.trim().parse()?)),
            None => Ok(Condition::Enabled(s.parse()?)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("always"),
            Condition::Enabled(name) => write!(f, "{}", name),
            Condition::Disabled(name) => write!(f, "!{}", name),
        }
    }
}

/// Whether a dependency is needed to build or only to test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Regular,
    Test,
}

/// A declared upstream library requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    pub name: String,
    pub constraint: VersionConstraint,
    /// `user/channel` suffix of the reference, e.g. `oss/master`
    pub channel: Option<String>,
    pub condition: Condition,
    pub kind: DependencyKind,
    /// Expose the dependency's headers to our own consumers
    pub transitive_headers: bool,
}

impl DependencySpec {
    /// Create an unconditional regular dependency.
    pub fn new(name: impl Into<String>, constraint: VersionConstraint) -> Self {
        DependencySpec {
            name: name.into(),
            constraint,
            channel: None,
            condition: Condition::Always,
            kind: DependencyKind::Regular,
            transitive_headers: false,
        }
    }

    /// Set the `user/channel`.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Only request the dependency when `condition` holds.
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Mark as a test-only requirement.
    pub fn test(mut self) -> Self {
        self.kind = DependencyKind::Test;
        self
    }

    /// Propagate headers to consumers.
    pub fn transitive_headers(mut self, enabled: bool) -> Self {
        self.transitive_headers = enabled;
        self
    }

    /// Materialize a request if the condition holds.
    pub fn request(&self, options: &ResolvedOptions) -> Option<DependencyRequest> {
        if !self.condition.holds(options) {
            return None;
        }

        Some(DependencyRequest {
            name: self.name.clone(),
            constraint: self.constraint.clone(),
            channel: self.channel.clone(),
            kind: self.kind,
            transitive_headers: self.transitive_headers,
        })
    }
}

/// A concrete request handed to the dependency fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRequest {
    pub name: String,
    pub constraint: VersionConstraint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub kind: DependencyKind,
    pub transitive_headers: bool,
}

impl DependencyRequest {
    /// Full reference, e.g. `sisl/[^12.3]@oss/master`.
    pub fn reference(&self) -> String {
        match &self.channel {
            Some(channel) => format!("{}/{}@{}", self.name, self.constraint, channel),
            None => format!("{}/{}", self.name, self.constraint),
        }
    }
}

impl fmt::Display for DependencyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference())
    }
}

/// Non-standard location of a dependency's headers and libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyPaths {
    pub include_dir: Option<PathBuf>,
    pub lib_dir: Option<PathBuf>,
}

impl DependencyPaths {
    pub fn is_empty(&self) -> bool {
        self.include_dir.is_none() && self.lib_dir.is_none()
    }
}
