//! Option schema and the option model.
//!
//! Options form a closed set of named fields ([`OptionName`]). A recipe
//! declares the subset it supports, each with a domain and a default, and
//! user overrides are checked against those declarations before anything
//! else runs. [`OptionModel::resolve`] freezes the result into a
//! [`ResolvedOptions`] value that the rest of the pipeline reads.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::core::errors::ConfigError;

/// A named build option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionName {
    /// Build a shared library instead of a static one
    #[serde(rename = "shared")]
    Shared,
    /// Position-independent code for static libraries
    #[serde(rename = "fPIC")]
    Fpic,
    /// Code coverage instrumentation
    #[serde(rename = "coverage")]
    Coverage,
    /// Address/undefined-behaviour sanitizer instrumentation
    #[serde(rename = "sanitize")]
    Sanitize,
    /// HomeBlocks storage-engine backend
    #[serde(rename = "homeblocks")]
    Homeblocks,
    /// iSCSI backend
    #[serde(rename = "iscsi")]
    Iscsi,
}

impl OptionName {
    /// Every option name, in canonical order.
    pub const ALL: [OptionName; 6] = [
        OptionName::Shared,
        OptionName::Fpic,
        OptionName::Coverage,
        OptionName::Sanitize,
        OptionName::Homeblocks,
        OptionName::Iscsi,
    ];

    /// The name as written in recipes and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionName::Shared => "shared",
            OptionName::Fpic => "fPIC",
            OptionName::Coverage => "coverage",
            OptionName::Sanitize => "sanitize",
            OptionName::Homeblocks => "homeblocks",
            OptionName::Iscsi => "iscsi",
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownOption {
                name: s.to_string(),
                known: OptionName::ALL.iter().map(|n| n.to_string()).collect(),
            })
    }
}

/// Parse a boolean option value.
///
/// Accepts the spellings recipes and profiles use in practice.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// The value of an option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    /// The boolean value, if this is a boolean option.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(true) => f.write_str("True"),
            OptionValue::Bool(false) => f.write_str("False"),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

/// The set of values an option accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionDomain {
    /// `True` or `False`
    Bool,
    /// One of a fixed list of strings
    Choices(Vec<String>),
}

impl OptionDomain {
    /// Check whether a value lies in this domain.
    pub fn contains(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (OptionDomain::Bool, OptionValue::Bool(_)) => true,
            (OptionDomain::Choices(choices), OptionValue::Str(s)) => choices.contains(s),
            _ => false,
        }
    }

    /// Parse a raw string into a value of this domain.
    pub fn parse(&self, name: OptionName, raw: &str) -> Result<OptionValue, ConfigError> {
        let value = match self {
            OptionDomain::Bool => parse_bool(raw).map(OptionValue::Bool),
            OptionDomain::Choices(choices) => choices
                .iter()
                .find(|c| c.as_str() == raw)
                .map(|c| OptionValue::Str(c.clone())),
        };

        value.ok_or_else(|| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            expected: self.to_string(),
        })
    }
}

impl fmt::Display for OptionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionDomain::Bool => f.write_str("True, False"),
            OptionDomain::Choices(choices) => f.write_str(&choices.join(", ")),
        }
    }
}

/// A declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    pub name: OptionName,
    pub domain: OptionDomain,
    pub default: OptionValue,
}

impl OptionDecl {
    /// Declare a boolean option.
    pub fn boolean(name: OptionName, default: bool) -> Self {
        OptionDecl {
            name,
            domain: OptionDomain::Bool,
            default: OptionValue::Bool(default),
        }
    }
}

/// Mutable option state for a single configuration pass.
#[derive(Debug, Clone, Default)]
pub struct OptionModel {
    decls: Vec<OptionDecl>,
    overrides: BTreeMap<OptionName, OptionValue>,
}

impl OptionModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an option. Redeclaring a name replaces the earlier
    /// declaration in place.
    pub fn declare(
        &mut self,
        name: OptionName,
        domain: OptionDomain,
        default: impl Into<OptionValue>,
    ) -> Result<&mut Self, ConfigError> {
        let default = default.into();
        if !domain.contains(&default) {
            return Err(ConfigError::InvalidValue {
                name: name.to_string(),
                value: default.to_string(),
                expected: domain.to_string(),
            });
        }

        let decl = OptionDecl {
            name,
            domain,
            default,
        };
        match self.decls.iter_mut().find(|d| d.name == name) {
            Some(existing) => *existing = decl,
            None => self.decls.push(decl),
        }
        Ok(self)
    }

    /// Declared options, in declaration order.
    pub fn declarations(&self) -> &[OptionDecl] {
        &self.decls
    }

    /// Whether `name` refers to a declared option.
    pub fn is_declared(&self, name: &str) -> bool {
        name.parse::<OptionName>()
            .is_ok_and(|option| self.decl(option).is_some())
    }

    /// Override a default from its textual form.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let option: OptionName = name.parse().map_err(|_| self.unknown(name))?;
        let decl = self.decl(option).ok_or_else(|| self.unknown(name))?;
        let value = decl.domain.parse(option, value)?;
        self.overrides.insert(option, value);
        Ok(())
    }

    /// Override a default with a typed value.
    pub fn set_value(
        &mut self,
        name: OptionName,
        value: impl Into<OptionValue>,
    ) -> Result<(), ConfigError> {
        let value = value.into();
        let decl = self
            .decl(name)
            .ok_or_else(|| self.unknown(name.as_str()))?;
        if !decl.domain.contains(&value) {
            return Err(ConfigError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                expected: decl.domain.to_string(),
            });
        }
        self.overrides.insert(name, value);
        Ok(())
    }

    /// Freeze the model into a fully-defaulted option set.
    pub fn resolve(self) -> ResolvedOptions {
        let OptionModel {
            decls,
            mut overrides,
        } = self;

        let entries = decls
            .into_iter()
            .map(|decl| {
                let value = overrides.remove(&decl.name).unwrap_or(decl.default);
                (decl.name, value)
            })
            .collect();

        ResolvedOptions { entries }
    }

    fn decl(&self, name: OptionName) -> Option<&OptionDecl> {
        self.decls.iter().find(|d| d.name == name)
    }

    fn unknown(&self, name: &str) -> ConfigError {
        ConfigError::UnknownOption {
            name: name.to_string(),
            known: self.decls.iter().map(|d| d.name.to_string()).collect(),
        }
    }
}

/// The frozen option set produced by [`OptionModel::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedOptions {
    entries: Vec<(OptionName, OptionValue)>,
}

impl ResolvedOptions {
    /// Look up an option. `None` if the option is not part of the set.
    pub fn get(&self, name: OptionName) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// True if the option is present and set to `True`.
    pub fn enabled(&self, name: OptionName) -> bool {
        self.get(name).and_then(OptionValue::as_bool).unwrap_or(false)
    }

    /// True if the option is part of the set at all.
    pub fn contains(&self, name: OptionName) -> bool {
        self.get(name).is_some()
    }

    /// A copy of this set with one option removed.
    pub fn without(&self, name: OptionName) -> ResolvedOptions {
        ResolvedOptions {
            entries: self
                .entries
                .iter()
                .filter(|(n, _)| *n != name)
                .cloned()
                .collect(),
        }
    }

    /// Iterate options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionName, &OptionValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ResolvedOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}

/// An option assignment as written by the user, e.g. `shared=True` or
/// `sisl/*:malloc_impl=tcmalloc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionAssignment {
    /// Package pattern the assignment is scoped to, if any
    pub scope: Option<String>,
    pub name: String,
    pub value: String,
}

impl OptionAssignment {
    /// Create an unscoped assignment.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        OptionAssignment {
            scope: None,
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether this assignment targets the given package.
    pub fn applies_to(&self, package: &str) -> bool {
        match self.scope.as_deref() {
            None | Some("*") => true,
            Some(scope) => {
                scope == package
                    || scope
                        .strip_prefix(package)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }

    /// Turn a scoped assignment into an option for another package.
    pub fn into_package_option(self) -> PackageOption {
        PackageOption {
            pattern: self.scope.unwrap_or_else(|| "*".to_string()),
            name: self.name,
            value: self.value,
        }
    }
}

impl FromStr for OptionAssignment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s.split_once('=').ok_or_else(|| ConfigError::InvalidSetting {
            key: s.to_string(),
            value: String::new(),
            reason: "expected `name=value`".to_string(),
        })?;

        let (scope, name) = match key.split_once(':') {
            Some((scope, name)) => (Some(scope.trim().to_string()), name),
            None => (None, key),
        };

        Ok(OptionAssignment {
            scope,
            name: name.trim().to_string(),
            value: value.trim().to_string(),
        })
    }
}

impl fmt::Display for OptionAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{}:", scope)?;
        }
        write!(f, "{}={}", self.name, self.value)
    }
}

/// An option forwarded to a dependency, e.g. `sisl/*:malloc_impl=tcmalloc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageOption {
    pub pattern: String,
    pub name: String,
    pub value: String,
}

impl PackageOption {
    pub fn new(
        pattern: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        PackageOption {
            pattern: pattern.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for PackageOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.pattern, self.name, self.value)
    }
}
