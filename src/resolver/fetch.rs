//! Dependency fetcher seam.
//!
//! The resolver only emits requests. Fetching, building, and version
//! solving belong to a [`DependencyFetcher`]; its failures surface as
//! [`FetchError`] and are never retried.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::dependency::DependencyKind;
use crate::resolver::errors::FetchError;
use crate::resolver::requirements::RequirementSet;
use crate::util::fs::read_to_string;

/// External collaborator that fetches requested dependencies.
pub trait DependencyFetcher {
    /// Human-readable name, for logs.
    fn name(&self) -> &str;

    /// Make every request available, or report the first failure.
    fn fetch(&self, requirements: &RequirementSet) -> Result<(), FetchError>;
}

/// Fetcher that accepts every request and only logs it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunFetcher;

impl DependencyFetcher for DryRunFetcher {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn fetch(&self, requirements: &RequirementSet) -> Result<(), FetchError> {
        for request in &requirements.requests {
            tracing::debug!("would fetch {}", request.reference());
        }
        Ok(())
    }
}

/// Fetcher backed by a local index of available versions.
///
/// The index is a TOML file:
///
/// ```toml
/// [packages]
/// sisl = ["12.3.1", "12.4.0"]
/// isa-l = ["2.30.0"]
/// ```
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LocalIndex {
    #[serde(default)]
    packages: BTreeMap<String, Vec<String>>,
}

impl LocalIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse index: {}", path.display()))
    }

    /// Register available versions of a package.
    pub fn add(&mut self, package: impl Into<String>, versions: &[&str]) -> &mut Self {
        self.packages
            .entry(package.into())
            .or_default()
            .extend(versions.iter().map(|v| v.to_string()));
        self
    }
}

impl DependencyFetcher for LocalIndex {
    fn name(&self) -> &str {
        "local-index"
    }

    fn fetch(&self, requirements: &RequirementSet) -> Result<(), FetchError> {
        for request in &requirements.requests {
            if requirements.skip_test && request.kind == DependencyKind::Test {
                tracing::debug!("skipping test requirement {}", request.reference());
                continue;
            }

            let available =
                self.packages
                    .get(&request.name)
                    .ok_or_else(|| FetchError::PackageNotFound {
                        package: request.name.clone(),
                    })?;

            let selected = available
                .iter()
                .rev()
                .find(|v| request.constraint.matches(v))
                .ok_or_else(|| FetchError::NoMatchingVersion {
                    package: request.name.clone(),
                    requirement: request.constraint.to_string(),
                    available: available.clone(),
                })?;

            tracing::debug!("{} -> {}/{}", request.reference(), request.name, selected);
        }
        Ok(())
    }
}
