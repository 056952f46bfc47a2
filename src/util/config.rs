//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.recipe/config.toml` - User-wide defaults
//! - Project: `.recipe/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.
//!
//! ```toml
//! [settings]
//! build_type = "Debug"
//! "compiler.cppstd" = "20"
//!
//! [options]
//! sanitize = true
//! "sisl/*:malloc_impl" = "jemalloc"
//!
//! [conf]
//! skip_test = false
//!
//! [deps.isa-l]
//! include_dir = "/opt/isa-l/include"
//! lib_dir = "/opt/isa-l/lib"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use toml::value::{Table, Value};

use crate::core::dependency::DependencyPaths;
use crate::core::errors::ConfigError;
use crate::core::option::OptionAssignment;
use crate::ops::configure::ConfigureRequest;
use crate::util::fs::read_to_string;

/// Recipe configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default settings, keyed like `-s` (`compiler.cppstd`)
    #[serde(deserialize_with = "flat_table")]
    pub settings: BTreeMap<String, String>,

    /// Default options, keyed like `-o` (`shared`, `sisl/*:malloc_impl`)
    #[serde(deserialize_with = "flat_table")]
    pub options: BTreeMap<String, String>,

    pub conf: ConfConfig,

    /// Dependencies sourced from non-standard locations
    pub deps: BTreeMap<String, DependencyPaths>,
}

/// Conf flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfConfig {
    /// Skip the test-execution step
    pub skip_test: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't
    /// exist or can't be read.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.settings.extend(other.settings);
        self.options.extend(other.options);
        if other.conf.skip_test.is_some() {
            self.conf.skip_test = other.conf.skip_test;
        }
        self.deps.extend(other.deps);
    }

    /// Apply the configured defaults to a request.
    ///
    /// Options are appended, so assignments added to the request afterwards
    /// override them.
    pub fn apply(&self, request: &mut ConfigureRequest) -> Result<(), ConfigError> {
        for (key, value) in &self.settings {
            request.settings.set(key, value)?;
        }
        for (key, value) in &self.options {
            let assignment: OptionAssignment = format!("{}={}", key, value).parse()?;
            request.options.push(assignment);
        }
        if let Some(skip_test) = self.conf.skip_test {
            request.conf.skip_test = skip_test;
        }
        for (name, paths) in &self.deps {
            if !paths.is_empty() {
                request.dependency_paths.insert(name.clone(), paths.clone());
            }
        }
        Ok(())
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.recipe/config.toml)
/// 2. Global config (~/.recipe/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (~/.recipe).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".recipe"))
}

/// Get the global config path (~/.recipe/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.recipe/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".recipe").join("config.toml")
}

/// Deserialize a table of scalars, joining nested keys with `.` so both
/// `compiler.cppstd = "20"` and `"compiler.cppstd" = "20"` work.
fn flat_table<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let table = Table::deserialize(deserializer)?;
    let mut out = BTreeMap::new();
    flatten("", table, &mut out).map_err(serde::de::Error::custom)?;
    Ok(out)
}

fn flatten(prefix: &str, table: Table, out: &mut BTreeMap<String, String>) -> Result<(), String> {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        };

        let text = match value {
            Value::Table(inner) => {
                flatten(&key, inner, out)?;
                continue;
            }
            Value::String(s) => s,
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(true) => "True".to_string(),
            Value::Boolean(false) => "False".to_string(),
            other => {
                return Err(format!(
                    "`{}` must be a string, number, or boolean, found {}",
                    key,
                    other.type_str()
                ))
            }
        };
        out.insert(key, text);
    }
    Ok(())
}
