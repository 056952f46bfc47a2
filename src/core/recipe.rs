//! Recipe definitions.
//!
//! A recipe describes one native package: its metadata, the options it
//! declares, the upstream libraries it depends on, and the knobs the
//! toolchain emitter needs. Recipes are written in TOML; the built-in ones
//! live under `recipes/` and are compiled into the binary.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dependency::{Condition, DependencyKind, DependencySpec};
use crate::core::errors::ConfigError;
use crate::core::option::{OptionDecl, OptionDomain, OptionModel, OptionName, OptionValue};
use crate::resolver::version::{ConstraintParseError, VersionConstraint};
use crate::util::fs::read_to_string;

const UBLKPP_RECIPE: &str = include_str!("../../recipes/ublkpp.toml");
const LIBISCSI_RECIPE: &str = include_str!("../../recipes/libiscsi.toml");

/// Names of the recipes compiled into the binary.
pub const BUILTIN_RECIPES: [&str; 2] = ["ublkpp", "libiscsi"];

/// Error loading a recipe definition.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("failed to parse recipe: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid requirement `{name}`: {source}")]
    Constraint {
        name: String,
        #[source]
        source: ConstraintParseError,
    },

    #[error("invalid recipe: {0}")]
    Invalid(#[from] ConfigError),

    #[error("option `{0}` is declared more than once")]
    DuplicateOption(OptionName),

    #[error("unknown built-in recipe `{0}`")]
    UnknownBuiltin(String),
}

/// Native build backend driven by the emitted toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    #[serde(alias = "CMake")]
    Cmake,
    Autotools,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Cmake => write!(f, "cmake"),
            Backend::Autotools => write!(f, "autotools"),
        }
    }
}

/// Option override the recipe applies to one of its dependencies outside
/// Debug builds, selecting an allocator implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorOverride {
    pub package: String,
    pub option: String,
    pub value: String,
}

/// CMake package names exported to consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CMakeNames {
    pub file_name: Option<String>,
    pub target_name: Option<String>,
}

/// A validated recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub backend: Backend,
    pub options: Vec<OptionDecl>,
    pub requirements: Vec<DependencySpec>,
    pub min_cppstd: Option<u32>,
    /// Extra C flags, e.g. to silence a noisy warning class
    pub cflags: Vec<String>,
    /// Configure arguments only passed in Debug builds
    pub debug_configure_args: Vec<String>,
    pub sanitizer_link_flags: Vec<String>,
    pub allocator: Option<AllocatorOverride>,
    pub cmake: CMakeNames,
    pub libs: Vec<String>,
}

impl Recipe {
    /// Load a built-in recipe by name.
    pub fn builtin(name: &str) -> Result<Recipe, RecipeError> {
        match name {
            "ublkpp" => UBLKPP_RECIPE.parse(),
            "libiscsi" => LIBISCSI_RECIPE.parse(),
            other => Err(RecipeError::UnknownBuiltin(other.to_string())),
        }
    }

    /// The ublkpp recipe.
    pub fn ublkpp() -> Result<Recipe, RecipeError> {
        Recipe::builtin("ublkpp")
    }

    /// Load a recipe from a TOML file.
    pub fn load(path: &Path) -> Result<Recipe> {
        let contents = read_to_string(path)?;

        contents
            .parse()
            .with_context(|| format!("failed to load recipe: {}", path.display()))
    }

    /// A fresh option model with every declared option registered.
    pub fn option_model(&self) -> Result<OptionModel, ConfigError> {
        let mut model = OptionModel::new();
        for decl in &self.options {
            model.declare(decl.name, decl.domain.clone(), decl.default.clone())?;
        }
        Ok(model)
    }

    /// `name/version`
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl FromStr for Recipe {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let file: RecipeFile = toml::from_str(s)?;
        file.into_recipe()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeFile {
    package: PackageSection,
    #[serde(default)]
    options: Vec<OptionEntry>,
    #[serde(default)]
    requires: Vec<RequireEntry>,
    allocator: Option<AllocatorOverride>,
    #[serde(default)]
    cmake: CMakeNames,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageSection {
    name: String,
    version: String,
    description: Option<String>,
    license: Option<String>,
    homepage: Option<String>,
    #[serde(default)]
    backend: Backend,
    min_cppstd: Option<u32>,
    #[serde(default)]
    libs: Vec<String>,
    #[serde(default)]
    cflags: Vec<String>,
    #[serde(default)]
    debug_configure_args: Vec<String>,
    #[serde(default)]
    sanitizer_link_flags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionEntry {
    name: OptionName,
    default: OptionValue,
    values: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequireEntry {
    name: String,
    version: String,
    channel: Option<String>,
    when: Option<String>,
    #[serde(default)]
    kind: DependencyKind,
    #[serde(default)]
    transitive_headers: bool,
}

impl RecipeFile {
    fn into_recipe(self) -> Result<Recipe, RecipeError> {
        let mut seen = HashSet::new();
        let mut options = Vec::with_capacity(self.options.len());
        for entry in self.options {
            if !seen.insert(entry.name) {
                return Err(RecipeError::DuplicateOption(entry.name));
            }
            let domain = match entry.values {
                Some(values) => OptionDomain::Choices(values),
                None => OptionDomain::Bool,
            };
            options.push(OptionDecl {
                name: entry.name,
                domain,
                default: entry.default,
            });
        }

        let mut requirements = Vec::with_capacity(self.requires.len());
        for entry in self.requires {
            let constraint: VersionConstraint =
                entry
                    .version
                    .parse()
                    .map_err(|source| RecipeError::Constraint {
                        name: entry.name.clone(),
                        source,
                    })?;

            let condition = match entry.when.as_deref() {
                Some(when) => {
                    let condition: Condition = when.parse()?;
                    if let Condition::Enabled(name) | Condition::Disabled(name) = condition {
                        if !seen.contains(&name) {
                            return Err(RecipeError::Invalid(ConfigError::UnknownOption {
                                name: name.to_string(),
                                known: options.iter().map(|d| d.name.to_string()).collect(),
                            }));
                        }
                    }
                    condition
                }
                None => Condition::Always,
            };

            let mut spec = DependencySpec::new(entry.name, constraint)
                .when(condition)
                .transitive_headers(entry.transitive_headers);
            if let Some(channel) = entry.channel {
                spec = spec.channel(channel);
            }
            if entry.kind == DependencyKind::Test {
                spec = spec.test();
            }
            requirements.push(spec);
        }

        let recipe = Recipe {
            name: self.package.name,
            version: self.package.version,
            description: self.package.description,
            license: self.package.license,
            homepage: self.package.homepage,
            backend: self.package.backend,
            options,
            requirements,
            min_cppstd: self.package.min_cppstd,
            cflags: self.package.cflags,
            debug_configure_args: self.package.debug_configure_args,
            sanitizer_link_flags: self.package.sanitizer_link_flags,
            allocator: self.allocator,
            cmake: self.cmake,
            libs: self.package.libs,
        };

        // Defaults must lie in their domains
        recipe.option_model()?;

        Ok(recipe)
    }
}
