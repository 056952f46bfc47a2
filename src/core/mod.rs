//! Core data structures.
//!
//! This module contains the typed configuration inputs:
//! - The option schema and model
//! - Target settings and the derived build mode
//! - Dependency specifications
//! - Recipe definitions
//! - The configuration error taxonomy

pub mod dependency;
pub mod errors;
pub mod option;
pub mod recipe;
pub mod settings;

pub use dependency::{Condition, DependencyKind, DependencyPaths, DependencyRequest, DependencySpec};
pub use errors::ConfigError;
pub use option::{
    OptionAssignment, OptionDecl, OptionDomain, OptionModel, OptionName, OptionValue,
    PackageOption, ResolvedOptions,
};
pub use recipe::{Backend, Recipe, RecipeError};
pub use settings::{BuildMode, BuildType, Conf, Settings};
