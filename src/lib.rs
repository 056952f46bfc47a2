//! ublkpp-recipe - build configuration for the ublkpp C++ library
//!
//! This crate resolves a recipe's options against target settings,
//! validates them, and produces the dependency requests, folder layout,
//! and toolchain parameters for the native build.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

pub use core::{
    errors::ConfigError, option::OptionName, recipe::Recipe, settings::BuildType,
    settings::Settings,
};

pub use ops::{configure, ConfigureRequest, Configured};
