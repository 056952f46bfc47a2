//! High-level operations.
//!
//! This module contains the implementation of recipe commands.

pub mod configure;
pub mod generate;

pub use configure::{configure, ConfigureRequest, Configured};
pub use generate::write_generators;
