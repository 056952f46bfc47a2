//! Build configuration.
//!
//! This module validates a configuration, plans its folder layout, and
//! emits the toolchain handed to the native-build driver.

pub mod autotools;
pub mod cmake;
pub mod context;
pub mod fingerprint;
pub mod layout;
pub mod toolchain;
pub mod validation;

pub use context::BuildContext;
pub use layout::LayoutPlan;
pub use toolchain::{emit, ToolchainConfig};
pub use validation::validate;
