//! Writing generator output for a configured recipe.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::{autotools, cmake};
use crate::core::recipe::Backend;
use crate::ops::configure::Configured;
use crate::util::fs::write_string;

/// File name of the JSON plan written next to the toolchain script.
pub const PLAN_FILE: &str = "recipe_plan.json";

/// Write the toolchain script and the JSON plan into
/// `<output_folder>/<generators_root>`.
///
/// Returns the written paths.
pub fn write_generators(configured: &Configured, output_folder: &Path) -> Result<Vec<PathBuf>> {
    let dir = output_folder.join(&configured.layout.generators_root);
    let tc = &configured.toolchain;

    let (name, script) = match tc.backend {
        Backend::Cmake => (cmake::TOOLCHAIN_FILE, cmake::render_toolchain(tc)),
        Backend::Autotools => (autotools::ENVIRONMENT_FILE, autotools::render_environment(tc)),
    };

    let script_path = dir.join(name);
    write_string(&script_path, &script)?;

    let plan = serde_json::to_string_pretty(configured).context("failed to serialize plan")?;
    let plan_path = dir.join(PLAN_FILE);
    write_string(&plan_path, &format!("{}\n", plan))?;

    tracing::info!("wrote generators to {}", dir.display());
    Ok(vec![script_path, plan_path])
}
