//! `recipe toolchain` command

use anyhow::Result;

use super::{print_json, run_configure};
use crate::cli::{ToolchainArgs, ToolchainFormat};
use recipe::builder::{autotools, cmake};
use recipe::core::recipe::Backend;

pub fn execute(args: ToolchainArgs) -> Result<()> {
    let configured = run_configure(&args.recipe)?;
    let tc = &configured.toolchain;

    let format = match (args.format, tc.backend) {
        (ToolchainFormat::Native, Backend::Cmake) => ToolchainFormat::Cmake,
        (ToolchainFormat::Native, Backend::Autotools) => ToolchainFormat::Shell,
        (format, _) => format,
    };

    match format {
        ToolchainFormat::Json => print_json(tc)?,
        ToolchainFormat::Shell => print!("{}", autotools::render_environment(tc)),
        ToolchainFormat::Cmake | ToolchainFormat::Native => {
            print!("{}", cmake::render_toolchain(tc))
        }
    }

    Ok(())
}
