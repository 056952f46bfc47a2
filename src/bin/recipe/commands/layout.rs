//! `recipe layout` command

use std::path::PathBuf;

use anyhow::Result;

use super::{print_json, run_configure};
use crate::cli::{OutputFormat, QueryArgs};

pub fn execute(args: QueryArgs) -> Result<()> {
    let configured = run_configure(&args.recipe)?;
    let layout = &configured.layout;

    match args.format {
        OutputFormat::Json => print_json(layout)?,
        OutputFormat::Text => {
            println!("source root:     {}", layout.source_root.display());
            println!("build root:      {}", layout.build_root.display());
            println!("generators root: {}", layout.generators_root.display());
            println!("include dirs:    {}", join(&layout.include_dirs));
            println!("lib dirs:        {}", join(&layout.lib_dirs));
            println!("package:");
            println!("  libs:          {}", layout.package.libs.join(", "));
            println!("  include dirs:  {}", join(&layout.package.include_dirs));
            println!("  lib dirs:      {}", join(&layout.package.lib_dirs));
            println!("  licenses:      {}", layout.package.license_dir.display());
        }
    }

    Ok(())
}

fn join(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
