//! `recipe configure` command

use anyhow::Result;

use super::{print_json, run_configure};
use crate::cli::{ConfigureArgs, OutputFormat};
use recipe::ops::write_generators;

pub fn execute(args: ConfigureArgs) -> Result<()> {
    let configured = run_configure(&args.recipe)?;

    if let Some(folder) = &args.output_folder {
        for path in write_generators(&configured, folder)? {
            tracing::info!("wrote {}", path.display());
        }
    }

    match args.format {
        OutputFormat::Json => print_json(&configured)?,
        OutputFormat::Text => {
            let mode = &configured.mode;
            let mut instrumentation = Vec::new();
            if mode.coverage {
                instrumentation.push("coverage");
            }
            if mode.sanitize {
                instrumentation.push("sanitize");
            }

            println!("{}", configured.reference);
            println!("  package id: {}", configured.package_id);
            if instrumentation.is_empty() {
                println!("  build type: {}", mode.build_type);
            } else {
                println!(
                    "  build type: {} ({})",
                    mode.build_type,
                    instrumentation.join(", ")
                );
            }
            println!("  build root: {}", configured.layout.build_root.display());

            if !configured.requirements.is_empty() {
                println!("  requires:");
                for request in &configured.requirements.requests {
                    println!("    {}", request);
                }
            }

            println!("  commands (from {}):", configured.working_dir.display());
            for command in &configured.commands {
                println!("    {}", command.join(" "));
            }
        }
    }

    Ok(())
}
