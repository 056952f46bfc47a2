//! `recipe deps` command

use anyhow::Result;

use super::{print_json, run_configure};
use crate::cli::{OutputFormat, QueryArgs};
use recipe::core::dependency::DependencyKind;

pub fn execute(args: QueryArgs) -> Result<()> {
    let configured = run_configure(&args.recipe)?;
    let requirements = &configured.requirements;

    match args.format {
        OutputFormat::Json => print_json(requirements)?,
        OutputFormat::Text => {
            for request in &requirements.requests {
                let mut notes = Vec::new();
                if request.kind == DependencyKind::Test {
                    notes.push(if requirements.skip_test {
                        "test, skipped"
                    } else {
                        "test"
                    });
                }
                if request.transitive_headers {
                    notes.push("transitive headers");
                }

                if notes.is_empty() {
                    println!("{}", request);
                } else {
                    println!("{} ({})", request, notes.join(", "));
                }
            }
        }
    }

    Ok(())
}
