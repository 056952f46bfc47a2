//! `recipe options` command

use std::collections::BTreeMap;

use anyhow::Result;

use super::{configure_recipe, load_recipe, print_json};
use crate::cli::{OutputFormat, QueryArgs};

pub fn execute(args: QueryArgs) -> Result<()> {
    let recipe = load_recipe(&args.recipe)?;
    let configured = configure_recipe(recipe.clone(), &args.recipe)?;
    let options = &configured.options;

    match args.format {
        OutputFormat::Json => {
            let mut out = BTreeMap::new();
            out.insert("options", serde_json::to_value(options)?);
            out.insert(
                "dependency_options",
                serde_json::to_value(&configured.toolchain.dependency_options)?,
            );
            print_json(&out)?
        }
        OutputFormat::Text => {
            for decl in &recipe.options {
                let value = match options.get(decl.name) {
                    Some(value) => value.to_string(),
                    None => "-".to_string(),
                };
                println!(
                    "{:<12} {:<6} (default: {}, accepts: {})",
                    decl.name.as_str(),
                    value,
                    decl.default,
                    decl.domain
                );
            }

            let forwarded = &configured.toolchain.dependency_options;
            if !forwarded.is_empty() {
                println!();
                println!("forwarded to dependencies:");
                for option in forwarded {
                    println!("  {}", option);
                }
            }
        }
    }

    Ok(())
}
