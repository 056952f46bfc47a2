//! Command implementations

pub mod completions;
pub mod configure;
pub mod deps;
pub mod layout;
pub mod options;
pub mod toolchain;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::RecipeArgs;
use recipe::core::errors::ConfigError;
use recipe::resolver::{DependencyFetcher, DryRunFetcher, LocalIndex};
use recipe::util::config::{global_config_path, load_config, project_config_path};
use recipe::{ops, ConfigureRequest, Configured, Recipe};

/// Load the recipe selected on the command line.
pub fn load_recipe(args: &RecipeArgs) -> Result<Arc<Recipe>> {
    let recipe = match &args.recipe {
        Some(path) => Recipe::load(path)?,
        None => Recipe::builtin(&args.package)?,
    };
    Ok(Arc::new(recipe))
}

/// Build a request from config files, then command-line flags.
pub fn build_request(args: &RecipeArgs) -> Result<ConfigureRequest> {
    let mut request = ConfigureRequest::default();

    if !args.no_config {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let config = load_config(
            global_config_path().as_deref(),
            &project_config_path(&cwd),
        );
        config.apply(&mut request)?;
    }

    for raw in &args.settings {
        let (key, value) = split_pair(raw)?;
        request.settings.set(key, value)?;
    }
    for raw in &args.conf {
        let (key, value) = split_pair(raw)?;
        request.conf.set(key, value)?;
    }
    for raw in &args.options {
        request.options.push(raw.parse()?);
    }

    Ok(request)
}

/// Run the full configuration pipeline for the command-line inputs.
pub fn run_configure(args: &RecipeArgs) -> Result<Configured> {
    configure_recipe(load_recipe(args)?, args)
}

/// Run the configuration pipeline for an already loaded recipe.
pub fn configure_recipe(recipe: Arc<Recipe>, args: &RecipeArgs) -> Result<Configured> {
    let request = build_request(args)?;

    let fetcher: Box<dyn DependencyFetcher> = match &args.index {
        Some(path) => Box::new(LocalIndex::load(path)?),
        None => Box::new(DryRunFetcher),
    };

    Ok(ops::configure(recipe, request, fetcher.as_ref())?)
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn split_pair(raw: &str) -> Result<(&str, &str), ConfigError> {
    raw.split_once('=').ok_or_else(|| ConfigError::InvalidSetting {
        key: raw.to_string(),
        value: String::new(),
        reason: "expected `key=value`".to_string(),
    })
}
