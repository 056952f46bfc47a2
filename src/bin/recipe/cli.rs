//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// recipe - configure the ublkpp build
#[derive(Parser)]
#[command(name = "recipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve options, requirements, layout, and toolchain
    Configure(ConfigureArgs),

    /// Show declared options and their resolved values
    Options(QueryArgs),

    /// Show the dependency requests for a configuration
    Deps(QueryArgs),

    /// Show the folder layout for a configuration
    Layout(QueryArgs),

    /// Print the toolchain handed to the native-build driver
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Recipe selection and configuration inputs, shared by every command.
#[derive(Args, Clone)]
pub struct RecipeArgs {
    /// Built-in recipe to configure (ublkpp, libiscsi)
    #[arg(long, default_value = "ublkpp", conflicts_with = "recipe")]
    pub package: String,

    /// Load the recipe from a TOML file instead
    #[arg(long, value_name = "PATH")]
    pub recipe: Option<PathBuf>,

    /// Setting, e.g. `-s build_type=Debug`
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Option, e.g. `-o sanitize=True` or `-o sisl/*:malloc_impl=jemalloc`
    #[arg(short = 'o', long = "option", value_name = "[PATTERN:]NAME=VALUE")]
    pub options: Vec<String>,

    /// Conf flag, e.g. `-c tools.build:skip_test=True`
    #[arg(short = 'c', long = "conf", value_name = "KEY=VALUE")]
    pub conf: Vec<String>,

    /// Check requirements against a local version index
    #[arg(long, value_name = "PATH", env = "RECIPE_INDEX")]
    pub index: Option<PathBuf>,

    /// Ignore global and project config files
    #[arg(long)]
    pub no_config: bool,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write generator files under this folder
    #[arg(long, value_name = "DIR")]
    pub output_folder: Option<PathBuf>,
}

#[derive(Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum ToolchainFormat {
    /// The script for the recipe's build backend
    #[default]
    Native,
    Cmake,
    Shell,
    Json,
}

#[derive(Args)]
pub struct ToolchainArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: ToolchainFormat,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
