//! Configuration error taxonomy.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::option::OptionName;
use crate::core::settings::{BuildType, SKIP_TEST_CONF};
use crate::util::diagnostic::Diagnostic;

/// Error raised while configuring a recipe.
///
/// Every variant is detected before any requirement, layout, or toolchain
/// output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ConfigError {
    #[error("unknown option `{name}`")]
    #[diagnostic(code(recipe::options::unknown))]
    UnknownOption { name: String, known: Vec<String> },

    #[error("invalid value `{value}` for option `{name}`")]
    #[diagnostic(code(recipe::options::invalid_value))]
    InvalidValue {
        name: String,
        value: String,
        expected: String,
    },

    #[error("`{second}` does not work with `{first}` in a {build_type} build")]
    #[diagnostic(
        code(recipe::validate::incompatible),
        help("Disable either coverage or sanitize")
    )]
    IncompatibleOptions {
        first: OptionName,
        second: OptionName,
        build_type: BuildType,
    },

    #[error("`{option}` requires testing, but `{flag}` is set")]
    #[diagnostic(
        code(recipe::validate::requires_testing),
        help("Instrumented builds are only useful when the tests run")
    )]
    RequiresTesting { option: OptionName, flag: String },

    #[error("`{package}` requires at least C++{required}, but `compiler.cppstd={found}`")]
    #[diagnostic(code(recipe::validate::cppstd))]
    CppStdTooLow {
        package: String,
        required: u32,
        found: String,
    },

    #[error("invalid setting `{key}={value}`: {reason}")]
    #[diagnostic(code(recipe::settings::invalid))]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("could not resolve dependency `{package}`: {message}")]
    #[diagnostic(code(recipe::deps::unresolved))]
    DependencyUnresolved { package: String, message: String },

    /// Two build modes mapped to the same build root. Build root precedence
    /// keeps this unreachable for now.
    #[error("build layouts collide at `{build_root}`")]
    #[diagnostic(code(recipe::layout::conflict))]
    LayoutConflict { build_root: String },
}

impl ConfigError {
    /// Short name of the violated rule.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::UnknownOption { .. } => "UnknownOption",
            ConfigError::InvalidValue { .. } => "InvalidValue",
            ConfigError::IncompatibleOptions { .. } => "IncompatibleOptions",
            ConfigError::RequiresTesting { .. } => "RequiresTesting",
            ConfigError::CppStdTooLow { .. } => "CppStdTooLow",
            ConfigError::InvalidSetting { .. } => "InvalidSetting",
            ConfigError::DependencyUnresolved { .. } => "DependencyUnresolved",
            ConfigError::LayoutConflict { .. } => "LayoutConflict",
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());

        match self {
            ConfigError::UnknownOption { known, .. } => {
                let mut diag = diag;
                if !known.is_empty() {
                    diag = diag.with_context(format!("declared options: {}", known.join(", ")));
                }
                diag.with_suggestion("Check the option name with `recipe options`")
            }

            ConfigError::InvalidValue { name, expected, .. } => diag
                .with_context(format!("`{}` accepts: {}", name, expected))
                .with_suggestion(format!("Pass one of the accepted values: -o {}=<value>", name)),

            ConfigError::IncompatibleOptions {
                first,
                second,
                build_type,
            } => diag
                .with_context(format!("{}=True", first))
                .with_context(format!("{}=True", second))
                .with_context(format!("build_type={}", build_type))
                .with_suggestion(format!("Drop `-o {}=True`", first))
                .with_suggestion(format!("Drop `-o {}=True`", second)),

            ConfigError::RequiresTesting { option, flag } => diag
                .with_context(format!("{}=True", option))
                .with_context(format!("{}=True", flag))
                .with_suggestion(format!("Remove `-c {}=True`", SKIP_TEST_CONF))
                .with_suggestion(format!("Drop `-o {}=True`", option)),

            ConfigError::CppStdTooLow { required, .. } => diag.with_suggestion(format!(
                "Pass `-s compiler.cppstd={}` or newer",
                required
            )),

            ConfigError::InvalidSetting { .. } => {
                diag.with_suggestion("Settings are passed as `-s key=value`")
            }

            ConfigError::DependencyUnresolved { package, .. } => diag
                .with_suggestion(format!("Check that `{}` is available to the fetcher", package))
                .with_suggestion("Disable the option that pulls it in"),

            ConfigError::LayoutConflict { .. } => diag,
        }
    }
}
