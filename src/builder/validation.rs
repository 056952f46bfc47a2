//! Option validation.
//!
//! Validation runs in a fixed order and stops at the first violated rule:
//! 1. Normalization - `shared` makes `fPIC` implied, so it is dropped
//! 2. Mutual exclusion - coverage and sanitize in a Debug build
//! 3. Testing precondition - instrumentation while tests are skipped
//! 4. C++ standard - the compiler must meet the recipe minimum
//!
//! The input context is never modified; on success the normalized option
//! set is returned.

use crate::builder::context::BuildContext;
use crate::core::errors::ConfigError;
use crate::core::option::{OptionName, ResolvedOptions};
use crate::core::settings::{BuildType, SKIP_TEST_CONF};

/// Validate a context and return the normalized option set.
pub fn validate(ctx: &BuildContext) -> Result<ResolvedOptions, ConfigError> {
    let options = normalize(&ctx.options);
    let validator = Validator { ctx, options: &options };

    validator.validate_exclusion()?;
    validator.validate_testing()?;
    validator.validate_cppstd()?;

    Ok(options)
}

/// Drop option decision points that other options make implied.
pub fn normalize(options: &ResolvedOptions) -> ResolvedOptions {
    if options.enabled(OptionName::Shared) && options.contains(OptionName::Fpic) {
        tracing::debug!("shared=True, removing fPIC");
        options.without(OptionName::Fpic)
    } else {
        options.clone()
    }
}

struct Validator<'a> {
    ctx: &'a BuildContext,
    options: &'a ResolvedOptions,
}

impl Validator<'_> {
    fn validate_exclusion(&self) -> Result<(), ConfigError> {
        if self.ctx.build_type() != BuildType::Debug {
            return Ok(());
        }

        if self.options.enabled(OptionName::Coverage) && self.options.enabled(OptionName::Sanitize)
        {
            return Err(ConfigError::IncompatibleOptions {
                first: OptionName::Coverage,
                second: OptionName::Sanitize,
                build_type: BuildType::Debug,
            });
        }

        Ok(())
    }

    fn validate_testing(&self) -> Result<(), ConfigError> {
        if self.ctx.build_type() != BuildType::Debug || !self.ctx.skip_test() {
            return Ok(());
        }

        let instrumented = [OptionName::Coverage, OptionName::Sanitize]
            .into_iter()
            .find(|name| self.options.enabled(*name));

        match instrumented {
            Some(option) => Err(ConfigError::RequiresTesting {
                option,
                flag: SKIP_TEST_CONF.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn validate_cppstd(&self) -> Result<(), ConfigError> {
        let Some(required) = self.ctx.recipe.min_cppstd else {
            return Ok(());
        };
        let Some(found) = self.ctx.settings.cppstd_level() else {
            return Ok(());
        };

        if found < required {
            return Err(ConfigError::CppStdTooLow {
                package: self.ctx.recipe.name.clone(),
                required,
                found: self.ctx.settings.compiler.cppstd.clone().unwrap_or_default(),
            });
        }

        Ok(())
    }
}
