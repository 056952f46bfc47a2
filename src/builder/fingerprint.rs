//! Package id fingerprinting.
//!
//! The package id captures every input that changes the binary produced by
//! a configuration: the recipe reference, settings, and normalized options.
//! Identical inputs always hash to the same id.

use crate::builder::context::BuildContext;
use crate::util::hash::Fingerprint;

/// Compute the package id for a validated context.
pub fn package_id(ctx: &BuildContext) -> String {
    let settings = &ctx.settings;
    let mut fp = Fingerprint::new();

    fp.update_str(&ctx.recipe.name)
        .update_str(&ctx.recipe.version)
        .update_str(&settings.os)
        .update_str(&settings.arch)
        .update_str(settings.build_type.as_str())
        .update_str(&settings.compiler.name)
        .update_opt(settings.compiler.version.as_deref())
        .update_opt(settings.compiler.cppstd.as_deref())
        .update_opt(settings.compiler.libcxx.as_deref());

    for (name, value) in ctx.options.iter() {
        fp.update_str(name.as_str()).update_str(&value.to_string());
    }

    fp.finish()
}
