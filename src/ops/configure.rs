//! Implementation of `recipe configure`.
//!
//! Runs the configuration stages in a fixed order, each taking the output
//! of the previous one:
//!
//! ```text
//! options -> validate -> requirements -> fetch -> layout -> toolchain
//! ```
//!
//! A failing stage stops the pipeline; nothing downstream of it is produced.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::builder::context::BuildContext;
use crate::builder::layout::{self, LayoutPlan};
use crate::builder::toolchain::{self, ToolchainConfig};
use crate::builder::validation::validate;
use crate::builder::{autotools, cmake, fingerprint};
use crate::core::dependency::DependencyPaths;
use crate::core::errors::ConfigError;
use crate::core::option::{OptionAssignment, OptionName, PackageOption, ResolvedOptions};
use crate::core::recipe::{Backend, Recipe};
use crate::core::settings::{BuildMode, Conf, Settings};
use crate::resolver::fetch::DependencyFetcher;
use crate::resolver::requirements::{self, RequirementSet};

/// Inputs for one configuration pass.
#[derive(Debug, Clone, Default)]
pub struct ConfigureRequest {
    /// Target settings
    pub settings: Settings,

    /// Conf flags
    pub conf: Conf,

    /// Option assignments in the order given; later assignments win
    pub options: Vec<OptionAssignment>,

    /// Dependencies sourced from non-standard locations
    pub dependency_paths: BTreeMap<String, DependencyPaths>,
}

/// Everything a successful configuration produces.
#[derive(Debug, Clone, Serialize)]
pub struct Configured {
    /// `name/version`
    pub reference: String,
    pub package_id: String,
    pub settings: Settings,
    pub conf: Conf,
    /// Normalized options
    pub options: ResolvedOptions,
    pub mode: BuildMode,
    pub requirements: RequirementSet,
    pub layout: LayoutPlan,
    pub toolchain: ToolchainConfig,
    /// Directory the driver commands run from
    pub working_dir: PathBuf,
    /// Driver command lines, in execution order
    pub commands: Vec<Vec<String>>,
}

/// Configure a recipe.
pub fn configure(
    recipe: Arc<Recipe>,
    request: ConfigureRequest,
    fetcher: &dyn DependencyFetcher,
) -> Result<Configured, ConfigError> {
    let ConfigureRequest {
        settings,
        conf,
        options: assignments,
        dependency_paths,
    } = request;

    tracing::debug!("configuring {}", recipe.reference());

    let (options, forwarded) = apply_options(&recipe, assignments)?;
    tracing::debug!("options: {}", describe(&options));

    let ctx = BuildContext::new(recipe.clone(), settings, conf, options)
        .with_package_options(forwarded)
        .with_dependency_paths(dependency_paths);

    let normalized = validate(&ctx)?;
    let ctx = ctx.with_options(normalized);
    warn_debug_only_toggles(&ctx);

    let mode = ctx.mode();
    let requirements = requirements::resolve(&recipe.requirements, &ctx.options, ctx.skip_test());
    for request in &requirements.requests {
        tracing::debug!("requires {}", request);
    }
    for name in ctx.dependency_paths.keys() {
        if !requirements.contains(name) {
            tracing::warn!("location given for `{}`, which is not required", name);
        }
    }

    tracing::debug!("fetching with {}", fetcher.name());
    fetcher.fetch(&requirements)?;

    let layout = layout::plan(&mode, &recipe);
    tracing::debug!("build root: {}", layout.build_root.display());

    let toolchain = toolchain::emit(&ctx, &layout, &requirements);
    let (working_dir, commands) = match recipe.backend {
        Backend::Cmake => (
            cmake::working_dir(&layout),
            cmake::commands(&toolchain, &layout, ctx.skip_test()),
        ),
        Backend::Autotools => (
            autotools::working_dir(&layout),
            autotools::commands(&toolchain, &layout),
        ),
    };

    let package_id = fingerprint::package_id(&ctx);
    tracing::info!(
        "configured {} ({}) in {}",
        recipe.reference(),
        &package_id[..12],
        layout.build_root.display()
    );

    Ok(Configured {
        reference: recipe.reference(),
        package_id,
        settings: ctx.settings.clone(),
        conf: ctx.conf.clone(),
        options: ctx.options.clone(),
        mode,
        requirements,
        layout,
        toolchain,
        working_dir,
        commands,
    })
}

/// Apply assignments to the recipe's options and collect the ones that
/// target other packages.
///
/// Unscoped assignments and assignments scoped to the recipe must name a
/// declared option. `*` applies to the recipe when it declares the option
/// and is always forwarded.
fn apply_options(
    recipe: &Recipe,
    assignments: Vec<OptionAssignment>,
) -> Result<(ResolvedOptions, Vec<PackageOption>), ConfigError> {
    let mut model = recipe.option_model()?;
    let mut forwarded = Vec::new();

    for assignment in assignments {
        if assignment.scope.as_deref() == Some("*") {
            if model.is_declared(&assignment.name) {
                model.set(&assignment.name, &assignment.value)?;
            }
            forwarded.push(assignment.into_package_option());
        } else if assignment.applies_to(&recipe.name) {
            model.set(&assignment.name, &assignment.value)?;
        } else {
            forwarded.push(assignment.into_package_option());
        }
    }

    Ok((model.resolve(), forwarded))
}

fn warn_debug_only_toggles(ctx: &BuildContext) {
    if ctx.is_debug() {
        return;
    }
    for name in [OptionName::Coverage, OptionName::Sanitize] {
        if ctx.options.enabled(name) {
            tracing::warn!(
                "{}=True selects its own build root, but the CMake toggle is only set in Debug builds",
                name
            );
        }
    }
}

fn describe(options: &ResolvedOptions) -> String {
    options
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::builder::toolchain::ToolchainValue;
    use crate::core::settings::BuildType;
    use crate::resolver::errors::FetchError;
    use crate::resolver::fetch::{DryRunFetcher, LocalIndex};

    fn request(build_type: BuildType, options: &[&str]) -> ConfigureRequest {
        let mut settings = Settings::host();
        settings.build_type = build_type;
        ConfigureRequest {
            settings,
            options: options.iter().map(|o| o.parse().unwrap()).collect(),
            ..Default::default()
        }
    }

    fn run(build_type: BuildType, options: &[&str]) -> Result<Configured, ConfigError> {
        configure(
            Arc::new(Recipe::ublkpp().unwrap()),
            request(build_type, options),
            &DryRunFetcher,
        )
    }

    fn names(configured: &Configured) -> Vec<&str> {
        configured
            .requirements
            .requests
            .iter()
            .map(|r| r.name.as_str())
            .collect()
    }

    #[test]
    fn test_release_with_iscsi() {
        let configured = run(
            BuildType::Release,
            &["iscsi=True", "homeblocks=False", "shared=False"],
        )
        .unwrap();

        let names = names(&configured);
        assert!(names.contains(&"libiscsi"));
        assert!(!names.contains(&"homeblocks"));
        assert_eq!(configured.layout.build_root, Path::new("build").join("Release"));
        assert_eq!(configured.reference, "ublkpp/0.8.5");
    }

    #[test]
    fn test_debug_sanitize() {
        let configured = run(BuildType::Debug, &["sanitize=True"]).unwrap();

        assert_eq!(
            configured.layout.build_root,
            Path::new("build").join("Sanitized")
        );
        let tc = &configured.toolchain;
        assert!(tc.shared_link_flags.contains(&"-fsanitize=address".to_string()));
        assert!(tc.exe_link_flags.contains(&"-fsanitize=address".to_string()));
        assert_eq!(
            tc.variables.get("MEMORY_SANITIZER_ON"),
            Some(&ToolchainValue::Bool(true))
        );
    }

    #[test]
    fn test_debug_coverage_and_sanitize_conflict() {
        let err = run(BuildType::Debug, &["coverage=True", "sanitize=True"]).unwrap_err();
        assert!(matches!(err, ConfigError::IncompatibleOptions { .. }));
    }

    #[test]
    fn test_conflict_stops_before_fetch() {
        struct Panicking;
        impl DependencyFetcher for Panicking {
            fn name(&self) -> &str {
                "panicking"
            }
            fn fetch(&self, _: &RequirementSet) -> Result<(), FetchError> {
                panic!("fetch must not run after a failed validation");
            }
        }

        let err = configure(
            Arc::new(Recipe::ublkpp().unwrap()),
            request(BuildType::Debug, &["coverage=True", "sanitize=True"]),
            &Panicking,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "IncompatibleOptions");
    }

    #[test]
    fn test_skip_test_with_instrumentation() {
        let mut req = request(BuildType::Debug, &["coverage=True"]);
        req.conf.skip_test = true;

        let err = configure(Arc::new(Recipe::ublkpp().unwrap()), req, &DryRunFetcher)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RequiresTesting {
                option: OptionName::Coverage,
                ..
            }
        ));
    }

    #[test]
    fn test_release_instrumentation_gets_own_build_root() {
        let plain = run(BuildType::Release, &[]).unwrap();
        let sanitized = run(BuildType::Release, &["sanitize=True"]).unwrap();
        let coverage = run(BuildType::Release, &["coverage=True"]).unwrap();

        assert_eq!(plain.layout.build_root, Path::new("build").join("Release"));
        assert_eq!(
            sanitized.layout.build_root,
            Path::new("build").join("Sanitized")
        );
        assert_eq!(
            coverage.layout.build_root,
            Path::new("build").join("Coverage")
        );

        assert!(sanitized
            .toolchain
            .exe_link_flags
            .contains(&"-fsanitize=address".to_string()));
        assert!(sanitized.toolchain.variables.get("MEMORY_SANITIZER_ON").is_none());
        assert!(coverage.toolchain.variables.get("BUILD_COVERAGE").is_none());
    }

    #[test]
    fn test_release_allows_coverage_with_sanitize() {
        let configured = run(BuildType::Release, &["coverage=True", "sanitize=True"]).unwrap();
        assert!(configured.mode.coverage);
        assert!(configured.mode.sanitize);
        assert_eq!(
            configured.layout.build_root,
            Path::new("build").join("Sanitized")
        );
    }

    #[test]
    fn test_shared_drops_fpic() {
        let configured = run(BuildType::Release, &["shared=True"]).unwrap();
        assert!(!configured.options.contains(OptionName::Fpic));
        assert!(configured.toolchain.variables.get("CMAKE_POSITION_INDEPENDENT_CODE").is_none());
    }

    #[test]
    fn test_unknown_option() {
        let err = run(BuildType::Release, &["lto=True"]).unwrap_err();
        assert_eq!(err.kind(), "UnknownOption");
    }

    #[test]
    fn test_invalid_value() {
        let err = run(BuildType::Release, &["shared=maybe"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_scoped_options() {
        let configured = run(
            BuildType::Release,
            &["ublkpp/*:homeblocks=True", "isa-l/*:shared=True", "*:shared=True"],
        )
        .unwrap();

        assert!(configured.options.enabled(OptionName::Homeblocks));
        assert!(configured.options.enabled(OptionName::Shared));

        let forwarded: Vec<String> = configured
            .toolchain
            .dependency_options
            .iter()
            .map(|o| o.to_string())
            .collect();
        assert!(forwarded.contains(&"isa-l/*:shared=True".to_string()));
        assert!(forwarded.contains(&"*:shared=True".to_string()));
        assert!(forwarded.contains(&"sisl/*:malloc_impl=tcmalloc".to_string()));
    }

    #[test]
    fn test_star_scope_ignores_options_the_recipe_lacks() {
        let configured = run(BuildType::Release, &["*:malloc_impl=jemalloc"]).unwrap();
        assert_eq!(configured.options.len(), 6);
    }

    #[test]
    fn test_configure_is_deterministic() {
        let a = run(BuildType::Debug, &["sanitize=True", "iscsi=False"]).unwrap();
        let b = run(BuildType::Debug, &["sanitize=True", "iscsi=False"]).unwrap();

        assert_eq!(a.package_id, b.package_id);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_index_mismatch_is_unresolved() {
        let mut index = LocalIndex::new();
        index
            .add("sisl", &["12.4.1"])
            .add("isa-l", &["2.30.0"])
            .add("ublksrv", &["nbi.1.5.0"])
            .add("libiscsi", &["1.19.0"])
            .add("gtest", &["1.15.0"]);

        let err = configure(
            Arc::new(Recipe::ublkpp().unwrap()),
            request(BuildType::Release, &[]),
            &index,
        )
        .unwrap_err();

        match err {
            ConfigError::DependencyUnresolved { package, .. } => assert_eq!(package, "libiscsi"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_dependency_paths_reach_toolchain() {
        let mut req = request(BuildType::Release, &[]);
        req.dependency_paths.insert(
            "isa-l".to_string(),
            DependencyPaths {
                include_dir: Some(PathBuf::from("/opt/isa-l/include")),
                lib_dir: None,
            },
        );

        let configured =
            configure(Arc::new(Recipe::ublkpp().unwrap()), req, &DryRunFetcher).unwrap();
        assert_eq!(configured.toolchain.cppflags, vec!["-I/opt/isa-l/include"]);
    }

    #[test]
    fn test_libiscsi_recipe() {
        let configured = configure(
            Arc::new(Recipe::builtin("libiscsi").unwrap()),
            request(BuildType::Debug, &[]),
            &DryRunFetcher,
        )
        .unwrap();

        assert!(configured.requirements.is_empty());
        assert!(configured
            .toolchain
            .configure_args
            .contains(&"--enable-debug".to_string()));
        assert_eq!(configured.commands.last().unwrap(), &vec!["make".to_string()]);
        assert_eq!(configured.working_dir, configured.layout.build_root);
        assert_eq!(configured.commands[1][0], "../../configure");
    }
}
