//! Build context - recipe, settings, conf, and option state for one
//! configuration pass.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::dependency::DependencyPaths;
use crate::core::option::{PackageOption, ResolvedOptions};
use crate::core::recipe::Recipe;
use crate::core::settings::{BuildMode, BuildType, Conf, Settings};

/// Build context threaded through every configuration stage.
///
/// Stages never mutate a context; a stage that changes state returns a new
/// one (see [`BuildContext::with_options`]).
#[derive(Clone)]
pub struct BuildContext {
    /// Recipe being configured
    pub recipe: Arc<Recipe>,

    /// Target settings
    pub settings: Settings,

    /// Conf flags (skip-test)
    pub conf: Conf,

    /// Resolved options for the recipe itself
    pub options: ResolvedOptions,

    /// Options forwarded to dependencies, in the order given
    pub package_options: Vec<PackageOption>,

    /// Dependencies sourced from non-standard locations
    pub dependency_paths: BTreeMap<String, DependencyPaths>,
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("recipe", &self.recipe.reference())
            .field("settings", &self.settings)
            .field("conf", &self.conf)
            .field("options", &self.options)
            .field("package_options", &self.package_options)
            .field("dependency_paths", &self.dependency_paths)
            .finish()
    }
}

impl BuildContext {
    /// Create a context with no forwarded options or path overrides.
    pub fn new(recipe: Arc<Recipe>, settings: Settings, conf: Conf, options: ResolvedOptions) -> Self {
        BuildContext {
            recipe,
            settings,
            conf,
            options,
            package_options: Vec::new(),
            dependency_paths: BTreeMap::new(),
        }
    }

    /// Replace the option set, e.g. after normalization.
    pub fn with_options(self, options: ResolvedOptions) -> Self {
        BuildContext { options, ..self }
    }

    /// Set options forwarded to dependencies.
    pub fn with_package_options(mut self, options: Vec<PackageOption>) -> Self {
        self.package_options = options;
        self
    }

    /// Set non-standard dependency locations.
    pub fn with_dependency_paths(mut self, paths: BTreeMap<String, DependencyPaths>) -> Self {
        self.dependency_paths = paths;
        self
    }

    /// The build mode derived from settings and options.
    pub fn mode(&self) -> BuildMode {
        BuildMode::new(self.settings.build_type, &self.options)
    }

    pub fn build_type(&self) -> BuildType {
        self.settings.build_type
    }

    pub fn is_debug(&self) -> bool {
        self.settings.build_type == BuildType::Debug
    }

    /// Whether the test-execution step is skipped.
    pub fn skip_test(&self) -> bool {
        self.conf.skip_test
    }
}
