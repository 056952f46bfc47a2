//! Toolchain emission.
//!
//! [`emit`] assembles everything the external native-build driver needs
//! from the validated context: build-system variables, compiler and linker
//! flags, conditional configure arguments, and option overrides for
//! dependencies. The result is a plain value; rendering it for a specific
//! backend lives in [`crate::builder::cmake`] and
//! [`crate::builder::autotools`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::builder::context::BuildContext;
use crate::builder::layout::LayoutPlan;
use crate::core::option::{OptionName, PackageOption};
use crate::core::recipe::Backend;
use crate::core::settings::BuildType;
use crate::resolver::requirements::RequirementSet;

/// A build-system variable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolchainValue {
    Bool(bool),
    Str(String),
}

impl fmt::Display for ToolchainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolchainValue::Bool(true) => f.write_str("ON"),
            ToolchainValue::Bool(false) => f.write_str("OFF"),
            ToolchainValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ToolchainValue {
    fn from(b: bool) -> Self {
        ToolchainValue::Bool(b)
    }
}

impl From<&str> for ToolchainValue {
    fn from(s: &str) -> Self {
        ToolchainValue::Str(s.to_string())
    }
}

impl From<String> for ToolchainValue {
    fn from(s: String) -> Self {
        ToolchainValue::Str(s)
    }
}

/// Insertion-ordered variable map. Setting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    entries: Vec<(String, ToolchainValue)>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ToolchainValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ToolchainValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolchainValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Variables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parameters handed verbatim to the native-build driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainConfig {
    pub backend: Backend,
    pub build_type: BuildType,
    pub generators_root: PathBuf,
    pub variables: Variables,
    pub cflags: Vec<String>,
    pub cxxflags: Vec<String>,
    pub cppflags: Vec<String>,
    pub ldflags: Vec<String>,
    pub shared_link_flags: Vec<String>,
    pub exe_link_flags: Vec<String>,
    /// Extra arguments for the configure step
    pub configure_args: Vec<String>,
    pub dependency_options: Vec<PackageOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake_target_name: Option<String>,
}

impl ToolchainConfig {
    fn new(backend: Backend, build_type: BuildType, generators_root: PathBuf) -> Self {
        ToolchainConfig {
            backend,
            build_type,
            generators_root,
            variables: Variables::new(),
            cflags: Vec::new(),
            cxxflags: Vec::new(),
            cppflags: Vec::new(),
            ldflags: Vec::new(),
            shared_link_flags: Vec::new(),
            exe_link_flags: Vec::new(),
            configure_args: Vec::new(),
            dependency_options: Vec::new(),
            cmake_file_name: None,
            cmake_target_name: None,
        }
    }

    /// Set a dependency option, replacing an earlier one with the same
    /// pattern and name.
    pub fn set_dependency_option(&mut self, option: PackageOption) {
        match self
            .dependency_options
            .iter_mut()
            .find(|o| o.pattern == option.pattern && o.name == option.name)
        {
            Some(existing) => *existing = option,
            None => self.dependency_options.push(option),
        }
    }
}

/// Assemble the toolchain parameters for a validated context.
pub fn emit(
    ctx: &BuildContext,
    layout: &LayoutPlan,
    requirements: &RequirementSet,
) -> ToolchainConfig {
    let recipe = &ctx.recipe;
    let mode = ctx.mode();
    let mut tc = ToolchainConfig::new(
        recipe.backend,
        ctx.build_type(),
        layout.generators_root.clone(),
    );

    tc.cflags.extend(recipe.cflags.iter().cloned());

    match recipe.backend {
        Backend::Cmake => emit_cmake_variables(ctx, layout, &mut tc),
        Backend::Autotools => emit_autotools_args(ctx, &mut tc),
    }

    // Dependencies sourced from non-standard locations, in request order
    for request in &requirements.requests {
        let Some(paths) = ctx.dependency_paths.get(&request.name) else {
            continue;
        };
        let ident = cmake_ident(&request.name);
        if let Some(dir) = &paths.include_dir {
            tc.cppflags.push(format!("-I{}", slashed(dir)));
            if recipe.backend == Backend::Cmake {
                tc.variables.set(format!("{}_INCLUDE_DIR", ident), slashed(dir));
            }
        }
        if let Some(dir) = &paths.lib_dir {
            tc.ldflags.push(format!("-L{}", slashed(dir)));
            if recipe.backend == Backend::Cmake {
                tc.variables.set(format!("{}_LIBRARY_DIR", ident), slashed(dir));
            }
        }
    }

    if ctx.is_debug() {
        tc.configure_args
            .extend(recipe.debug_configure_args.iter().cloned());
    }

    if mode.sanitize {
        tc.shared_link_flags
            .extend(recipe.sanitizer_link_flags.iter().cloned());
        tc.exe_link_flags
            .extend(recipe.sanitizer_link_flags.iter().cloned());
    }

    for option in &ctx.package_options {
        tc.set_dependency_option(option.clone());
    }

    // Performance allocator everywhere except Debug
    if let Some(allocator) = &recipe.allocator {
        if !ctx.is_debug() {
            tc.set_dependency_option(PackageOption::new(
                format!("{}/*", allocator.package),
                &allocator.option,
                &allocator.value,
            ));
        }
    }

    tc.cmake_file_name = recipe.cmake.file_name.clone();
    tc.cmake_target_name = recipe.cmake.target_name.clone();

    tc
}

fn emit_cmake_variables(ctx: &BuildContext, layout: &LayoutPlan, tc: &mut ToolchainConfig) {
    let mode = ctx.mode();
    let generators = slashed(&layout.generators_root);

    tc.variables.set("CMAKE_BUILD_TYPE", ctx.build_type().as_str());
    if ctx.options.contains(OptionName::Shared) {
        tc.variables
            .set("BUILD_SHARED_LIBS", ctx.options.enabled(OptionName::Shared));
    }
    if ctx.options.contains(OptionName::Fpic) {
        tc.variables.set(
            "CMAKE_POSITION_INDEPENDENT_CODE",
            ctx.options.enabled(OptionName::Fpic),
        );
    }
    tc.variables.set("CMAKE_PREFIX_PATH", generators.clone());
    tc.variables.set("CMAKE_MODULE_PATH", generators);

    tc.variables.set("CTEST_OUTPUT_ON_FAILURE", true);
    tc.variables
        .set("PACKAGE_VERSION", ctx.recipe.version.as_str());
    tc.variables.set("ENABLE_TESTS", !ctx.skip_test());

    if mode.is_debug() {
        if mode.coverage {
            tc.variables.set("BUILD_COVERAGE", true);
        } else if mode.sanitize {
            tc.variables.set("MEMORY_SANITIZER_ON", true);
        }
    }
}

fn emit_autotools_args(ctx: &BuildContext, tc: &mut ToolchainConfig) {
    if ctx.options.contains(OptionName::Shared) {
        if ctx.options.enabled(OptionName::Shared) {
            tc.configure_args.push("--enable-shared".to_string());
            tc.configure_args.push("--disable-static".to_string());
        } else {
            tc.configure_args.push("--disable-shared".to_string());
            tc.configure_args.push("--enable-static".to_string());
        }
    }
    if ctx.options.enabled(OptionName::Fpic) {
        tc.configure_args.push("--with-pic".to_string());
    }
}

/// Turn a package name into a CMake identifier: `isa-l` -> `ISA_L`.
fn cmake_ident(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Render a path with forward slashes.
pub(crate) fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
