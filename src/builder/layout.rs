//! Build folder layout.
//!
//! The layout is a pure function of the build mode: sanitizer, coverage,
//! and plain builds each get their own build root so objects from one mode
//! never leak into another.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::recipe::Recipe;
use crate::core::settings::BuildMode;

/// Folder that holds every build root.
pub const BUILD_DIR: &str = "build";

/// Subfolder of the build root that receives generator output.
pub const GENERATORS_DIR: &str = "generators";

/// Filesystem roots and package folders for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    pub source_root: PathBuf,
    pub build_root: PathBuf,
    pub generators_root: PathBuf,
    /// Include dirs, relative to the source root
    pub include_dirs: Vec<PathBuf>,
    /// Library dirs, relative to the build root
    pub lib_dirs: Vec<PathBuf>,
    pub package: PackageLayout,
}

/// Where packaged artifacts land, relative to the package folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageLayout {
    pub libs: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    pub license_dir: PathBuf,
}

/// Select the build root for a mode.
///
/// Sanitize takes precedence over coverage, which takes precedence over
/// the plain `build/<BuildType>` root.
pub fn build_root(mode: &BuildMode) -> PathBuf {
    let leaf = if mode.sanitize {
        "Sanitized"
    } else if mode.coverage {
        "Coverage"
    } else {
        mode.build_type.as_str()
    };
    PathBuf::from(BUILD_DIR).join(leaf)
}

/// Plan the layout for a recipe in the given mode.
pub fn plan(mode: &BuildMode, recipe: &Recipe) -> LayoutPlan {
    let build_root = build_root(mode);
    let generators_root = build_root.join(GENERATORS_DIR);

    LayoutPlan {
        source_root: PathBuf::from("."),
        build_root,
        generators_root,
        include_dirs: vec![PathBuf::from("include")],
        lib_dirs: vec![PathBuf::from("src")],
        package: PackageLayout {
            libs: recipe.libs.clone(),
            include_dirs: vec![PathBuf::from("include")],
            lib_dirs: vec![PathBuf::from("lib")],
            license_dir: PathBuf::from("licenses"),
        },
    }
}
