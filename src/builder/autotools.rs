//! Autotools rendering of an emitted toolchain.

use std::path::{Component, PathBuf};

use crate::builder::layout::LayoutPlan;
use crate::builder::toolchain::{slashed, ToolchainConfig};

/// File name of the generated environment script.
pub const ENVIRONMENT_FILE: &str = "recipe_toolchain.sh";

/// Render the toolchain as a sourceable shell script that extends the
/// compiler and linker flag variables.
pub fn render_environment(tc: &ToolchainConfig) -> String {
    let mut out = String::new();
    out.push_str("# Generated by recipe. Do not edit.\n");

    // LDFLAGS covers both shared and executable links
    let mut ldflags: Vec<String> = tc.ldflags.clone();
    for flag in tc.shared_link_flags.iter().chain(&tc.exe_link_flags) {
        if !ldflags.contains(flag) {
            ldflags.push(flag.clone());
        }
    }

    let vars = [
        ("CPPFLAGS", tc.cppflags.as_slice()),
        ("CFLAGS", tc.cflags.as_slice()),
        ("CXXFLAGS", tc.cxxflags.as_slice()),
        ("LDFLAGS", ldflags.as_slice()),
    ];

    for (var, flags) in vars {
        if flags.is_empty() {
            continue;
        }
        let joined = flags
            .iter()
            .map(|f| escape(f))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!("export {var}=\"${var} {joined}\"\n"));
    }

    out
}

/// Directory the autotools commands run from.
pub fn working_dir(layout: &LayoutPlan) -> PathBuf {
    layout.build_root.clone()
}

/// Command lines for the autotools driver, run from [`working_dir`] so the
/// build stays out of the source tree.
pub fn commands(tc: &ToolchainConfig, layout: &LayoutPlan) -> Vec<Vec<String>> {
    let source_root = source_from_build(layout);

    let mut configure = vec![format!("{}/configure", source_root)];
    configure.extend(tc.configure_args.iter().cloned());

    vec![
        vec![
            "autoreconf".to_string(),
            "--force".to_string(),
            "--install".to_string(),
            source_root,
        ],
        configure,
        vec!["make".to_string()],
    ]
}

/// Path of the source root as seen from the build root.
fn source_from_build(layout: &LayoutPlan) -> String {
    let depth = layout
        .build_root
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    let up = if depth == 0 {
        ".".to_string()
    } else {
        vec![".."; depth].join("/")
    };

    match slashed(&layout.source_root).as_str() {
        "." => up,
        source => format!("{}/{}", up, source),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
