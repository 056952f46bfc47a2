//! CMake rendering of an emitted toolchain.
//!
//! Produces the toolchain script the CMake driver loads with
//! `-DCMAKE_TOOLCHAIN_FILE`, and the command lines to configure, build,
//! and test with it.

use std::path::PathBuf;

use crate::builder::layout::LayoutPlan;
use crate::builder::toolchain::{slashed, ToolchainConfig, ToolchainValue};

/// File name of the generated CMake toolchain script.
pub const TOOLCHAIN_FILE: &str = "recipe_toolchain.cmake";

/// Render the toolchain as a CMake script.
///
/// Output depends only on the input, so identical configurations produce
/// byte-identical files.
pub fn render_toolchain(tc: &ToolchainConfig) -> String {
    let mut out = String::new();
    out.push_str("# Generated by recipe. Do not edit.\n");
    out.push_str("cmake_minimum_required(VERSION 3.15)\n\n");

    for (key, value) in tc.variables.iter() {
        let line = match value {
            ToolchainValue::Bool(_) => {
                format!("set({} {} CACHE BOOL \"\" FORCE)\n", key, value)
            }
            ToolchainValue::Str(s) => {
                format!("set({} \"{}\" CACHE STRING \"\" FORCE)\n", key, escape(s))
            }
        };
        out.push_str(&line);
    }

    let c_flags: Vec<&String> = tc.cppflags.iter().chain(&tc.cflags).collect();
    let cxx_flags: Vec<&String> = tc.cppflags.iter().chain(&tc.cxxflags).collect();
    let shared: Vec<&String> = tc.ldflags.iter().chain(&tc.shared_link_flags).collect();
    let exe: Vec<&String> = tc.ldflags.iter().chain(&tc.exe_link_flags).collect();

    let appends = [
        ("CMAKE_C_FLAGS_INIT", c_flags),
        ("CMAKE_CXX_FLAGS_INIT", cxx_flags),
        ("CMAKE_SHARED_LINKER_FLAGS_INIT", shared),
        ("CMAKE_EXE_LINKER_FLAGS_INIT", exe),
    ];

    let mut wrote_blank = false;
    for (var, flags) in appends {
        if flags.is_empty() {
            continue;
        }
        if !wrote_blank {
            out.push('\n');
            wrote_blank = true;
        }
        let joined = flags
            .iter()
            .map(|f| escape(f))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!("string(APPEND {} \" {}\")\n", var, joined));
    }

    out
}

/// Directory the CMake commands run from.
pub fn working_dir(layout: &LayoutPlan) -> PathBuf {
    layout.source_root.clone()
}

/// Command lines for the CMake driver: configure, build, and (unless
/// tests are skipped) test.
pub fn commands(tc: &ToolchainConfig, layout: &LayoutPlan, skip_test: bool) -> Vec<Vec<String>> {
    let build_root = slashed(&layout.build_root);
    let toolchain_file = slashed(&layout.generators_root.join(TOOLCHAIN_FILE));

    let mut configure = vec![
        "cmake".to_string(),
        "-S".to_string(),
        slashed(&layout.source_root),
        "-B".to_string(),
        build_root.clone(),
        format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain_file),
    ];
    configure.extend(tc.configure_args.iter().cloned());

    let build = vec![
        "cmake".to_string(),
        "--build".to_string(),
        build_root.clone(),
        "--parallel".to_string(),
        "--config".to_string(),
        tc.build_type.to_string(),
    ];

    let mut commands = vec![configure, build];
    if !skip_test {
        commands.push(vec![
            "ctest".to_string(),
            "--test-dir".to_string(),
            build_root,
            "--output-on-failure".to_string(),
        ]);
    }
    commands
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
