//! CLI integration tests for recipe.
//!
//! These tests run the binary end to end: flags and config files in,
//! reports, generator files, and exit codes out.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the recipe binary command, isolated from user config.
///
/// `HOME` points at a directory that never exists, so no global config is
/// found. Tests that need one override `HOME` again.
fn recipe() -> Command {
    let mut cmd = Command::cargo_bin("recipe").unwrap();
    cmd.env_remove("RECIPE_INDEX")
        .env("HOME", std::env::temp_dir().join("recipe-tests-no-home"));
    cmd
}

/// Create a temporary working directory.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

// ============================================================================
// recipe configure
// ============================================================================

#[test]
fn test_configure_release_with_iscsi() {
    let output = recipe()
        .args([
            "configure",
            "--no-config",
            "-s",
            "build_type=Release",
            "-o",
            "iscsi=True",
            "-o",
            "homeblocks=False",
            "-o",
            "shared=False",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan = json(&output.stdout);
    let names: Vec<&str> = plan["requirements"]["requests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();

    assert!(names.contains(&"libiscsi"));
    assert!(!names.contains(&"homeblocks"));
    assert_eq!(plan["layout"]["build_root"], "build/Release");
}

#[test]
fn test_configure_debug_sanitize() {
    let output = recipe()
        .args([
            "configure",
            "--no-config",
            "-s",
            "build_type=Debug",
            "-o",
            "sanitize=True",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan = json(&output.stdout);
    assert_eq!(plan["layout"]["build_root"], "build/Sanitized");

    let toolchain = &plan["toolchain"];
    for key in ["shared_link_flags", "exe_link_flags"] {
        let flags: Vec<&str> = toolchain[key]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f.as_str().unwrap())
            .collect();
        assert!(flags.contains(&"-fsanitize=address"), "{key}: {flags:?}");
    }
}

#[test]
fn test_configure_debug_coverage_and_sanitize_fails() {
    recipe()
        .args([
            "configure",
            "--no-config",
            "-s",
            "build_type=Debug",
            "-o",
            "coverage=True",
            "-o",
            "sanitize=True",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "error: `sanitize` does not work with `coverage` in a Debug build",
        ))
        .stderr(predicate::str::contains("coverage=True"))
        .stderr(predicate::str::contains("sanitize=True"));
}

#[test]
fn test_configure_skip_test_with_coverage_fails() {
    recipe()
        .args([
            "configure",
            "--no-config",
            "-s",
            "build_type=Debug",
            "-o",
            "coverage=True",
            "-c",
            "tools.build:skip_test=True",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("`coverage` requires testing"));
}

#[test]
fn test_configure_unknown_option_fails() {
    recipe()
        .args(["configure", "--no-config", "-o", "lto=True"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown option `lto`"))
        .stderr(predicate::str::contains("declared options: shared, fPIC"));
}

#[test]
fn test_configure_invalid_value_fails() {
    recipe()
        .args(["configure", "--no-config", "-o", "shared=sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "invalid value `sometimes` for option `shared`",
        ));
}

#[test]
fn test_configure_low_cppstd_fails() {
    recipe()
        .args(["configure", "--no-config", "-s", "compiler.cppstd=17"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires at least C++20"));
}

#[test]
fn test_configure_text_report() {
    recipe()
        .args(["configure", "--no-config", "-s", "build_type=Release"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ublkpp/0.8.5\n"))
        .stdout(predicate::str::contains("build root: build/Release"))
        .stdout(predicate::str::contains("sisl/[^12.3]@oss/master"))
        .stdout(predicate::str::contains("commands (from .):"))
        .stdout(predicate::str::contains("cmake -S . -B build/Release"));
}

#[test]
fn test_configure_release_sanitize_has_own_build_root() {
    let output = recipe()
        .args([
            "configure",
            "--no-config",
            "-o",
            "sanitize=True",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan = json(&output.stdout);
    assert_eq!(plan["layout"]["build_root"], "build/Sanitized");
    assert_eq!(plan["toolchain"]["exe_link_flags"][0], "-fsanitize=address");
    assert!(plan["toolchain"]["variables"]["MEMORY_SANITIZER_ON"].is_null());
}

#[test]
fn test_configure_autotools_runs_from_build_root() {
    recipe()
        .args(["configure", "--no-config", "--package", "libiscsi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("commands (from build/Release):"))
        .stdout(predicate::str::contains("../../configure"));
}

#[test]
fn test_configure_option_names_are_case_sensitive() {
    recipe()
        .args(["configure", "--no-config", "-o", "SHARED=True"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown option `SHARED`"));
}

#[test]
fn test_configure_is_deterministic() {
    let args = [
        "configure",
        "--no-config",
        "-s",
        "build_type=Debug",
        "-o",
        "coverage=True",
        "--format",
        "json",
    ];

    let first = recipe().args(args).output().unwrap();
    let second = recipe().args(args).output().unwrap();

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_configure_writes_generators() {
    let tmp = temp_dir();

    recipe()
        .args(["configure", "--no-config", "-s", "build_type=Debug", "-o", "coverage=True"])
        .arg("--output-folder")
        .arg(tmp.path())
        .assert()
        .success();

    let generators = tmp.path().join("build/Coverage/generators");
    let script = fs::read_to_string(generators.join("recipe_toolchain.cmake")).unwrap();
    assert!(script.contains("set(BUILD_COVERAGE ON CACHE BOOL \"\" FORCE)"));
    assert!(generators.join("recipe_plan.json").exists());
}

#[test]
fn test_configure_failure_writes_nothing() {
    let tmp = temp_dir();

    recipe()
        .args([
            "configure",
            "--no-config",
            "-s",
            "build_type=Debug",
            "-o",
            "coverage=True",
            "-o",
            "sanitize=True",
        ])
        .arg("--output-folder")
        .arg(tmp.path())
        .assert()
        .failure();

    assert!(!tmp.path().join("build").exists());
}

// ============================================================================
// config files
// ============================================================================

#[test]
fn test_project_config_supplies_defaults() {
    let tmp = temp_dir();
    fs::create_dir(tmp.path().join(".recipe")).unwrap();
    fs::write(
        tmp.path().join(".recipe/config.toml"),
        "[settings]\nbuild_type = \"Debug\"\n\n[options]\nsanitize = true\n",
    )
    .unwrap();

    recipe()
        .args(["layout"])
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("build root:      build/Sanitized"));
}

#[test]
fn test_cli_flags_override_config() {
    let tmp = temp_dir();
    fs::create_dir(tmp.path().join(".recipe")).unwrap();
    fs::write(
        tmp.path().join(".recipe/config.toml"),
        "[settings]\nbuild_type = \"Debug\"\n\n[options]\nsanitize = true\n",
    )
    .unwrap();

    recipe()
        .args(["layout", "-o", "sanitize=False"])
        .current_dir(tmp.path())
        .env("HOME", tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("build root:      build/Debug"));
}

#[test]
fn test_global_config_is_ignored_without_home_override() {
    let tmp = temp_dir();

    recipe()
        .args(["layout"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("build root:      build/Release"));
}

#[test]
fn test_global_config_read_from_home() {
    let tmp = temp_dir();
    let home = tmp.path().join("home");
    let project = tmp.path().join("project");
    fs::create_dir_all(home.join(".recipe")).unwrap();
    fs::create_dir_all(&project).unwrap();
    fs::write(
        home.join(".recipe/config.toml"),
        "[options]\ncoverage = true\n",
    )
    .unwrap();

    recipe()
        .args(["layout"])
        .current_dir(&project)
        .env("HOME", &home)
        .assert()
        .success()
        .stdout(predicate::str::contains("build root:      build/Coverage"));
}

// ============================================================================
// recipe options / deps / layout / toolchain
// ============================================================================

#[test]
fn test_options_shows_normalized_values() {
    recipe()
        .args(["options", "--no-config", "-o", "shared=True"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shared       True"))
        .stdout(predicate::str::contains("fPIC         -"))
        .stdout(predicate::str::contains("sisl/*:malloc_impl=tcmalloc"));
}

#[test]
fn test_deps_follow_options() {
    recipe()
        .args(["deps", "--no-config", "-o", "iscsi=False", "-o", "homeblocks=True"])
        .assert()
        .success()
        .stdout(predicate::str::contains("homeblocks/[^2.1]@oss/main"))
        .stdout(predicate::str::contains("libiscsi").not())
        .stdout(predicate::str::contains("gtest/1.15.0 (test)"));
}

#[test]
fn test_deps_checked_against_index() {
    let tmp = temp_dir();
    let index = tmp.path().join("index.toml");
    fs::write(
        &index,
        r#"
[packages]
sisl = ["12.3.0"]
isa-l = ["2.30.0"]
ublksrv = ["nbi.1.5.0"]
libiscsi = ["1.20.2"]
"#,
    )
    .unwrap();

    recipe()
        .args(["deps", "--no-config", "--index"])
        .arg(&index)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "could not resolve dependency `gtest`",
        ));

    recipe()
        .args(["deps", "--no-config", "-c", "tools.build:skip_test=True", "--index"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("gtest/1.15.0 (test, skipped)"));
}

#[test]
fn test_layout_json() {
    let output = recipe()
        .args(["layout", "--no-config", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let layout = json(&output.stdout);
    assert_eq!(layout["generators_root"], "build/Release/generators");
    assert_eq!(layout["package"]["libs"][0], "ublkpp");
}

#[test]
fn test_toolchain_native_for_autotools() {
    recipe()
        .args(["toolchain", "--no-config", "--package", "libiscsi"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "export CFLAGS=\"$CFLAGS -Wno-unused-but-set-variable\"",
        ));
}

#[test]
fn test_toolchain_cmake() {
    recipe()
        .args(["toolchain", "--no-config", "-o", "shared=True"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "set(BUILD_SHARED_LIBS ON CACHE BOOL \"\" FORCE)",
        ))
        .stdout(predicate::str::contains("CMAKE_POSITION_INDEPENDENT_CODE").not());
}

#[test]
fn test_recipe_from_file() {
    let tmp = temp_dir();
    let path = tmp.path().join("mini.toml");
    fs::write(
        &path,
        r#"
[package]
name = "mini"
version = "1.0.0"
backend = "cmake"

[[options]]
name = "shared"
default = false
"#,
    )
    .unwrap();

    recipe()
        .args(["configure", "--no-config", "--recipe"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("mini/1.0.0\n"));
}

#[test]
fn test_unknown_builtin_fails() {
    recipe()
        .args(["configure", "--no-config", "--package", "openssl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("openssl"));
}

// ============================================================================
// recipe completions
// ============================================================================

#[test]
fn test_completions_bash() {
    recipe()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recipe"));
}
