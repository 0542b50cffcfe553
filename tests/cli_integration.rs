//! CLI integration tests for configure.
//!
//! These tests run the real binary in a temporary project directory and
//! inspect the generated build file.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the configure binary command with a clean environment.
fn configure() -> Command {
    let mut cmd = Command::cargo_bin("configure").unwrap();
    for key in ["CXX", "AR", "CFLAGS", "LDFLAGS"] {
        cmd.env_remove(key);
    }
    cmd
}

/// Create a project with one library source and two tests.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("immutable")).unwrap();
    fs::create_dir_all(tmp.path().join("tests")).unwrap();
    fs::write(tmp.path().join("immutable/array.cc"), "").unwrap();
    fs::write(tmp.path().join("tests/array_test.cc"), "").unwrap();
    fs::write(tmp.path().join("tests/main.cc"), "").unwrap();
    tmp
}

fn read_output(dir: &Path) -> String {
    fs::read_to_string(dir.join("build.ninja")).unwrap()
}

/// Join ` $` continuation lines back into logical lines.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        let part = if current.is_empty() { line } else { line.trim_start() };
        match part.strip_suffix(" $") {
            Some(head) => {
                current.push_str(head);
                current.push(' ');
            }
            None => {
                current.push_str(part);
                lines.push(std::mem::take(&mut current));
            }
        }
    }
    lines
}

fn variable(text: &str, name: &str) -> String {
    let prefix = format!("{} = ", name);
    logical_lines(text)
        .into_iter()
        .find_map(|line| line.strip_prefix(&prefix).map(str::to_string))
        .unwrap_or_else(|| panic!("variable {} not found", name))
}

// ============================================================================
// Usage errors
// ============================================================================

#[test]
fn test_stray_argument_exits_one_without_output() {
    let tmp = project();

    configure()
        .args(["--platform", "linux", "foo"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "extra unparsed command-line arguments: foo",
        ));

    assert!(!tmp.path().join("build.ninja").exists());
}

#[test]
fn test_stray_argument_leaves_existing_output_untouched() {
    let tmp = project();
    fs::write(tmp.path().join("build.ninja"), "previous").unwrap();

    configure()
        .arg("foo")
        .current_dir(tmp.path())
        .assert()
        .code(1);

    assert_eq!(read_output(tmp.path()), "previous");
}

#[test]
fn test_unknown_platform_rejected() {
    let tmp = project();

    configure()
        .args(["--platform", "beos"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("beos"));

    assert!(!tmp.path().join("build.ninja").exists());
}

// ============================================================================
// Generated file
// ============================================================================

#[test]
fn test_writes_build_file() {
    let tmp = project();

    configure()
        .args(["--platform", "linux"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote"));

    let out = read_output(tmp.path());
    assert!(out.starts_with("# This file is generated by configure.\n"));
    assert!(out.contains("ninja_required_version = 1.3\n"));
    assert!(out.contains("configure_args = --platform linux\n"));
    assert!(out.contains("builddir = build/release\n"));
    assert!(out.contains("rule cxx\n"));
    assert!(out.contains("build $builddir/lib/libimmutable.a: ar $builddir/obj/immutable/array.o\n"));
    assert!(out.contains("rule configure\n"));
    assert!(out.contains("  generator = 1\n"));
    assert!(out.contains("default $builddir/bin/test\n"));
    assert!(out.ends_with("build all: phony $builddir/bin/test\n"));

    let cflags = variable(&out, "cflags");
    assert!(cflags.contains("-O3"));
    assert!(cflags.contains("-fvisibility=hidden"));
    assert!(!cflags.contains("-D_GLIBCXX_DEBUG"));

    let test_cflags = variable(&out, "test_cflags");
    assert!(test_cflags.contains("-DUNIT_TEST=1"));
}

#[test]
fn test_mingw_flags() {
    let tmp = project();

    configure()
        .args(["--platform", "mingw"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning"));

    let out = read_output(tmp.path());
    assert!(!variable(&out, "cflags").contains("-fvisibility=hidden"));
    assert!(!variable(&out, "test_cflags").contains("-fvisibility=hidden"));
    assert!(variable(&out, "ldflags").contains("-static"));
    assert!(!out.contains("rule configure"));
    assert!(out.contains("build $builddir/bin/test: phony $builddir/bin/test.exe\n"));
}

#[test]
fn test_debug_mode() {
    let tmp = project();

    configure()
        .args(["--platform", "linux", "--debug"])
        .env("CXX", "clang++")
        .current_dir(tmp.path())
        .assert()
        .success();

    let out = read_output(tmp.path());
    assert!(out.contains("builddir = build/debug\n"));
    assert!(out.contains("cxx = clang++\n"));

    let cflags = variable(&out, "cflags");
    assert!(cflags.contains("-D_GLIBCXX_DEBUG"));
    assert!(cflags.contains("-fsanitize=address"));
    assert!(!cflags.contains("-O3"));
    assert!(variable(&out, "ldflags").contains("-fsanitize=address"));
}

#[test]
fn test_cflags_with_quote_are_wrapped() {
    let tmp = project();

    configure()
        .args(["--platform", "linux"])
        .env("CFLAGS", "-DNAME=\"x\"")
        .env("CXX", "g++")
        .current_dir(tmp.path())
        .assert()
        .success();

    let out = read_output(tmp.path());
    assert!(variable(&out, "cflags").ends_with(" '-DNAME=\"x\"'"));
    assert!(variable(&out, "test_cflags").ends_with(" '-DNAME=\"x\"'"));
    assert_eq!(variable(&out, "configure_env"), "CXX=g++ CFLAGS='-DNAME=\"x\"'$ ");
}

/// Undo ninja's `$` escapes in a variable value.
fn ninja_unescape(value: &str) -> String {
    let mut out = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

#[cfg(unix)]
#[test]
fn test_regeneration_reproduces_environment() {
    let tmp = project();

    configure()
        .args(["--platform", "linux"])
        .env("CXX", "g++")
        .env("CFLAGS", "-DNAME=\"x\" -DMODE='a b'")
        .env("LDFLAGS", "-Wl,-rpath,$ORIGIN")
        .current_dir(tmp.path())
        .assert()
        .success();
    let first = read_output(tmp.path());

    // Rerun the way the regeneration rule does, through the shell.
    let env = ninja_unescape(&variable(&first, "configure_env"));
    let args = variable(&first, "configure_args");
    let program = assert_cmd::cargo::cargo_bin("configure");
    let mut shell = Command::new("sh");
    shell
        .arg("-c")
        .arg(format!("{}'{}' {}", env, program.display(), args))
        .current_dir(tmp.path());
    for key in ["CXX", "AR", "CFLAGS", "LDFLAGS"] {
        shell.env_remove(key);
    }
    shell.assert().success();

    assert_eq!(read_output(tmp.path()), first);
}

#[test]
fn test_generation_is_byte_identical() {
    let tmp = project();
    let run = || {
        configure()
            .args(["--platform", "linux", "--debug"])
            .env("LDFLAGS", "-L/opt/lib")
            .current_dir(tmp.path())
            .assert()
            .success();
        read_output(tmp.path())
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[test]
fn test_custom_output() {
    let tmp = project();

    configure()
        .args(["--platform", "linux", "-o", "gen.ninja"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let out = fs::read_to_string(tmp.path().join("gen.ninja")).unwrap();
    assert!(out.contains("build gen.ninja: configure"));
    assert!(!tmp.path().join("build.ninja").exists());
}

#[test]
fn test_manifest_drives_sources() {
    let tmp = project();
    fs::write(tmp.path().join("immutable/map.cc"), "").unwrap();
    fs::write(
        tmp.path().join("Configure.toml"),
        "[library]\nname = \"imm\"\nsources = [\"array\", \"map\"]\n",
    )
    .unwrap();

    configure()
        .args(["--platform", "linux"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let out = read_output(tmp.path());
    let archive = logical_lines(&out)
        .into_iter()
        .find(|l| l.starts_with("build $builddir/lib/libimm.a"))
        .unwrap();
    assert_eq!(
        archive,
        "build $builddir/lib/libimm.a: ar $builddir/obj/immutable/array.o $builddir/obj/immutable/map.o"
    );
    assert!(logical_lines(&out)
        .iter()
        .any(|l| l.starts_with("build build.ninja: configure |") && l.ends_with(" Configure.toml")));
}

#[test]
fn test_invalid_manifest_fails() {
    let tmp = project();
    fs::write(tmp.path().join("Configure.toml"), "[library]\nsources = []\n").unwrap();

    configure()
        .args(["--platform", "linux"])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("declares no sources"));

    assert!(!tmp.path().join("build.ninja").exists());
}

// ============================================================================
// Dry run and config output
// ============================================================================

#[test]
fn test_dry_run_writes_nothing() {
    let tmp = project();

    configure()
        .args(["--platform", "linux", "--dry-run"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ninja_required_version = 1.3"));

    assert!(!tmp.path().join("build.ninja").exists());
}

#[test]
fn test_print_config() {
    let tmp = project();

    let output = configure()
        .args(["--platform", "msvc", "--host", "linux", "--print-config"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["target"]["variant"], "msvc");
    assert_eq!(json["host"]["variant"], "linux");
    assert_eq!(json["toolchain"]["compiler"], "cl");
    assert_eq!(json["toolchain"]["archiver"], "ar");
    assert!(!tmp.path().join("build.ninja").exists());
}
