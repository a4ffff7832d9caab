//! `turnloopd --help` / `--version` / bad-argument specs.
//!
//! These never acquire the vault or touch state — they exit before
//! `Config::load` runs.

use crate::prelude::*;

#[test]
fn version_flag_prints_version() {
    let project = Project::empty();
    let output = project.run(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("turnloopd "), "expected version line, got: {stdout}");
}

#[test]
fn short_version_flag_prints_version() {
    let project = Project::empty();
    let output = project.run(&["-v"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("turnloopd "));
}

#[test]
fn help_flag_shows_usage() {
    let project = Project::empty();
    let output = project.run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("USAGE:"), "expected USAGE section, got: {stdout}");
    assert!(stdout.contains("--help"));
    assert!(stdout.contains("--version"));
}

#[test]
fn short_help_flag_shows_usage() {
    let project = Project::empty();
    let output = project.run(&["-h"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("USAGE:"));
}

#[test]
fn unexpected_argument_fails_with_usage() {
    let project = Project::empty();
    let output = project.run(&["--frobnicate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected argument"), "got: {stderr}");
}
