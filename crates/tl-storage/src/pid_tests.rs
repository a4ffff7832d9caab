// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;
use yare::parameterized;

#[parameterized(
    plain = {"1234", Some(1234)},
    whitespace = {"  1234\n", Some(1234)},
    negative = {"-1", None},
    non_numeric = {"abc", None},
    empty = {"", None},
    traversal_shaped = {"../1", None},
)]
fn parse_pid_rejects_non_numeric(body: &str, expected: Option<i32>) {
    assert_eq!(parse_pid(body), expected);
}

#[test]
fn current_process_is_alive() {
    let pid = std::process::id() as i32;
    assert!(is_pid_alive(pid));
}

#[test]
fn pid_one_is_alive_under_normal_init_systems() {
    // PID 1 always exists on a running Unix system (init/systemd/launchd).
    assert!(is_pid_alive(1));
}

#[test]
fn an_implausibly_large_pid_is_dead() {
    assert!(!is_pid_alive(i32::MAX - 1));
}
