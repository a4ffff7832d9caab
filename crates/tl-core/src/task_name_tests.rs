// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;
use yare::parameterized;

#[parameterized(
    simple = {"demo"},
    with_digits = {"demo2"},
    with_hyphen = {"demo-task-42"},
    single_char = {"a"},
    single_digit = {"9"},
)]
fn accepts_valid_shapes(name: &str) {
    assert!(validate_task_name(name).is_ok(), "{name:?} should be valid");
}

#[parameterized(
    empty = {""},
    leading_hyphen = {"-demo"},
    trailing_hyphen = {"demo-"},
    uppercase = {"Demo"},
    traversal = {"../etc"},
    nested_traversal = {"foo/../bar"},
    slash = {"foo/bar"},
    backslash = {"foo\\bar"},
)]
fn rejects_invalid_shapes(name: &str) {
    assert!(validate_task_name(name).is_err(), "{name:?} should be rejected");
}

#[test]
fn traversal_is_reported_as_its_own_error_kind() {
    assert_eq!(
        validate_task_name("../etc"),
        Err(TaskNameError::PathTraversal("../etc".to_string()))
    );
}
