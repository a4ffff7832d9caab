// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;

#[test]
fn display_matches_inner_string() {
    let t = TaskName::new("demo");
    assert_eq!(t.to_string(), "demo");
    assert_eq!(t.as_str(), "demo");
}

#[test]
fn eq_against_str_literal() {
    let b = BackendName::new("claude");
    assert_eq!(b, *"claude");
}

#[test]
fn from_owned_and_borrowed_str() {
    let a: TaskName = "demo".into();
    let b: TaskName = String::from("demo").into();
    assert_eq!(a, b);
}
