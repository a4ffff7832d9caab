// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The three line-level regexes `TurnDetector` checks for, kept private so
//! nothing outside this module matches them inline.

use std::sync::OnceLock;

fn user_placeholder_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^\s*#\s*<User>\s*$").expect("static placeholder pattern is valid")
    })
}

fn user_ready_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^\s*<User>\s*$").expect("static ready pattern is valid"))
}

fn stop_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^\s*<Stop>\s*$").expect("static stop pattern is valid"))
}

/// `^\s*#\s*<User>\s*$` — the backend's placeholder sentinel line.
pub fn has_user_placeholder_line(content: &str) -> bool {
    content.lines().any(|line| user_placeholder_re().is_match(line))
}

/// `^\s*<User>\s*$` — the readiness sentinel a user types (no `#`).
pub fn has_user_ready_line(content: &str) -> bool {
    content.lines().any(|line| user_ready_re().is_match(line))
}

/// `^\s*<Stop>\s*$` — the conversation-termination sentinel.
pub fn has_stop_line(content: &str) -> bool {
    content.lines().any(|line| stop_re().is_match(line))
}
