// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;

#[test]
fn parses_session_turns_and_rate_limit_from_a_single_log() {
    let parser = ClaudeStderrParser;
    let stderr = "Session: abc-123\nturns used: 4/10\n";
    assert_eq!(parser.parse_session(stderr), Some("abc-123".to_string()));
    assert_eq!(parser.parse_turns(stderr), Some((4, Some(10))));
    assert_eq!(parser.detect_rate_limit(stderr), None);
}

#[test]
fn detects_rate_limit_phrasing() {
    let parser = ClaudeStderrParser;
    let stderr = "Error: rate limit exceeded, retry in 30s";
    assert_eq!(
        parser.detect_rate_limit(stderr),
        Some(tl_core::RateLimitSignal::from_raw(30))
    );
}
