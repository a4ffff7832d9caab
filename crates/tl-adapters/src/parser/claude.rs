// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Stderr parsing for the hosted, Claude-style CLI backend.

use super::patterns;
use super::StderrParser;
use tl_core::RateLimitSignal;

/// The hosted backend reports a session id, a turn count, and rate-limit
/// exhaustion on stderr; see §4.6 points 6-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeStderrParser;

impl StderrParser for ClaudeStderrParser {
    fn parse_session(&self, stderr: &str) -> Option<String> {
        patterns::session_id(stderr)
    }

    fn parse_turns(&self, stderr: &str) -> Option<(u32, Option<u32>)> {
        patterns::turns(stderr)
    }

    fn detect_rate_limit(&self, stderr: &str) -> Option<RateLimitSignal> {
        patterns::rate_limit(stderr)
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
