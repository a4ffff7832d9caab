// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Stderr parsing for the local, Ollama-style daemon backend.

use super::patterns;
use super::StderrParser;
use tl_core::RateLimitSignal;

/// The local backend has no session concept (§4.6 point 5: "resume flags
/// are ignored"), so `parse_session` always returns `None`. Turn counts and
/// rate-limit phrasing use the same shared patterns as the hosted backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct OllamaStderrParser;

impl StderrParser for OllamaStderrParser {
    fn parse_session(&self, _stderr: &str) -> Option<String> {
        None
    }

    fn parse_turns(&self, stderr: &str) -> Option<(u32, Option<u32>)> {
        patterns::turns(stderr)
    }

    fn detect_rate_limit(&self, stderr: &str) -> Option<RateLimitSignal> {
        patterns::rate_limit(stderr)
    }
}

#[cfg(test)]
#[path = "ollama_tests.rs"]
mod tests;
