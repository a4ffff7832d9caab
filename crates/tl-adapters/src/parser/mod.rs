// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The one place backend-specific stderr regexes live. A single
//! `StderrParser` trait per §4.6.1 — the invokers call through it and
//! never match a regex inline themselves.

mod claude;
mod ollama;
mod patterns;

pub use claude::ClaudeStderrParser;
pub use ollama::OllamaStderrParser;

use tl_core::RateLimitSignal;

/// Extracts protocol-relevant signals from a backend's raw stderr.
pub trait StderrParser: Send + Sync + 'static {
    /// A session identifier, if the backend reported one.
    fn parse_session(&self, stderr: &str) -> Option<String>;

    /// `(turns_used, max_turns)` if the backend reported a turn count.
    /// `max_turns` is `None` when only a bare count was reported.
    fn parse_turns(&self, stderr: &str) -> Option<(u32, Option<u32>)>;

    /// A rate-limit signal, if stderr matches any of the rate-limit
    /// phrases. See §4.6.2 for how the raw value is interpreted.
    fn detect_rate_limit(&self, stderr: &str) -> Option<RateLimitSignal>;
}
