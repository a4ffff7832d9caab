// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Shared regex patterns behind the `StderrParser` implementations.
//! Kept private to the `parser` module: nothing outside this module
//! should ever match a regex against raw stderr directly.

use std::sync::OnceLock;
use tl_core::RateLimitSignal;

fn rate_limit_phrase_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"(?i)rate.?limit|token.?exhaust|too.?many.?requests|429")
            .expect("static rate-limit pattern is valid")
    })
}

fn reset_token_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\d+").expect("static digit pattern is valid"))
}

fn turns_used_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"(?i)turns?\s*(?:used)?\s*:\s*(\d+)(?:\s*/\s*(\d+))?")
            .expect("static turns-used pattern is valid")
    })
}

fn max_turns_reached_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"(?i)max(?:imum)?\s*turns\s*reached.*?(\d+)")
            .expect("static max-turns-reached pattern is valid")
    })
}

fn session_colon_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"(?i)session:\s*([0-9a-f-]+)")
            .expect("static session pattern is valid")
    })
}

fn session_id_eq_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"(?i)session[_-]?id[=:]\s*([0-9a-f-]+)")
            .expect("static session-id pattern is valid")
    })
}

/// Scan `stderr` for any rate-limit phrase; if found, extract the first
/// duration/time-like token after it (default 60 on failure to parse one).
pub fn rate_limit(stderr: &str) -> Option<RateLimitSignal> {
    let phrase = rate_limit_phrase_re().find(stderr)?;
    let tail = &stderr[phrase.end()..];
    let raw = reset_token_re()
        .find(tail)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(60);
    let signal = RateLimitSignal::from_raw(raw);
    let interpretation = match signal {
        RateLimitSignal::RelativeSeconds(_) => "relative",
        RateLimitSignal::AbsoluteEpochSeconds(_) => "absolute",
    };
    tracing::info!(raw, interpretation, "rate-limit reset value interpreted");
    Some(signal)
}

/// `turns? (used)? : N[/M]` or `max(imum)? turns reached … N`.
pub fn turns(stderr: &str) -> Option<(u32, Option<u32>)> {
    if let Some(caps) = turns_used_re().captures(stderr) {
        let used = caps.get(1)?.as_str().parse::<u32>().ok()?;
        let max = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        return Some((used, max));
    }
    if let Some(caps) = max_turns_reached_re().captures(stderr) {
        let used = caps.get(1)?.as_str().parse::<u32>().ok()?;
        return Some((used, Some(used)));
    }
    None
}

/// `Session: <hex-dashed>` or `session[_-]?id[=:]\s*<hex-dashed>`.
pub fn session_id(stderr: &str) -> Option<String> {
    session_colon_re()
        .captures(stderr)
        .or_else(|| session_id_eq_re().captures(stderr))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
#[path = "patterns_tests.rs"]
mod tests;
