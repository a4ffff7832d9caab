// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Centralized environment variable access for the adapters crate.

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn parse_u32(var: &str) -> Option<u32> {
    std::env::var(var).ok().and_then(|s| s.parse::<u32>().ok())
}

/// Fallback rate-limit reset window used when no duration-like token can
/// be extracted from a backend's stderr (default: 60s).
pub fn default_rate_limit_seconds() -> i64 {
    parse_u32("TL_DEFAULT_RATE_LIMIT_SECONDS")
        .map(i64::from)
        .unwrap_or(60)
}

/// Timeout for the local backend's daemon-reachability probe (default: 2000ms).
pub fn daemon_probe_timeout_ms() -> Duration {
    parse_duration_ms("TL_DAEMON_PROBE_TIMEOUT_MS").unwrap_or(Duration::from_millis(2000))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
