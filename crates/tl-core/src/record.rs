// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Persisted record shapes: audit records, continuation tracking, and the
//! structured failure sentinel. `tl-storage` owns reading/writing these;
//! this module only owns their shape so `tl-adapters` and `tl-engine` can
//! construct and inspect them without depending on `tl-storage`.

use crate::{BackendName, TaskName};
use serde::{Deserialize, Serialize};

/// Per-invocation audit record, one JSON file per invocation under
/// `<state>/audit/<task>/<timestamp>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub task: TaskName,
    pub file: String,
    pub backend: BackendName,
    pub session_id: Option<String>,
    pub turns: Option<u32>,
    pub exit_code: Option<i32>,
    pub interrupted: bool,
    pub timestamp: String,
    pub stderr_excerpt: Option<String>,
}

/// `<state>/continuations/<task>.json` — tracks an in-flight multi-round
/// conversation for auto-resume after a max-turn exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationRecord {
    pub task: TaskName,
    pub session_id: String,
    pub turns_used: u32,
    pub max_turns: u32,
    pub file: String,
    pub continuation_count: u32,
    pub updated_at: String,
}

/// Hard-coded continuation limit (Open Question in the spec, resolved: not
/// per-task configurable).
pub const CONTINUATION_LIMIT: u32 = 5;

impl ContinuationRecord {
    pub fn should_continue(&self) -> bool {
        self.continuation_count < CONTINUATION_LIMIT
    }
}

/// `<state>/failures/<task>/<file>.failed` — a structured failure sentinel
/// (counter + timestamps) rather than a bare touch-file, so the scheduler
/// can log how many times a `(task, file)` pair has failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureSentinel {
    pub attempts: u32,
    pub first_failed_at: String,
    pub last_failed_at: String,
    pub last_exit_code: i32,
}

/// How the invoker's `TOKEN_EXHAUSTED:<value>` payload was interpreted: a
/// relative second count, or an absolute Unix epoch second count (see the
/// rate-limit reset unit inference rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitSignal {
    RelativeSeconds(i64),
    AbsoluteEpochSeconds(i64),
}

impl RateLimitSignal {
    /// Magnitude threshold above which a bare number is treated as an
    /// absolute Unix timestamp rather than a relative second count.
    const ABSOLUTE_THRESHOLD: i64 = 1_000_000_000;

    /// Interpret a raw reset value per the magnitude heuristic. Values at
    /// or below zero are treated as 60 seconds (boundary behavior).
    pub fn from_raw(raw: i64) -> Self {
        if raw <= 0 {
            return RateLimitSignal::RelativeSeconds(60);
        }
        if raw >= Self::ABSOLUTE_THRESHOLD {
            RateLimitSignal::AbsoluteEpochSeconds(raw)
        } else {
            RateLimitSignal::RelativeSeconds(raw)
        }
    }

    /// Resolve to an absolute reset instant given the current time.
    pub fn reset_at(self, now: i64) -> i64 {
        match self {
            RateLimitSignal::RelativeSeconds(n) => now + n,
            RateLimitSignal::AbsoluteEpochSeconds(at) => at,
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
