// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;
use yare::parameterized;

fn continuation(count: u32) -> ContinuationRecord {
    ContinuationRecord {
        task: TaskName::new("demo"),
        session_id: "abc-1".to_string(),
        turns_used: 10,
        max_turns: 10,
        file: "002_demo.md".to_string(),
        continuation_count: count,
        updated_at: "2026-07-28T00:00:00Z".to_string(),
    }
}

#[parameterized(
    zero = {0, true},
    four = {4, true},
    five = {5, false},
    six = {6, false},
)]
fn should_continue_false_at_or_above_limit(count: u32, expected: bool) {
    assert_eq!(continuation(count).should_continue(), expected);
}

#[parameterized(
    zero = {0, RateLimitSignal::RelativeSeconds(60)},
    negative = {-5, RateLimitSignal::RelativeSeconds(60)},
    small = {3600, RateLimitSignal::RelativeSeconds(3600)},
    epoch_like = {2_000_000_000, RateLimitSignal::AbsoluteEpochSeconds(2_000_000_000)},
)]
fn rate_limit_signal_magnitude_heuristic(raw: i64, expected: RateLimitSignal) {
    assert_eq!(RateLimitSignal::from_raw(raw), expected);
}

#[test]
fn relative_signal_adds_to_now() {
    let sig = RateLimitSignal::RelativeSeconds(60);
    assert_eq!(sig.reset_at(1_000), 1_060);
}

#[test]
fn absolute_signal_ignores_now() {
    let sig = RateLimitSignal::AbsoluteEpochSeconds(2_000_000_000);
    assert_eq!(sig.reset_at(1_000), 2_000_000_000);
}

#[test]
fn audit_record_round_trips_through_json() {
    let record = AuditRecord {
        task: TaskName::new("demo"),
        file: "002_demo.md".to_string(),
        backend: BackendName::new("claude"),
        session_id: Some("abc-1".to_string()),
        turns: Some(3),
        exit_code: Some(0),
        interrupted: false,
        timestamp: "2026-07-28T00:00:00Z".to_string(),
        stderr_excerpt: None,
    };
    let json = serde_json::to_string(&record).unwrap();
    let back: AuditRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record, back);
}
