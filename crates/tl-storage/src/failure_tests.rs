// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;
use tempfile::tempdir;

fn store(dir: &std::path::Path) -> FailureSentinelStore {
    FailureSentinelStore::new(StateLayout::new(dir))
}

#[test]
fn read_is_none_when_absent() {
    let dir = tempdir().unwrap();
    let f = store(dir.path());
    assert_eq!(f.read(&TaskName::new("demo"), "001_demo.md").unwrap(), None);
}

#[test]
fn first_failure_starts_attempts_at_one() {
    let dir = tempdir().unwrap();
    let f = store(dir.path());
    let task = TaskName::new("demo");
    let sentinel = f
        .record_failure(&task, "001_demo.md", 1, "2026-07-28T00:00:00Z")
        .unwrap();
    assert_eq!(sentinel.attempts, 1);
    assert_eq!(sentinel.first_failed_at, "2026-07-28T00:00:00Z");
    assert_eq!(sentinel.last_failed_at, "2026-07-28T00:00:00Z");
    assert_eq!(sentinel.last_exit_code, 1);
}

#[test]
fn repeated_failures_increment_attempts_and_keep_first_failed_at() {
    let dir = tempdir().unwrap();
    let f = store(dir.path());
    let task = TaskName::new("demo");
    f.record_failure(&task, "001_demo.md", 1, "2026-07-28T00:00:00Z").unwrap();
    let sentinel = f
        .record_failure(&task, "001_demo.md", 2, "2026-07-28T01:00:00Z")
        .unwrap();
    assert_eq!(sentinel.attempts, 2);
    assert_eq!(sentinel.first_failed_at, "2026-07-28T00:00:00Z");
    assert_eq!(sentinel.last_failed_at, "2026-07-28T01:00:00Z");
    assert_eq!(sentinel.last_exit_code, 2);
}

#[test]
fn clear_is_idempotent() {
    let dir = tempdir().unwrap();
    let f = store(dir.path());
    let task = TaskName::new("demo");
    f.record_failure(&task, "001_demo.md", 1, "2026-07-28T00:00:00Z").unwrap();
    f.clear(&task, "001_demo.md").unwrap();
    f.clear(&task, "001_demo.md").unwrap();
    assert_eq!(f.read(&task, "001_demo.md").unwrap(), None);
}

#[test]
fn different_files_in_the_same_task_are_independent() {
    let dir = tempdir().unwrap();
    let f = store(dir.path());
    let task = TaskName::new("demo");
    f.record_failure(&task, "001_demo.md", 1, "2026-07-28T00:00:00Z").unwrap();
    assert_eq!(f.read(&task, "002_demo.md").unwrap(), None);
}
