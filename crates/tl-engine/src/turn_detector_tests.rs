// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;
use std::fs;
use tl_core::FakeClock;
use yare::parameterized;

fn detector(now: i64, stability_timeout_secs: i64) -> TurnDetector<FakeClock> {
    TurnDetector::new(FakeClock::new(now), stability_timeout_secs)
}

fn file(content: &str, modified_at: i64) -> TurnFile {
    TurnFile { content: content.to_string(), modified_at }
}

#[test]
fn latest_file_picks_highest_numeric_prefix() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["001_demo.md", "010_demo.md", "002_demo.md", "_status.md", "notes.txt"] {
        fs::write(dir.path().join(name), "x").unwrap();
    }
    let d = detector(0, 300);
    assert_eq!(d.latest_file(dir.path()).unwrap(), Some("010_demo.md".to_string()));
}

#[test]
fn latest_file_is_none_when_no_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("_status.md"), "x").unwrap();
    let d = detector(0, 300);
    assert_eq!(d.latest_file(dir.path()).unwrap(), None);
}

#[parameterized(
    backend_with_placeholder = { "<!-- CLAUDE-RESPONSE -->\n\nhello\n\n# <User>\n", Classification::Backend },
    edited_placeholder_removed = { "<!-- CLAUDE-RESPONSE -->\n\nhello\n\nmy reply\n", Classification::Edited },
    plain_user_file = { "just a question\n", Classification::User },
)]
fn classify_cases(content: &str, expected: Classification) {
    let d = detector(0, 300);
    assert_eq!(d.classify(&file(content, 0)), expected);
}

#[test]
fn is_ready_true_when_user_sentinel_present() {
    let d = detector(100, 300);
    let f = file("some reply\n\n<User>\n", 100);
    assert!(d.is_ready(&f));
}

#[test]
fn is_ready_false_before_stability_timeout_with_no_sentinel() {
    let d = detector(100, 300);
    let f = file("still typing\n", 0);
    assert!(!d.is_ready(&f));
}

#[test]
fn is_ready_true_once_stability_timeout_elapses() {
    let d = detector(400, 300);
    let f = file("no sentinel, but old\n", 0);
    assert!(d.is_ready(&f));
}

#[test]
fn detect_stop_matches_bare_sentinel_with_surrounding_whitespace() {
    let d = detector(0, 300);
    assert!(d.detect_stop(&file("thanks\n\n  <Stop>  \n", 0)));
    assert!(!d.detect_stop(&file("thanks, not done yet\n", 0)));
}

#[parameterized(
    single_digit = { "003_task.md", "004_task.md" },
    rolls_into_new_decade = { "009_task.md", "010_task.md" },
    widens_past_three_digits = { "999_task.md", "1000_task.md" },
    already_wide = { "1000_task.md", "1001_task.md" },
)]
fn next_filename_cases(current: &str, expected: &str) {
    let task = TaskName::new("task");
    assert_eq!(TurnDetector::<FakeClock>::next_filename(current, &task), expected);
}
