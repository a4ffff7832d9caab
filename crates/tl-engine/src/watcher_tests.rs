// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;
use tl_core::{Clock, FakeClock, QueueEventKind, SystemClock};

fn watcher(vault: &Path, clock: FakeClock) -> (Watcher<FakeClock>, tempfile::TempDir) {
    let state = tempdir().expect("tempdir");
    let queue = EventQueue::new(state.path().join("queue"), state.path().join("queue.lock"));
    (
        Watcher::new(vault, queue, clock, 300, Duration::from_secs(30), Duration::from_secs(2)),
        state,
    )
}

fn drain(watcher: &Watcher<FakeClock>) -> Vec<tl_core::QueueEvent> {
    watcher.queue.drain().expect("drain")
}

#[test]
fn queues_file_ready_for_a_user_ready_file() {
    let vault = tempdir().expect("tempdir");
    let task_dir = vault.path().join("demo");
    fs::create_dir_all(&task_dir).expect("mkdir");
    fs::write(task_dir.join("001_demo.md"), "hello\n<User>\n").expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    let events = drain(&w);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, QueueEventKind::FileReady);
    assert_eq!(events[0].task, tl_core::TaskName::new("demo"));
    assert_eq!(events[0].file, "001_demo.md");
}

#[test]
fn queues_stop_signal_when_stop_sentinel_present() {
    let vault = tempdir().expect("tempdir");
    let task_dir = vault.path().join("demo");
    fs::create_dir_all(&task_dir).expect("mkdir");
    fs::write(task_dir.join("001_demo.md"), "please stop\n<Stop>\n").expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    let events = drain(&w);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, QueueEventKind::StopSignal);
}

#[test]
fn backend_awaiting_reply_is_not_queued() {
    let vault = tempdir().expect("tempdir");
    let task_dir = vault.path().join("demo");
    fs::create_dir_all(&task_dir).expect("mkdir");
    fs::write(task_dir.join("001_demo.md"), "<!-- CLAUDE-RESPONSE -->\n\nhi\n\n# <User>\n").expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    assert!(drain(&w).is_empty());
}

#[test]
fn edited_backend_file_is_queued_once_ready() {
    let vault = tempdir().expect("tempdir");
    let task_dir = vault.path().join("demo");
    fs::create_dir_all(&task_dir).expect("mkdir");
    fs::write(
        task_dir.join("001_demo.md"),
        "<!-- CLAUDE-RESPONSE -->\n\nhi\n\nactually let me add more\n<User>\n",
    )
    .expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    let events = drain(&w);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, QueueEventKind::FileReady);
}

#[test]
fn not_ready_yet_is_not_queued() {
    let vault = tempdir().expect("tempdir");
    let task_dir = vault.path().join("demo");
    fs::create_dir_all(&task_dir).expect("mkdir");
    fs::write(task_dir.join("001_demo.md"), "still typing\n").expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    assert!(drain(&w).is_empty());
}

#[test]
fn stability_timeout_makes_a_stale_file_ready() {
    let vault = tempdir().expect("tempdir");
    let task_dir = vault.path().join("demo");
    fs::create_dir_all(&task_dir).expect("mkdir");
    fs::write(task_dir.join("001_demo.md"), "no sentinel, just old\n").expect("write");

    // The file's mtime is "now" as seen by the real OS clock; advance our
    // FakeClock far enough past it to cross the stability timeout.
    let real_now = SystemClock.now();
    let (mut w, _state) = watcher(vault.path(), FakeClock::new(real_now + 301));
    w.scan_once();

    assert_eq!(drain(&w).len(), 1);
}

#[test]
fn skips_files_directly_under_vault_root() {
    let vault = tempdir().expect("tempdir");
    fs::write(vault.path().join("loose.md"), "<User>\n").expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    assert!(drain(&w).is_empty());
}

#[test]
fn skips_hidden_directories() {
    let vault = tempdir().expect("tempdir");
    let hidden = vault.path().join(".obsidian");
    fs::create_dir_all(&hidden).expect("mkdir");
    fs::write(hidden.join("001_x.md"), "<User>\n").expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    assert!(drain(&w).is_empty());
}

#[test]
fn skips_status_file() {
    let vault = tempdir().expect("tempdir");
    let task_dir = vault.path().join("demo");
    fs::create_dir_all(&task_dir).expect("mkdir");
    fs::write(task_dir.join("_status.md"), "<User>\n").expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    assert!(drain(&w).is_empty());
}

#[test]
fn skips_directories_with_invalid_task_names() {
    let vault = tempdir().expect("tempdir");
    let bad = vault.path().join("Not_Valid!");
    fs::create_dir_all(&bad).expect("mkdir");
    fs::write(bad.join("001_x.md"), "<User>\n").expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    assert!(drain(&w).is_empty());
}

#[test]
fn picks_highest_numeric_prefix_per_task() {
    let vault = tempdir().expect("tempdir");
    let task_dir = vault.path().join("demo");
    fs::create_dir_all(&task_dir).expect("mkdir");
    fs::write(task_dir.join("001_demo.md"), "<!-- CLAUDE-RESPONSE -->\n\nold\n\n# <User>\n").expect("write");
    fs::write(task_dir.join("002_demo.md"), "newer reply\n<User>\n").expect("write");

    let (mut w, _state) = watcher(vault.path(), FakeClock::new(1_000));
    w.scan_once();

    let events = drain(&w);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].file, "002_demo.md");
}
