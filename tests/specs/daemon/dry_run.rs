//! End-to-end dry-run pipeline: a ready turn file flows from the watcher
//! through routing and admission without ever spawning a backend
//! subprocess (§4.10 "DRY-RUN mode").

use crate::prelude::*;
use std::time::Duration;

#[test]
fn ready_file_is_routed_and_logged_without_invoking_a_backend() {
    let project = Project::empty().with_backend("claude", "api", "claude-fake").dry_run();

    project.turn_file("demo", "001_demo.md", "please summarize foo\n<User>\n");

    let mut daemon = project.spawn();

    let routed = wait_for(SPEC_WAIT_MAX_MS, || {
        project.daemon_log().contains("dry run: would invoke backend")
    });
    assert!(routed, "expected a dry-run routing log line\nlog: {}", project.daemon_log());

    let log = project.daemon_log();
    assert!(log.contains("demo"), "expected the task name in the log\nlog: {log}");
    assert!(log.contains("claude"), "expected the routed backend name in the log\nlog: {log}");

    // A dry run never produces a framed response.
    assert!(project.read_turn_file("demo", "001_demo_response.md").is_none());

    daemon.terminate();
    daemon.wait_exit(Duration::from_secs(10));
}

#[test]
fn a_backend_turn_file_is_left_alone() {
    let project = Project::empty().with_backend("claude", "api", "claude-fake").dry_run();

    project.turn_file(
        "demo",
        "001_demo.md",
        "<!-- CLAUDE-RESPONSE -->\n\nsome prior answer\n\n# <User>\n",
    );

    let mut daemon = project.spawn();

    // Give the watcher several poll cycles to notice the task and confirm
    // it never queues a dry-run invocation for a file awaiting the user.
    std::thread::sleep(Duration::from_millis(500));
    let log = project.daemon_log();
    assert!(
        !log.contains("dry run: would invoke backend"),
        "a backend-authored turn awaiting the user must not be dispatched\nlog: {log}"
    );

    daemon.terminate();
    daemon.wait_exit(Duration::from_secs(10));
}
