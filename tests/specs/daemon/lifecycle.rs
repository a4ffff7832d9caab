//! Daemon startup and graceful-shutdown specs (§4.11).

use crate::prelude::*;
use std::time::Duration;

#[test]
fn startup_creates_required_state_directories() {
    let project = Project::empty().dry_run();
    let mut daemon = project.spawn();

    let state = project.state_path().to_path_buf();
    let created = wait_for(SPEC_WAIT_MAX_MS, || {
        ["locks", "events", "sessions", "continuations", "audit", "usage", "partial", "failures", "complexity", "logs"]
            .iter()
            .all(|d| state.join(d).is_dir())
    });
    assert!(created, "expected all state subdirectories to exist\nlog: {}", project.daemon_log());

    daemon.terminate();
    assert!(daemon.wait_exit(Duration::from_secs(10)), "daemon did not exit after SIGTERM");
}

#[test]
fn sigterm_triggers_clean_shutdown() {
    let project = Project::empty().dry_run();
    let mut daemon = project.spawn();

    // Give the supervisor a moment to finish creating directories and
    // enter its select! loop before we ask it to stop.
    wait_for(SPEC_WAIT_MAX_MS, || project.state_path().join("logs").is_dir());

    daemon.terminate();
    assert!(
        daemon.wait_exit(Duration::from_secs(10)),
        "daemon did not exit within the shutdown window\nlog: {}",
        project.daemon_log()
    );
}
