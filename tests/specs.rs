//! Behavioral specifications for the `turnloopd` daemon binary.
//!
//! These tests are black-box: they spawn the real `turnloopd` binary
//! against a temporary vault and state directory, drive it through its
//! filesystem interface (turn files in, frame/lock/audit artifacts out),
//! and assert on what lands on disk and in its log.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// daemon/
#[path = "specs/daemon/help.rs"]
mod daemon_help;
#[path = "specs/daemon/lifecycle.rs"]
mod daemon_lifecycle;
#[path = "specs/daemon/dry_run.rs"]
mod daemon_dry_run;
