// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! PID liveness checking, shared by `LockRegistry` and `AuditJournal`'s
//! incomplete-START detection.

use nix::sys::signal::kill;
use nix::unistd::Pid;

/// Parse a lock/journal body into a PID, rejecting anything that isn't a
/// bare non-negative integer (no traversal-shaped or signed values).
pub fn parse_pid(body: &str) -> Option<i32> {
    let trimmed = body.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i32>().ok()
}

/// Check whether a process with the given PID is alive, via `kill(pid, 0)`
/// semantics: no signal is actually delivered, only existence/permission is
/// checked.
pub fn is_pid_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(test)]
#[path = "pid_tests.rs"]
mod tests;
