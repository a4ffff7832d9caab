// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Path conventions under `<state>`, per the External Interfaces state
//! directory layout. Centralizing these here means every other module in
//! this crate (and `tl-adapters`' invoker, which writes stderr logs) agrees
//! on exactly where an artifact lives.

use std::path::{Path, PathBuf};
use tl_core::TaskName;

/// Root of the runtime state tree, default `~/.claude-task-system`.
#[derive(Debug, Clone)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lock_path(&self, backend: &str, task: &TaskName) -> PathBuf {
        self.root
            .join("locks")
            .join(backend)
            .join(format!("{task}.lock"))
    }

    pub fn locks_dir(&self, backend: &str) -> PathBuf {
        self.root.join("locks").join(backend)
    }

    pub fn queue_path(&self) -> PathBuf {
        self.root.join("events").join("queue")
    }

    pub fn queue_lock_path(&self) -> PathBuf {
        self.root.join("events").join("queue.lock")
    }

    pub fn session_path(&self, task: &TaskName) -> PathBuf {
        self.root.join("sessions").join(format!("{task}.session"))
    }

    pub fn continuation_path(&self, task: &TaskName) -> PathBuf {
        self.root
            .join("continuations")
            .join(format!("{task}.json"))
    }

    pub fn token_state_path(&self) -> PathBuf {
        self.root.join("token-state.json")
    }

    pub fn journal_path(&self) -> PathBuf {
        self.root.join("journal.log")
    }

    pub fn audit_dir(&self, task: &TaskName) -> PathBuf {
        self.root.join("audit").join(task.as_str())
    }

    pub fn usage_path(&self, date: &str) -> PathBuf {
        self.root.join("usage").join(format!("{date}.json"))
    }

    pub fn partial_path(&self, safe_task: &str, safe_file: &str, ts: &str) -> PathBuf {
        self.root
            .join("partial")
            .join(format!("{safe_task}_{safe_file}_{ts}.md"))
    }

    pub fn failure_path(&self, task: &TaskName, file: &str) -> PathBuf {
        self.root
            .join("failures")
            .join(task.as_str())
            .join(format!("{file}.failed"))
    }

    pub fn complexity_path(&self, task: &TaskName) -> PathBuf {
        self.root.join("complexity").join(task.as_str())
    }

    pub fn backend_log_path(&self, task: &TaskName, output_file: &str) -> PathBuf {
        self.root
            .join("logs")
            .join(format!("{task}_{output_file}.log"))
    }

    pub fn daemon_log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// All subdirectories the Supervisor must create on startup.
    pub fn required_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.root.join("locks"),
            self.root.join("events"),
            self.root.join("sessions"),
            self.root.join("continuations"),
            self.root.join("audit"),
            self.root.join("usage"),
            self.root.join("partial"),
            self.root.join("failures"),
            self.root.join("complexity"),
            self.root.join("logs"),
        ]
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
