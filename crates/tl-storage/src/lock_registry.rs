// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Per-backend, per-task PID-bearing mutual exclusion with staleness
//! reaping. See §4.3: a lock file's body is the PID of the owning
//! subprocess; a lock is live iff that PID exists.

use crate::layout::StateLayout;
use crate::pid::{is_pid_alive, parse_pid};
use std::path::PathBuf;
use thiserror::Error;
use tl_core::TaskName;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of [`LockRegistry::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    Live(i32),
    None,
}

/// Mutual exclusion over `(backend, task)` pairs, persisted as
/// `<state>/locks/<backend>/<task>.lock` files whose body is a PID.
pub struct LockRegistry {
    layout: StateLayout,
}

impl LockRegistry {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    fn io_err(path: &std::path::Path, source: std::io::Error) -> LockError {
        LockError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Acquire the lock for `(backend, task)` if it is not already held by
    /// a live process. Returns `Ok(true)` on success, `Ok(false)` if busy.
    pub fn acquire(&self, backend: &str, task: &TaskName, pid: i32) -> Result<bool, LockError> {
        let path = self.layout.lock_path(backend, task);

        if let LockStatus::Live(_) = self.check(backend, task)? {
            return Ok(false);
        }

        crate::write_atomic(&path, pid.to_string().as_bytes())
            .map_err(|e| Self::io_err(&path, std::io::Error::other(e.to_string())))?;

        // Race check: re-read to confirm we hold it (a concurrent acquirer
        // could have written after our check-then-write race window; the
        // last writer wins, so confirm our PID is the one on disk).
        match std::fs::read_to_string(&path) {
            Ok(body) => Ok(parse_pid(&body) == Some(pid)),
            Err(e) => Err(Self::io_err(&path, e)),
        }
    }

    /// Rewrite the lock body, e.g. replacing the scheduler's own PID with
    /// the spawned invoker subprocess's PID after spawn.
    pub fn rewrite_pid(&self, backend: &str, task: &TaskName, pid: i32) -> Result<(), LockError> {
        let path = self.layout.lock_path(backend, task);
        crate::write_atomic(&path, pid.to_string().as_bytes())
            .map_err(|e| Self::io_err(&path, std::io::Error::other(e.to_string())))
    }

    /// Remove the lock file. Idempotent: removing an already-absent lock is
    /// not an error.
    pub fn release(&self, backend: &str, task: &TaskName) -> Result<(), LockError> {
        let path = self.layout.lock_path(backend, task);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(&path, e)),
        }
    }

    /// Whether `(backend, task)` currently has a live lock, and by which
    /// PID.
    pub fn check(&self, backend: &str, task: &TaskName) -> Result<LockStatus, LockError> {
        let path = self.layout.lock_path(backend, task);
        match std::fs::read_to_string(&path) {
            Ok(body) => match parse_pid(&body) {
                Some(pid) if is_pid_alive(pid) => Ok(LockStatus::Live(pid)),
                _ => Ok(LockStatus::None),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LockStatus::None),
            Err(e) => Err(Self::io_err(&path, e)),
        }
    }

    pub fn pid_of(&self, backend: &str, task: &TaskName) -> Result<Option<i32>, LockError> {
        Ok(match self.check(backend, task)? {
            LockStatus::Live(pid) => Some(pid),
            LockStatus::None => None,
        })
    }

    /// Number of locks for `backend` whose PID is live.
    pub fn count(&self, backend: &str) -> Result<u32, LockError> {
        let dir = self.layout.locks_dir(backend);
        let entries = match std::fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Self::io_err(&dir, e)),
        };

        let mut live = 0;
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_err(&dir, e))?;
            if let Ok(body) = std::fs::read_to_string(entry.path()) {
                if let Some(pid) = parse_pid(&body) {
                    if is_pid_alive(pid) {
                        live += 1;
                    }
                }
            }
        }
        Ok(live)
    }

    /// Sweep all backends; delete any lock whose PID is dead. Returns the
    /// number of locks reaped.
    pub fn reap_stale(&self) -> Result<u32, LockError> {
        let locks_root = self.layout.root().join("locks");
        let backend_dirs = match std::fs::read_dir(&locks_root) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Self::io_err(&locks_root, e)),
        };

        let mut reaped = 0;
        for backend_dir in backend_dirs {
            let backend_dir = backend_dir.map_err(|e| Self::io_err(&locks_root, e))?;
            if !backend_dir.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let entries = std::fs::read_dir(backend_dir.path())
                .map_err(|e| Self::io_err(&backend_dir.path(), e))?;
            for entry in entries {
                let entry = entry.map_err(|e| Self::io_err(&backend_dir.path(), e))?;
                let path = entry.path();
                let is_dead = match std::fs::read_to_string(&path) {
                    Ok(body) => match parse_pid(&body) {
                        Some(pid) => !is_pid_alive(pid),
                        None => true,
                    },
                    Err(_) => false,
                };
                if is_dead {
                    if std::fs::remove_file(&path).is_ok() {
                        reaped += 1;
                    }
                }
            }
        }
        Ok(reaped)
    }
}

#[cfg(test)]
#[path = "lock_registry_tests.rs"]
mod tests;
