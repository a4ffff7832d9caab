// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! `<state>/failures/<task>/<file>.failed`: a structured counter so the
//! Scheduler can recognize a deterministically-failing `(task, file)` pair
//! without re-deriving it from the audit trail, and avoid tight-looping on
//! it.

use crate::layout::StateLayout;
use std::path::PathBuf;
use thiserror::Error;
use tl_core::{FailureSentinel, TaskName};

#[derive(Debug, Error)]
pub enum FailureSentinelError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed failure sentinel at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct FailureSentinelStore {
    layout: StateLayout,
}

impl FailureSentinelStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    fn io_err(&self, path: &std::path::Path, source: std::io::Error) -> FailureSentinelError {
        FailureSentinelError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn read(
        &self,
        task: &TaskName,
        file: &str,
    ) -> Result<Option<FailureSentinel>, FailureSentinelError> {
        let path = self.layout.failure_path(task, file);
        match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| FailureSentinelError::Malformed { path, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(&path, e)),
        }
    }

    /// Record a failed invocation, incrementing `attempts` if a sentinel
    /// already exists for this `(task, file)`.
    pub fn record_failure(
        &self,
        task: &TaskName,
        file: &str,
        exit_code: i32,
        now: &str,
    ) -> Result<FailureSentinel, FailureSentinelError> {
        let existing = self.read(task, file)?;
        let sentinel = match existing {
            Some(prior) => FailureSentinel {
                attempts: prior.attempts + 1,
                first_failed_at: prior.first_failed_at,
                last_failed_at: now.to_string(),
                last_exit_code: exit_code,
            },
            None => FailureSentinel {
                attempts: 1,
                first_failed_at: now.to_string(),
                last_failed_at: now.to_string(),
                last_exit_code: exit_code,
            },
        };

        let path = self.layout.failure_path(task, file);
        let bytes = serde_json::to_vec_pretty(&sentinel)
            .map_err(|source| FailureSentinelError::Malformed { path: path.clone(), source })?;
        crate::write_atomic(&path, &bytes)
            .map_err(|e| self.io_err(&path, std::io::Error::other(e.to_string())))?;
        Ok(sentinel)
    }

    /// Idempotent: clearing an already-absent sentinel is not an error.
    pub fn clear(&self, task: &TaskName, file: &str) -> Result<(), FailureSentinelError> {
        let path = self.layout.failure_path(task, file);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(&path, e)),
        }
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
