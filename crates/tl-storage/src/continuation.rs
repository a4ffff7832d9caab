// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! `<state>/continuations/<task>.json`: tracks an in-flight multi-round
//! conversation created when an invocation exits with `turns_used ==
//! max_turns`, so the Scheduler knows whether to auto-resume.

use crate::layout::StateLayout;
use std::path::PathBuf;
use thiserror::Error;
use tl_core::{ContinuationRecord, TaskName};

#[derive(Debug, Error)]
pub enum ContinuationStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed continuation record at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct ContinuationStore {
    layout: StateLayout,
}

impl ContinuationStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    fn io_err(&self, path: &std::path::Path, source: std::io::Error) -> ContinuationStoreError {
        ContinuationStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn read(&self, task: &TaskName) -> Result<Option<ContinuationRecord>, ContinuationStoreError> {
        let path = self.layout.continuation_path(task);
        match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| ContinuationStoreError::Malformed { path, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(&path, e)),
        }
    }

    fn write(&self, record: &ContinuationRecord) -> Result<(), ContinuationStoreError> {
        let path = self.layout.continuation_path(&record.task);
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|source| ContinuationStoreError::Malformed { path: path.clone(), source })?;
        crate::write_atomic(&path, &bytes)
            .map_err(|e| self.io_err(&path, std::io::Error::other(e.to_string())))
    }

    /// Record (or advance) an in-flight continuation, incrementing
    /// `continuation_count` from whatever it already was.
    pub fn mark(
        &self,
        task: &TaskName,
        session_id: &str,
        turns_used: u32,
        max_turns: u32,
        file: &str,
        updated_at: &str,
    ) -> Result<ContinuationRecord, ContinuationStoreError> {
        let continuation_count = self.read(task)?.map_or(0, |r| r.continuation_count) + 1;
        let record = ContinuationRecord {
            task: task.clone(),
            session_id: session_id.to_string(),
            turns_used,
            max_turns,
            file: file.to_string(),
            continuation_count,
            updated_at: updated_at.to_string(),
        };
        self.write(&record)?;
        Ok(record)
    }

    /// Idempotent: clearing an already-absent continuation is not an error.
    pub fn clear(&self, task: &TaskName) -> Result<(), ContinuationStoreError> {
        let path = self.layout.continuation_path(task);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(&path, e)),
        }
    }

    pub fn session_id(&self, task: &TaskName) -> Result<Option<String>, ContinuationStoreError> {
        Ok(self.read(task)?.map(|r| r.session_id))
    }

    pub fn turns_used(&self, task: &TaskName) -> Result<Option<u32>, ContinuationStoreError> {
        Ok(self.read(task)?.map(|r| r.turns_used))
    }

    /// `false` both when no continuation is in flight and when the limit
    /// has been reached.
    pub fn should_continue(&self, task: &TaskName) -> Result<bool, ContinuationStoreError> {
        Ok(self.read(task)?.is_some_and(|r| r.should_continue()))
    }
}

#[cfg(test)]
#[path = "continuation_tests.rs"]
mod tests;
