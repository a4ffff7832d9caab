// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! `<state>/sessions/<task>.session`: the opaque id a backend uses to
//! resume a conversation. Single-writer (one invoker per task at a time,
//! enforced by `LockRegistry`), TTL 24h, invalidated rather than deleted on
//! `stop_signal` so a later read can distinguish "never had a session"
//! from "had one, interrupted".

use crate::layout::StateLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tl_core::TaskName;

const SESSION_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed session file at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    session_id: String,
    updated_at: i64,
    invalidated: bool,
}

pub struct SessionStore {
    layout: StateLayout,
}

impl SessionStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    fn io_err(&self, path: &std::path::Path, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn read(&self, task: &TaskName) -> Result<Option<SessionRecord>, SessionError> {
        let path = self.layout.session_path(task);
        match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| SessionError::Malformed { path, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(&path, e)),
        }
    }

    pub fn write(&self, task: &TaskName, session_id: &str, now: i64) -> Result<(), SessionError> {
        let path = self.layout.session_path(task);
        let record = SessionRecord {
            session_id: session_id.to_string(),
            updated_at: now,
            invalidated: false,
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|source| SessionError::Malformed { path: path.clone(), source })?;
        crate::write_atomic(&path, &bytes)
            .map_err(|e| self.io_err(&path, std::io::Error::other(e.to_string())))
    }

    /// A usable session id: present, not invalidated, and within the 24h
    /// TTL. Anything else (missing, invalidated, stale) yields `None`. Also
    /// sweeps every task's session file for the 24h TTL (§3 "older files
    /// purged on next use") so the purge doesn't need its own scheduled job.
    pub fn fresh(&self, task: &TaskName, now: i64) -> Result<Option<String>, SessionError> {
        if let Err(e) = self.purge_stale(now) {
            tracing::warn!(error = %e, "failed to purge stale session files");
        }
        Ok(self.read(task)?.and_then(|record| {
            let fresh_enough = now - record.updated_at <= SESSION_TTL_SECONDS;
            (!record.invalidated && fresh_enough).then_some(record.session_id)
        }))
    }

    /// Mark the session invalidated in place, e.g. after a `stop_signal`
    /// interrupts the invoker holding it. A no-op if no session exists.
    pub fn invalidate(&self, task: &TaskName, now: i64) -> Result<(), SessionError> {
        let Some(mut record) = self.read(task)? else {
            return Ok(());
        };
        record.invalidated = true;
        record.updated_at = now;
        let path = self.layout.session_path(task);
        let bytes = serde_json::to_vec(&record)
            .map_err(|source| SessionError::Malformed { path: path.clone(), source })?;
        crate::write_atomic(&path, &bytes)
            .map_err(|e| self.io_err(&path, std::io::Error::other(e.to_string())))
    }

    /// Delete every session file older than the TTL. Returns the count
    /// purged.
    pub fn purge_stale(&self, now: i64) -> Result<u32, SessionError> {
        let dir = self.layout.root().join("sessions");
        let entries = match std::fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.io_err(&dir, e)),
        };

        let mut purged = 0;
        for entry in entries {
            let entry = entry.map_err(|e| self.io_err(&dir, e))?;
            let path = entry.path();
            let stale = match std::fs::read(&path) {
                Ok(bytes) => match serde_json::from_slice::<SessionRecord>(&bytes) {
                    Ok(record) => now - record.updated_at > SESSION_TTL_SECONDS,
                    Err(_) => true,
                },
                Err(_) => false,
            };
            if stale && std::fs::remove_file(&path).is_ok() {
                purged += 1;
            }
        }
        Ok(purged)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
