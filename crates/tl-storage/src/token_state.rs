// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! `<state>/token-state.json`: per-backend rate-limit exhaustion, read by
//! `BackendRegistry` and written by the invoker on `TOKEN_EXHAUSTED`.
//! Reads are unlocked; the file is small and writers are serialized by the
//! scheduler, so eventual consistency is acceptable here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenStateError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed token state at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct BackendTokenState {
    exhausted: bool,
    reset_at: i64,
}

/// Per-backend exhaustion state, persisted as a flat JSON object keyed by
/// backend name.
pub struct TokenState {
    path: PathBuf,
}

impl TokenState {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, source: std::io::Error) -> TokenStateError {
        TokenStateError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn malformed(&self, source: serde_json::Error) -> TokenStateError {
        TokenStateError::Malformed {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<BTreeMap<String, BackendTokenState>, TokenStateError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| self.malformed(e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn save(&self, table: &BTreeMap<String, BackendTokenState>) -> Result<(), TokenStateError> {
        let bytes = serde_json::to_vec_pretty(table).map_err(|e| self.malformed(e))?;
        crate::write_atomic(&self.path, &bytes)
            .map_err(|e| self.io_err(std::io::Error::other(e.to_string())))
    }

    /// Create an empty token-state file if none exists yet.
    pub fn init(&self) -> Result<(), TokenStateError> {
        if self.path.exists() {
            return Ok(());
        }
        self.save(&BTreeMap::new())
    }

    pub fn mark_exhausted(&self, backend: &str, reset_at: i64) -> Result<(), TokenStateError> {
        let mut table = self.load()?;
        table.insert(
            backend.to_string(),
            BackendTokenState {
                exhausted: true,
                reset_at,
            },
        );
        self.save(&table)
    }

    pub fn clear(&self, backend: &str) -> Result<(), TokenStateError> {
        let mut table = self.load()?;
        table.remove(backend);
        self.save(&table)
    }

    /// `true` iff `backend` is flagged exhausted AND `now < reset_at`.
    pub fn is_exhausted(&self, backend: &str, now: i64) -> Result<bool, TokenStateError> {
        let table = self.load()?;
        Ok(match table.get(backend) {
            Some(state) => state.exhausted && now < state.reset_at,
            None => false,
        })
    }

    pub fn reset_at(&self, backend: &str) -> Result<Option<i64>, TokenStateError> {
        let table = self.load()?;
        Ok(table.get(backend).map(|state| state.reset_at))
    }
}

#[cfg(test)]
#[path = "token_state_tests.rs"]
mod tests;
