// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Backend registry entries.

use crate::BackendName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a backend is a hosted API-backed CLI (session-aware, subject to
/// rate limits) or a local daemon-backed model (no sessions, no rate limits,
/// but can be unreachable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Api,
    Local,
}

/// A single entry in the process-wide, immutable-after-init backend table.
///
/// Constructed from `LLM_<NAME>_{TYPE,MAX_PARALLEL,COMMAND,FLAGS,MODEL,ENDPOINT,INVOKER}`
/// environment variables by `tl-daemon`'s config loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    pub name: BackendName,
    pub kind: BackendKind,
    pub command: String,
    pub max_parallel: u32,
    pub invoker_path: Option<String>,
    pub model: Option<String>,
    pub flags: Vec<String>,
    pub endpoint: Option<String>,
}

impl Backend {
    pub fn new(name: impl Into<BackendName>, kind: BackendKind, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            command: command.into(),
            max_parallel: 1,
            invoker_path: None,
            model: None,
            flags: Vec::new(),
            endpoint: None,
        }
    }

    pub fn with_max_parallel(mut self, n: u32) -> Self {
        self.max_parallel = n;
        self
    }
}

/// An immutable, name-indexed table of backends.
#[derive(Debug, Clone, Default)]
pub struct BackendTable {
    backends: BTreeMap<String, Backend>,
}

impl BackendTable {
    pub fn new(backends: impl IntoIterator<Item = Backend>) -> Self {
        Self {
            backends: backends
                .into_iter()
                .map(|b| (b.name.as_str().to_string(), b))
                .collect(),
        }
    }

    pub fn list(&self) -> impl Iterator<Item = &Backend> {
        self.backends.values()
    }

    pub fn get(&self, name: &str) -> Option<&Backend> {
        self.backends.get(name)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod tests;
