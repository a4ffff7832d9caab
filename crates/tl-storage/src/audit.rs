// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Three durable audit artifacts: the append-only `journal.log` with
//! `START`/`END` lines, one JSON `AuditRecord` per invocation, and daily
//! per-backend usage counters.

use crate::layout::StateLayout;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tl_core::{AuditRecord, TaskName};
use tracing::debug;

#[derive(Debug, Error)]
pub enum AuditJournalError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record at {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct BackendUsage {
    total_turns: u64,
    task_count: u64,
    tasks: Vec<String>,
}

pub struct AuditJournal {
    layout: StateLayout,
}

impl AuditJournal {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    fn io_err(&self, path: &std::path::Path, source: std::io::Error) -> AuditJournalError {
        AuditJournalError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn append_line(&self, line: &str) -> Result<(), AuditJournalError> {
        let path = self.layout.journal_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| self.io_err(&path, e))?;
        file.lock_exclusive().map_err(|e| self.io_err(&path, e))?;
        let result = writeln!(file, "{line}").map_err(|e| self.io_err(&path, e));
        let _ = FileExt::unlock(&file);
        result
    }

    /// Append a `START` line keyed by `(task, pid)`.
    pub fn journal_start(
        &self,
        timestamp: &str,
        task: &TaskName,
        file: &str,
        backend: &str,
        pid: i32,
        session: Option<&str>,
    ) -> Result<(), AuditJournalError> {
        let mut line = format!("{timestamp} START {task} {file} {backend} pid={pid}");
        if let Some(session) = session {
            line.push_str(&format!(" session={session}"));
        }
        debug!(%task, %backend, pid, "journal START");
        self.append_line(&line)
    }

    /// Append an `END` line keyed by `(task, pid)`.
    pub fn journal_end(
        &self,
        timestamp: &str,
        task: &TaskName,
        file: &str,
        backend: &str,
        pid: i32,
        exit_code: i32,
        turns: Option<u32>,
    ) -> Result<(), AuditJournalError> {
        let mut line =
            format!("{timestamp} END {task} {file} {backend} pid={pid} exit={exit_code}");
        if let Some(turns) = turns {
            line.push_str(&format!(" turns={turns}"));
        }
        debug!(%task, %backend, pid, exit_code, "journal END");
        self.append_line(&line)
    }

    /// Write one `AuditRecord` as `<state>/audit/<task>/<filename_ts>.json`.
    /// `filename_ts` should be filesystem-safe (e.g. colons already
    /// replaced with `-`); the record's own `timestamp` field is untouched.
    pub fn write_record(
        &self,
        record: &AuditRecord,
        filename_ts: &str,
    ) -> Result<(), AuditJournalError> {
        let dir = self.layout.audit_dir(&record.task);
        let path = dir.join(format!("{filename_ts}.json"));
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|source| AuditJournalError::Malformed { path: path.clone(), source })?;
        crate::write_atomic(&path, &bytes)
            .map_err(|e| self.io_err(&path, std::io::Error::other(e.to_string())))
    }

    /// Read-modify-rewrite the daily usage counters for `backend`.
    pub fn update_usage(
        &self,
        date: &str,
        backend: &str,
        turns: u32,
        task: &TaskName,
    ) -> Result<(), AuditJournalError> {
        let path = self.layout.usage_path(date);
        let mut table: BTreeMap<String, BackendUsage> = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| AuditJournalError::Malformed { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(self.io_err(&path, e)),
        };

        let entry = table.entry(backend.to_string()).or_default();
        entry.total_turns += u64::from(turns);
        if !entry.tasks.iter().any(|t| t == task.as_str()) {
            entry.tasks.push(task.to_string());
            entry.task_count += 1;
        }

        let bytes = serde_json::to_vec_pretty(&table)
            .map_err(|source| AuditJournalError::Malformed { path: path.clone(), source })?;
        crate::write_atomic(&path, &bytes)
            .map_err(|e| self.io_err(&path, std::io::Error::other(e.to_string())))
    }

    /// Tasks with a `START` line in `journal.log` that no matching `END`
    /// (same `task`, same `pid`) closes. Purely an operator signal, not a
    /// recovery trigger.
    pub fn check_incomplete(&self) -> Result<Vec<TaskName>, AuditJournalError> {
        let path = self.layout.journal_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(&path, e)),
        };

        let mut open: Vec<(String, i32)> = Vec::new();
        for line in contents.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 5 {
                continue;
            }
            let kind = tokens[1];
            let task = tokens[2].to_string();
            let pid = tokens[4..]
                .iter()
                .find_map(|t| t.strip_prefix("pid="))
                .and_then(|v| v.parse::<i32>().ok());
            let Some(pid) = pid else { continue };

            match kind {
                "START" => open.push((task, pid)),
                "END" => open.retain(|(t, p)| !(*t == task && *p == pid)),
                _ => {}
            }
        }

        let mut tasks: Vec<TaskName> = Vec::new();
        for (task, _) in open {
            if !tasks.iter().any(|t| t.as_str() == task) {
                tasks.push(TaskName::new(task));
            }
        }
        Ok(tasks)
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
