// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The append-only event queue file and its sibling lockfile.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tl_core::{QueueEvent, QueueEventKind, TaskName, TaskNameError};

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("invalid task name: {0}")]
    InvalidTask(#[from] TaskNameError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed queue line {line:?}: {source}")]
    Malformed {
        line: String,
        #[source]
        source: tl_core::event::QueueEventParseError,
    },
}

/// The single append-only queue file plus its exclusive-lock sibling.
#[derive(Debug, Clone)]
pub struct EventQueue {
    queue_path: PathBuf,
    lock_path: PathBuf,
}

impl EventQueue {
    pub fn new(queue_path: impl Into<PathBuf>, lock_path: impl Into<PathBuf>) -> Self {
        Self {
            queue_path: queue_path.into(),
            lock_path: lock_path.into(),
        }
    }

    fn io_err(&self, path: &Path, source: std::io::Error) -> QueueError {
        QueueError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn lock_file(&self) -> Result<File, QueueError> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(parent, e))?;
        }
        OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| self.io_err(&self.lock_path, e))
    }

    /// Append one line `ISO8601|kind|task|file|metadata` under an exclusive
    /// advisory lock. Rejects task names containing `/` or `..` at this
    /// boundary.
    pub fn write(
        &self,
        timestamp: &str,
        kind: QueueEventKind,
        task: &TaskName,
        file: &str,
        metadata: &str,
    ) -> Result<(), QueueError> {
        tl_core::validate_task_name(task.as_str())?;
        let event = QueueEvent::new(timestamp, kind, task.clone(), file, metadata);

        let lock_file = self.lock_file()?;
        lock_file
            .lock_exclusive()
            .map_err(|e| self.io_err(&self.lock_path, e))?;

        let result = (|| {
            if let Some(parent) = self.queue_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_err(parent, e))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.queue_path)
                .map_err(|e| self.io_err(&self.queue_path, e))?;
            writeln!(file, "{}", event.to_line()).map_err(|e| self.io_err(&self.queue_path, e))
        })();

        let _ = FileExt::unlock(&lock_file);
        result
    }

    /// Acquire the exclusive lock, read every line, truncate the file,
    /// release the lock, and return the parsed events. Atomic with respect
    /// to concurrent writers: no event is read twice, none are lost unless
    /// the process is killed between read and truncate.
    pub fn drain(&self) -> Result<Vec<QueueEvent>, QueueError> {
        let lock_file = self.lock_file()?;
        lock_file
            .lock_exclusive()
            .map_err(|e| self.io_err(&self.lock_path, e))?;

        let result = (|| {
            let mut file = match OpenOptions::new().read(true).write(true).open(&self.queue_path) {
                Ok(f) => f,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(self.io_err(&self.queue_path, e)),
            };

            let mut contents = String::new();
            file.read_to_string(&mut contents)
                .map_err(|e| self.io_err(&self.queue_path, e))?;

            file.set_len(0).map_err(|e| self.io_err(&self.queue_path, e))?;
            file.seek(SeekFrom::Start(0))
                .map_err(|e| self.io_err(&self.queue_path, e))?;

            contents
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|line| {
                    QueueEvent::parse_line(line).map_err(|source| QueueError::Malformed {
                        line: line.to_string(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })();

        let _ = FileExt::unlock(&lock_file);
        result
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
