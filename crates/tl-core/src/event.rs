// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The event queue's line format: one [`QueueEvent`] per line,
//! `|`-separated, timestamp first.

use crate::TaskName;
use std::fmt;
use thiserror::Error;

/// The kind of a queued event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEventKind {
    FileReady,
    StopSignal,
    HeartbeatTrigger,
    ComplexityAssessed,
}

impl QueueEventKind {
    fn as_str(self) -> &'static str {
        match self {
            QueueEventKind::FileReady => "file_ready",
            QueueEventKind::StopSignal => "stop_signal",
            QueueEventKind::HeartbeatTrigger => "heartbeat_trigger",
            QueueEventKind::ComplexityAssessed => "complexity_assessed",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "file_ready" => Some(QueueEventKind::FileReady),
            "stop_signal" => Some(QueueEventKind::StopSignal),
            "heartbeat_trigger" => Some(QueueEventKind::HeartbeatTrigger),
            "complexity_assessed" => Some(QueueEventKind::ComplexityAssessed),
            _ => None,
        }
    }
}

impl fmt::Display for QueueEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One queued event: `{timestamp, kind, task, file, metadata}`.
///
/// `timestamp` is an RFC3339 string (formatted at the storage boundary,
/// where a real clock/chrono dependency lives); `tl-core` treats it as an
/// opaque string so this type stays dependency-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEvent {
    pub timestamp: String,
    pub kind: QueueEventKind,
    pub task: TaskName,
    pub file: String,
    /// Free-form metadata, e.g. `continuation:<session-id>`. Empty string
    /// when absent.
    pub metadata: String,
}

impl QueueEvent {
    pub fn new(
        timestamp: impl Into<String>,
        kind: QueueEventKind,
        task: impl Into<TaskName>,
        file: impl Into<String>,
        metadata: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            kind,
            task: task.into(),
            file: file.into(),
            metadata: metadata.into(),
        }
    }

    /// Extract the session id from `continuation:<sid>` metadata, if present.
    pub fn continuation_session_id(&self) -> Option<&str> {
        self.metadata.strip_prefix("continuation:")
    }
}

/// Errors parsing a queue line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueEventParseError {
    #[error("expected 5 `|`-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("unknown event kind {0:?}")]
    UnknownKind(String),
}

impl QueueEvent {
    /// Serialize to the one-line `ISO8601|kind|task|file|metadata` format.
    pub fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.timestamp, self.kind, self.task, self.file, self.metadata
        )
    }

    /// Parse a single queue line back into a [`QueueEvent`].
    pub fn parse_line(line: &str) -> Result<Self, QueueEventParseError> {
        let fields: Vec<&str> = line.splitn(5, '|').collect();
        if fields.len() != 5 {
            return Err(QueueEventParseError::WrongFieldCount(fields.len()));
        }
        let kind = QueueEventKind::from_str(fields[1])
            .ok_or_else(|| QueueEventParseError::UnknownKind(fields[1].to_string()))?;
        Ok(QueueEvent::new(fields[0], kind, fields[2], fields[3], fields[4]))
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
