// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Task name validation: `[a-z0-9][a-z0-9-]*[a-z0-9]`, and rejection of
//! path-traversal-shaped names at every boundary that accepts one from the
//! filesystem or the event queue.

use thiserror::Error;

/// Errors from validating a task name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskNameError {
    #[error("task name is empty")]
    Empty,
    #[error("task name {0:?} contains a path separator or traversal segment")]
    PathTraversal(String),
    #[error("task name {0:?} does not match [a-z0-9][a-z0-9-]*[a-z0-9]")]
    InvalidShape(String),
}

/// Validate a task (directory) name against the naming invariant in the
/// data model and reject anything that could escape the vault directory.
///
/// This is the single boundary check every component that accepts a task
/// name from an external source (filesystem scan, event queue line, CLI
/// argument) must call before touching state on disk.
pub fn validate_task_name(name: &str) -> Result<(), TaskNameError> {
    if name.is_empty() {
        return Err(TaskNameError::Empty);
    }
    if name.contains('/') || name.contains('\\') || name.split('/').any(|seg| seg == "..") {
        return Err(TaskNameError::PathTraversal(name.to_string()));
    }

    let bytes = name.as_bytes();
    let is_alnum_lower = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    let shape_ok = if bytes.len() == 1 {
        is_alnum_lower(bytes[0])
    } else {
        is_alnum_lower(bytes[0])
            && is_alnum_lower(bytes[bytes.len() - 1])
            && bytes[1..bytes.len() - 1]
                .iter()
                .all(|&b| is_alnum_lower(b) || b == b'-')
    };

    if !shape_ok {
        return Err(TaskNameError::InvalidShape(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
#[path = "task_name_tests.rs"]
mod tests;
