// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Write-tempfile, fsync, rename: the one primitive every mutator in this
//! crate (TokenState, usage counters, continuation records, audit records,
//! session files) is built on for atomic updates.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtomicWriteError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path, source: std::io::Error) -> AtomicWriteError {
    AtomicWriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Atomically write `contents` to `path`: create parent directories if
/// needed, write to a sibling `.tmp` file, fsync it, then rename over the
/// final path. On POSIX, rename is atomic with respect to concurrent
/// readers — a reader never observes a partially-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AtomicWriteError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;

    let tmp_path = tmp_path_for(path);
    {
        let mut file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
        file.write_all(contents).map_err(|e| io_err(&tmp_path, e))?;
        file.sync_all().map_err(|e| io_err(&tmp_path, e))?;
    }
    fs::rename(&tmp_path, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp.{}", std::process::id()))
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
