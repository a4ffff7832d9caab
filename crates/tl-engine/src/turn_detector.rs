// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Classifies the latest turn file in a task directory and decides whether
//! it is ready to drive another invocation (§4.1).

use crate::frame_match::{has_stop_line, has_user_placeholder_line, has_user_ready_line};
use std::fs;
use std::io;
use std::path::Path;
use tl_core::{Clock, TaskName, UnixSeconds, FRAME_HEADER};

/// What the latest turn file in a task directory represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A backend-authored response, still awaiting a user reply.
    Backend,
    /// A plain file a user wrote (no frame header at all).
    User,
    /// A backend-authored frame whose trailing placeholder the user edited
    /// or removed in place, rather than appending a fresh file.
    Edited,
}

/// A turn file's content and last-modified time, read once and reused
/// across `classify`/`is_ready`/`detect_stop` so callers don't pay for
/// three separate stats and reads of the same path.
#[derive(Debug, Clone)]
pub struct TurnFile {
    pub content: String,
    pub modified_at: UnixSeconds,
}

impl TurnFile {
    pub fn read(task_dir: &Path, filename: &str) -> io::Result<Self> {
        let path = task_dir.join(filename);
        let content = fs::read_to_string(&path)?;
        let metadata = fs::metadata(&path)?;
        let modified_at = metadata
            .modified()?
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Ok(Self { content, modified_at })
    }
}

#[derive(Clone)]
pub struct TurnDetector<C: Clock> {
    clock: C,
    stability_timeout_secs: i64,
}

impl<C: Clock> TurnDetector<C> {
    pub fn new(clock: C, stability_timeout_secs: i64) -> Self {
        Self { clock, stability_timeout_secs }
    }

    /// The task directory's highest numerically-prefixed `.md` file, or
    /// `None` if the directory holds no such file (an empty task, or one
    /// containing only non-numbered files like `_status.md`).
    pub fn latest_file(&self, task_dir: &Path) -> io::Result<Option<String>> {
        let mut best: Option<(u64, String)> = None;
        for entry in fs::read_dir(task_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(".md") else { continue };
            let Some((prefix, _)) = stem.split_once('_') else { continue };
            let Ok(n) = prefix.parse::<u64>() else { continue };
            if best.as_ref().map_or(true, |(best_n, _)| n > *best_n) {
                best = Some((n, name.to_string()));
            }
        }
        Ok(best.map(|(_, name)| name))
    }

    /// §4.1: a frame-headed file with the trailing placeholder intact is
    /// `backend`; a frame-headed file without it (placeholder edited away
    /// or replaced by real content) is `edited`; anything without the
    /// header at all is `user`.
    pub fn classify(&self, file: &TurnFile) -> Classification {
        let first_line_is_header = file.content.lines().next().map(str::trim) == Some(FRAME_HEADER);
        if !first_line_is_header {
            return Classification::User;
        }
        if has_user_placeholder_line(&file.content) {
            Classification::Backend
        } else {
            Classification::Edited
        }
    }

    /// A file is ready to drive the next invocation once the user has
    /// either typed the bare `<User>` sentinel, or the file has sat
    /// unmodified past the stability timeout (so a slow multi-paragraph
    /// edit doesn't get interrupted mid-save).
    pub fn is_ready(&self, file: &TurnFile) -> bool {
        if has_user_ready_line(&file.content) {
            return true;
        }
        self.clock.now().saturating_sub(file.modified_at) >= self.stability_timeout_secs
    }

    /// `^\s*<Stop>\s*$` anywhere in the file ends the conversation (§4.1,
    /// §4.9).
    pub fn detect_stop(&self, file: &TurnFile) -> bool {
        has_stop_line(&file.content)
    }

    /// The zero-padded 3-digit successor to `current`'s numeric prefix,
    /// widening past 3 digits without further padding once the count
    /// exceeds 999.
    pub fn next_filename(current: &str, task: &TaskName) -> String {
        let stem = current.strip_suffix(".md").unwrap_or(current);
        let prefix = stem.split_once('_').map_or(stem, |(p, _)| p);
        let n: u64 = prefix.parse().unwrap_or(0);
        let next = n + 1;
        let formatted = if next < 1000 { format!("{next:03}") } else { next.to_string() };
        format!("{formatted}_{task}.md")
    }
}

#[cfg(test)]
#[path = "turn_detector_tests.rs"]
mod tests;
