// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Small formatting helpers shared by the watcher and scheduler: RFC3339
//! timestamps at the storage boundary, and the filesystem-safe variants
//! `AuditJournal::write_record` and the partial-response path need.

/// RFC3339 timestamp for the event queue's `ISO8601|...` line format and
/// for audit/journal records.
pub fn format_timestamp(now: tl_core::UnixSeconds) -> String {
    chrono::DateTime::from_timestamp(now, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| now.to_string())
}

/// An RFC3339 timestamp with `:` replaced by `-`, safe to embed in a
/// filename (e.g. `<state>/audit/<task>/<filename_ts>.json`).
pub fn filesystem_safe_timestamp(ts: &str) -> String {
    ts.replace(':', "-")
}

/// The `YYYY-MM-DD` date portion of an RFC3339 timestamp, for
/// `<state>/usage/<date>.json`.
pub fn date_only(ts: &str) -> String {
    ts.get(0..10).unwrap_or(ts).to_string()
}

/// Replace path-unsafe characters so a task/file name can be embedded in a
/// single filename component under `<state>/partial/`.
pub fn sanitize_for_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

#[cfg(test)]
#[path = "util_tests.rs"]
mod tests;
