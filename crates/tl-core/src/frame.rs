// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The exact frame that brackets a backend-produced turn file, and the
//! sentinels that `TurnDetector` reads out of a file's content.
//!
//! Keeping these as shared constants (rather than letting the scheduler's
//! classifier and the invoker's writer each hardcode their own copy of the
//! strings) is what makes the round-trip law in the spec — `classify` of a
//! freshly produced frame is always `backend` — hold by construction.

/// First line of every backend-authored turn file.
pub const FRAME_HEADER: &str = "<!-- CLAUDE-RESPONSE -->";

/// Placeholder sentinel a backend-authored file ends with, awaiting a user
/// reply. Note the leading `#` — this is what distinguishes it from the
/// user-typed readiness sentinel below.
pub const USER_SENTINEL_PLACEHOLDER: &str = "# <User>";

/// The sentinel a user types alone on a line to mark a file as ready.
/// Deliberately has no leading `#`.
pub const USER_SENTINEL: &str = "<User>";

/// The sentinel a user types alone on a line to terminate a conversation.
pub const STOP_SENTINEL: &str = "<Stop>";

/// Render the exact frame bytes for a successful invocation's output file:
/// `^<!-- CLAUDE-RESPONSE -->\n\n<body>\n\n# <User>\n$`.
pub fn render_frame(body: &str) -> String {
    format!("{FRAME_HEADER}\n\n{}\n\n{USER_SENTINEL_PLACEHOLDER}\n", body.trim_end())
}

/// Strip the response header and trailing user sentinel from a turn file's
/// content, leaving only the prompt/response body an invoker should send
/// onward (used when a previously-framed file becomes the next input,
/// either because it was a plain user reply or because it was `edited`).
pub fn strip_frame(content: &str) -> String {
    let mut lines: Vec<&str> = content.lines().collect();

    if lines.first().map(|l| l.trim()) == Some(FRAME_HEADER) {
        lines.remove(0);
    }

    while matches!(lines.last().map(|l| l.trim()), Some("")) {
        lines.pop();
    }

    if let Some(last) = lines.last() {
        let trimmed = last.trim();
        if trimmed == USER_SENTINEL_PLACEHOLDER || trimmed == USER_SENTINEL {
            lines.pop();
        }
    }

    while matches!(lines.last().map(|l| l.trim()), Some("")) {
        lines.pop();
    }
    while matches!(lines.first().map(|l| l.trim()), Some("")) {
        lines.remove(0);
    }

    lines.join("\n")
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
