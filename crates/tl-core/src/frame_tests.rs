// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;

#[test]
fn render_frame_matches_exact_shape() {
    let rendered = render_frame("hello world");
    assert_eq!(
        rendered,
        "<!-- CLAUDE-RESPONSE -->\n\nhello world\n\n# <User>\n"
    );
}

#[test]
fn strip_frame_removes_header_and_placeholder() {
    let framed = render_frame("the response body");
    assert_eq!(strip_frame(&framed), "the response body");
}

#[test]
fn strip_frame_removes_bare_user_sentinel_from_plain_reply() {
    let content = "please summarize foo\n<User>\n";
    assert_eq!(strip_frame(content), "please summarize foo");
}

#[test]
fn strip_frame_is_noop_on_already_bare_body() {
    assert_eq!(strip_frame("just a body"), "just a body");
}

#[test]
fn strip_frame_handles_multiline_body() {
    let content = "<!-- CLAUDE-RESPONSE -->\n\nline one\nline two\n\n# <User>\n";
    assert_eq!(strip_frame(content), "line one\nline two");
}
