// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;

#[test]
fn table_looks_up_by_name() {
    let table = BackendTable::new([
        Backend::new("claude", BackendKind::Api, "claude").with_max_parallel(2),
        Backend::new("ollama", BackendKind::Local, "ollama").with_max_parallel(1),
    ]);

    assert_eq!(table.len(), 2);
    assert_eq!(table.get("claude").unwrap().max_parallel, 2);
    assert_eq!(table.get("ollama").unwrap().kind, BackendKind::Local);
    assert!(table.get("missing").is_none());
}

#[test]
fn empty_table_reports_empty() {
    let table = BackendTable::default();
    assert!(table.is_empty());
}
