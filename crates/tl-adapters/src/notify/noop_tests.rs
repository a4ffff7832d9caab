// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;

#[tokio::test]
async fn always_succeeds_and_discards() {
    let adapter = NoOpNotifyAdapter::new();
    let result = adapter.notify("title", "message", NotifyOptions::default()).await;
    assert!(result.is_ok());
}
