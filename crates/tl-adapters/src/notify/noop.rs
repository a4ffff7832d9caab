// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! No-op notification adapter, for headless operation and tests.

use super::{NotifyAdapter, NotifyError, NotifyOptions};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn notify(&self, _title: &str, _message: &str, _options: NotifyOptions) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
