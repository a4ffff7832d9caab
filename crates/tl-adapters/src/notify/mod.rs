// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Notification adapters (§7): title, message, optional priority and link.
//! Delivery never blocks or fails the caller — failures are logged and
//! swallowed, the same contract the teacher's own notify adapters use.

mod desktop;
mod noop;

pub use desktop::DesktopNotifyAdapter;
pub use noop::NoOpNotifyAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Notification urgency. Priority notifications are used for rate limits,
/// repeated restarts, stop_signal processing, and fatal health-check
/// regressions (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// Optional fields beyond title/message.
#[derive(Debug, Clone, Default)]
pub struct NotifyOptions {
    pub priority: Priority,
    pub link: Option<String>,
}

impl NotifyOptions {
    pub fn high_priority() -> Self {
        Self {
            priority: Priority::High,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Adapter for sending notifications to whatever downstream delivery
/// channel is configured (out of scope here; only the interface is
/// specified — §1).
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn notify(&self, title: &str, message: &str, options: NotifyOptions) -> Result<(), NotifyError>;
}
