// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Desktop notification adapter using `notify-rust`.

use super::{NotifyAdapter, NotifyError, NotifyOptions, Priority};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifyAdapter;

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn notify(&self, title: &str, message: &str, options: NotifyOptions) -> Result<(), NotifyError> {
        let title = title.to_string();
        let message = message.to_string();
        // notify_rust::Notification::show() is synchronous on some
        // platforms; run it on the blocking pool to avoid blocking the
        // scheduler's select! loop while capping OS thread count.
        tokio::task::spawn_blocking(move || {
            let mut notification = notify_rust::Notification::new();
            notification.summary(&title).body(&message);
            if options.priority == Priority::High {
                notification.urgency(notify_rust::Urgency::Critical);
            }
            tracing::info!(%title, %message, priority = ?options.priority, "sending desktop notification");
            match notification.show() {
                Ok(_) => tracing::info!(%title, "desktop notification sent"),
                Err(e) => tracing::warn!(%title, error = %e, "desktop notification failed"),
            }
        });
        Ok(())
    }
}
