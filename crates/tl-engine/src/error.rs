// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Error types for the engine crate.

use thiserror::Error;

/// Errors the [`crate::Scheduler`] can surface from a single dispatch.
/// Individual dispatch failures are logged and the event is dropped rather
/// than propagated — `SchedulerError` exists for the operations (startup,
/// directory creation) where a hard failure should stop the daemon.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("event queue error: {0}")]
    Queue(#[from] tl_storage::QueueError),
    #[error("lock registry error: {0}")]
    Routing(#[from] crate::backend_registry::RoutingError),
    #[error("audit journal error: {0}")]
    Audit(#[from] tl_storage::AuditJournalError),
    #[error("continuation store error: {0}")]
    Continuation(#[from] tl_storage::ContinuationStoreError),
    #[error("failure sentinel error: {0}")]
    Failure(#[from] tl_storage::FailureSentinelError),
    #[error("session store error: {0}")]
    Session(#[from] tl_storage::SessionError),
    #[error("invoker error: {0}")]
    Invoker(#[from] tl_adapters::InvokerError),
    #[error("notification error: {0}")]
    Notify(#[from] tl_adapters::NotifyError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invoker task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("no invoker registered for backend {0:?}")]
    UnknownBackend(String),
}

/// Errors from [`crate::Supervisor`] startup; per §7 category 4 (system
/// error), these are fatal and the daemon exits.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to create required state directory {path}: {source}")]
    StateDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
