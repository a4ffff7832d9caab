// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The per-backend subprocess adapter (§4.6). In the collapsed
//! single-process design (§9) the "invoker" is no longer a wrapping shell
//! script but the async function that drives the backend CLI as a
//! `tokio::process::Command` child directly, normalizing whatever it
//! observes on that child's stderr/exit code into the fixed
//! success/argument-error/daemon-down/rate-limit/other contract the
//! scheduler depends on.

mod claude;
mod ollama;

pub use claude::ClaudeInvoker;
pub use ollama::OllamaInvoker;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeInvoker, InvokeCall};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tl_core::{Complexity, RateLimitSignal, TaskName};

/// Everything the Scheduler knows about one invocation, handed to an
/// [`Invoker`] unchanged.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub task: TaskName,
    pub task_dir: PathBuf,
    pub input_file: String,
    pub output_file: String,
    pub resume_session: Option<String>,
    pub max_turns: u32,
    pub complexity: Complexity,
    pub stderr_log_path: PathBuf,
}

/// The normalized exit contract between an invoker and the Scheduler
/// (§4.6, §6): 0 success, 1 argument/env error, 2 backend daemon down
/// (local only), 10 rate limit, anything else passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeExit {
    Success,
    ArgumentError,
    BackendUnreachable,
    RateLimited,
    Other(i32),
}

impl InvokeExit {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => InvokeExit::Success,
            1 => InvokeExit::ArgumentError,
            2 => InvokeExit::BackendUnreachable,
            10 => InvokeExit::RateLimited,
            other => InvokeExit::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            InvokeExit::Success => 0,
            InvokeExit::ArgumentError => 1,
            InvokeExit::BackendUnreachable => 2,
            InvokeExit::RateLimited => 10,
            InvokeExit::Other(n) => n,
        }
    }
}

/// What an invocation produced, for the Scheduler to journal and act on.
#[derive(Debug, Clone)]
pub struct InvokeOutcome {
    pub exit: InvokeExit,
    /// The spawned child's OS PID, captured immediately after spawn so the
    /// Scheduler can rewrite the lock to it (§4.3) and target it with
    /// `stop_signal` termination (§4.10). `None` when the invocation never
    /// reached spawn (e.g. `BackendUnreachable`).
    pub pid: Option<i32>,
    pub session_id: Option<String>,
    pub turns_used: Option<u32>,
    pub max_turns_reported: Option<u32>,
    pub rate_limit: Option<RateLimitSignal>,
    pub stderr_excerpt: Option<String>,
}

impl InvokeOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit == InvokeExit::Success
    }

    /// True when the backend reported it hit the turn ceiling it was given,
    /// which drives the Scheduler's continuation decision in §4.10.
    pub fn hit_max_turns(&self, requested_max: u32) -> bool {
        self.turns_used == Some(requested_max)
    }
}

#[derive(Debug, Error)]
pub enum InvokerError {
    #[error("path traversal rejected: {0:?}")]
    PathTraversal(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to spawn backend subprocess: {0}")]
    Spawn(std::io::Error),
}

/// Executes a backend subprocess for one invocation.
///
/// `pid_tx` is sent the child's OS PID as soon as it is spawned — before
/// `invoke` awaits its completion — so the Scheduler can rewrite the lock
/// file to that PID (§4.3) while the invocation is still in flight and
/// `stop_signal` handling (§4.10) has something live to terminate. An
/// invocation that never reaches spawn (e.g. an unreachable local daemon)
/// simply drops the sender.
#[async_trait]
pub trait Invoker: Send + Sync + 'static {
    async fn invoke(
        &self,
        request: InvokeRequest,
        pid_tx: tokio::sync::oneshot::Sender<i32>,
    ) -> Result<InvokeOutcome, InvokerError>;
}

/// Reject `input_file`/`output_file` names that try to escape `task_dir`
/// (§4.6 point 1, §7 category 3).
pub(crate) fn reject_path_traversal(name: &str) -> Result<(), InvokerError> {
    if name.contains("..") || name.contains('/') {
        return Err(InvokerError::PathTraversal(name.to_string()));
    }
    Ok(())
}
