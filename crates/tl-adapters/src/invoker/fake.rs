// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! A scriptable `Invoker` double for engine-level tests that must not
//! shell out to a real `claude`/`ollama` binary.

use super::{InvokeOutcome, InvokeRequest, Invoker, InvokerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct InvokeCall {
    pub request: InvokeRequest,
}

struct FakeInvokerState {
    calls: Vec<InvokeCall>,
    responses: VecDeque<Result<InvokeOutcome, String>>,
    default_outcome: Option<InvokeOutcome>,
}

/// Replays queued outcomes in order; once exhausted, falls back to a
/// `default_outcome` if one was set via [`FakeInvoker::with_default`].
#[derive(Clone)]
pub struct FakeInvoker {
    inner: Arc<Mutex<FakeInvokerState>>,
}

impl Default for FakeInvoker {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeInvokerState {
                calls: Vec::new(),
                responses: VecDeque::new(),
                default_outcome: None,
            })),
        }
    }
}

impl FakeInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_outcome(&self, outcome: InvokeOutcome) {
        self.inner.lock().responses.push_back(Ok(outcome));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.inner.lock().responses.push_back(Err(message.into()));
    }

    pub fn with_default(self, outcome: InvokeOutcome) -> Self {
        self.inner.lock().default_outcome = Some(outcome);
        self
    }

    pub fn calls(&self) -> Vec<InvokeCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl Invoker for FakeInvoker {
    async fn invoke(
        &self,
        request: InvokeRequest,
        pid_tx: tokio::sync::oneshot::Sender<i32>,
    ) -> Result<InvokeOutcome, InvokerError> {
        let mut state = self.inner.lock();
        state.calls.push(InvokeCall {
            request: request.clone(),
        });
        let result = if let Some(result) = state.responses.pop_front() {
            result.map_err(|message| InvokerError::Io(std::io::Error::other(message)))
        } else {
            state
                .default_outcome
                .clone()
                .ok_or_else(|| InvokerError::Io(std::io::Error::other("FakeInvoker: no outcome queued")))
        };
        if let Ok(outcome) = &result {
            if let Some(pid) = outcome.pid {
                let _ = pid_tx.send(pid);
            }
        }
        result
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
