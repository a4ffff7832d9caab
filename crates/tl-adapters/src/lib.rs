// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tl-adapters: the per-backend `Invoker` trait and its hosted/local
//! implementations, the `StderrParser` trait that factors all backend
//! stderr regex matching in one place per backend, and the `NotifyAdapter`
//! trait with a desktop and a no-op implementation.

pub mod env;
pub mod invoker;
pub mod notify;
pub mod parser;

pub use invoker::{
    ClaudeInvoker, InvokeExit, InvokeOutcome, InvokeRequest, Invoker, InvokerError, OllamaInvoker,
};
pub use notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError, NotifyOptions, Priority};
pub use parser::{ClaudeStderrParser, OllamaStderrParser, StderrParser};

#[cfg(any(test, feature = "test-support"))]
pub use invoker::{FakeInvoker, InvokeCall};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
