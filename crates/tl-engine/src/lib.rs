// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tl-engine: the orchestration layer built on `tl-core`'s types and
//! `tl-storage`'s durable artifacts. A `Watcher` turns vault turn files
//! into queued events, a `Scheduler` drains those events and drives
//! backend invocations through `tl-adapters`, and a `Supervisor` runs both
//! as restartable long-lived tasks (§4.9-§4.11).

pub mod backend_registry;
pub mod env;
pub mod error;
mod frame_match;
pub mod scheduler;
pub mod supervisor;
pub mod turn_detector;
mod util;
pub mod watcher;

pub use backend_registry::{BackendRegistry, Route, RoutingError};
pub use error::{SchedulerError, SupervisorError};
pub use scheduler::Scheduler;
pub use supervisor::Supervisor;
pub use turn_detector::{Classification, TurnDetector, TurnFile};
pub use watcher::Watcher;
