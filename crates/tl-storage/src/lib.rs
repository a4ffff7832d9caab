// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tl-storage: every filesystem-durable artifact the kernel depends on.
//!
//! Everything here is built on [`atomic::write_atomic`] (write-tempfile,
//! fsync, rename) or on `fs2` advisory locking. No component in this crate
//! keeps in-memory state across calls beyond what's needed for a single
//! operation — durability and cross-process visibility come from the
//! filesystem, per the Non-goal that rules out a persisted transactional
//! store.

pub mod atomic;
pub mod audit;
pub mod continuation;
pub mod failure;
pub mod layout;
pub mod lock_registry;
pub mod pid;
pub mod queue;
pub mod session;
pub mod token_state;

pub use atomic::{write_atomic, AtomicWriteError};
pub use audit::{AuditJournal, AuditJournalError};
pub use continuation::{ContinuationStore, ContinuationStoreError};
pub use failure::{FailureSentinelStore, FailureSentinelError};
pub use layout::StateLayout;
pub use lock_registry::{LockError, LockRegistry, LockStatus};
pub use queue::{EventQueue, QueueError};
pub use session::{SessionError, SessionStore};
pub use token_state::{TokenState, TokenStateError};
