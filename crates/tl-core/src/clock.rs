// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Time abstraction so stability timeouts, lock staleness, token resets, and
//! session TTLs can be tested without sleeping.

use parking_lot::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds-since-epoch, used throughout the kernel for timestamps persisted
/// to disk (ISO8601 strings are formatted from this at the storage boundary).
pub type UnixSeconds = i64;

/// Abstracts over wall-clock time.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Current time, in seconds since the Unix epoch.
    fn now(&self) -> UnixSeconds;
}

/// Real wall-clock time via [`SystemTime::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixSeconds {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// A clock that only advances when told to, for deterministic tests of
/// stability timeouts, lock staleness, and TTL expiry.
#[derive(Debug, Clone)]
pub struct FakeClock {
    now: std::sync::Arc<Mutex<UnixSeconds>>,
}

impl FakeClock {
    pub fn new(start: UnixSeconds) -> Self {
        Self {
            now: std::sync::Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by.as_secs() as i64;
    }

    pub fn set(&self, at: UnixSeconds) {
        *self.now.lock() = at;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> UnixSeconds {
        *self.now.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
