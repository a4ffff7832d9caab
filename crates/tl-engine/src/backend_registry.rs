// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Complexity-based routing over the immutable backend table, plus
//! exhaustion checks and slot accounting (§4.4).
//!
//! Hardcodes the two backend names the routing table in §4.4 is written
//! against (`"claude"` for hosted, `"ollama"` for local) — the config layer
//! may admit other backend names into the table for completeness, but only
//! these two participate in complexity routing.

use thiserror::Error;
use tl_core::{BackendTable, Complexity, TaskName};
use tl_storage::{LockRegistry, TokenState};
use tracing::debug;

const HOSTED_BACKEND: &str = "claude";
const LOCAL_BACKEND: &str = "ollama";

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("lock registry error: {0}")]
    Lock(#[from] tl_storage::LockError),
    #[error("token state error: {0}")]
    TokenState(#[from] tl_storage::TokenStateError),
}

/// The outcome of [`BackendRegistry::route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Dispatch to this backend now.
    Backend(String),
    /// No backend is currently available; the caller should retry later.
    Queued,
}

/// Wraps the immutable [`BackendTable`] with the two pieces of runtime
/// state routing depends on: live lock counts (for `slots_available`) and
/// rate-limit exhaustion (for `is_exhausted`).
pub struct BackendRegistry {
    table: BackendTable,
    locks: LockRegistry,
    tokens: TokenState,
}

impl BackendRegistry {
    pub fn new(table: BackendTable, locks: LockRegistry, tokens: TokenState) -> Self {
        Self { table, locks, tokens }
    }

    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.table.list().map(|b| b.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&tl_core::Backend> {
        self.table.get(name)
    }

    /// `max_parallel - LockRegistry.count(name)`, floored at 0. `None` if
    /// `name` isn't in the table.
    pub fn slots_available(&self, name: &str) -> Result<Option<u32>, RoutingError> {
        let Some(backend) = self.table.get(name) else {
            return Ok(None);
        };
        let in_use = self.locks.count(name)?;
        Ok(Some(backend.max_parallel.saturating_sub(in_use)))
    }

    pub fn is_exhausted(&self, name: &str, now: i64) -> Result<bool, RoutingError> {
        Ok(self.tokens.is_exhausted(name, now)?)
    }

    pub fn mark_exhausted(&self, name: &str, reset_at: i64) -> Result<(), RoutingError> {
        Ok(self.tokens.mark_exhausted(name, reset_at)?)
    }

    pub fn clear_exhausted(&self, name: &str) -> Result<(), RoutingError> {
        Ok(self.tokens.clear(name)?)
    }

    pub fn reset_at(&self, name: &str) -> Result<Option<i64>, RoutingError> {
        Ok(self.tokens.reset_at(name)?)
    }

    pub fn lock_check(
        &self,
        backend: &str,
        task: &TaskName,
    ) -> Result<tl_storage::LockStatus, RoutingError> {
        Ok(self.locks.check(backend, task)?)
    }

    pub fn lock_acquire(&self, backend: &str, task: &TaskName, pid: i32) -> Result<bool, RoutingError> {
        Ok(self.locks.acquire(backend, task, pid)?)
    }

    pub fn lock_rewrite_pid(&self, backend: &str, task: &TaskName, pid: i32) -> Result<(), RoutingError> {
        Ok(self.locks.rewrite_pid(backend, task, pid)?)
    }

    pub fn lock_release(&self, backend: &str, task: &TaskName) -> Result<(), RoutingError> {
        Ok(self.locks.release(backend, task)?)
    }

    pub fn lock_pid_of(&self, backend: &str, task: &TaskName) -> Result<Option<i32>, RoutingError> {
        Ok(self.locks.pid_of(backend, task)?)
    }

    /// Which backend, if any, currently holds a live lock on `task` —
    /// used by `stop_signal` handling (§4.10), which must find the
    /// in-flight invocation regardless of which backend it landed on.
    pub fn backend_holding_lock(&self, task: &TaskName) -> Result<Option<String>, RoutingError> {
        for name in self.list().map(str::to_string).collect::<Vec<_>>() {
            if matches!(self.lock_check(&name, task)?, tl_storage::LockStatus::Live(_)) {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    pub fn reap_stale_locks(&self) -> Result<u32, RoutingError> {
        Ok(self.locks.reap_stale()?)
    }

    /// `unavailable` per §4.4: exhausted OR no free slots. A backend absent
    /// from the table is always unavailable.
    fn unavailable(&self, name: &str, now: i64) -> Result<bool, RoutingError> {
        if self.table.get(name).is_none() {
            return Ok(true);
        }
        Ok(self.is_exhausted(name, now)? || self.slots_available(name)?.unwrap_or(0) == 0)
    }

    /// Route a complexity rating to a backend name, per the table in §4.4:
    /// 1 → ollama-only, 3 → claude-only, 2 → ollama preferred with overflow
    /// to claude.
    pub fn route(&self, complexity: Complexity, now: i64) -> Result<Route, RoutingError> {
        let route = if complexity == Complexity::LOCAL_ONLY {
            if self.unavailable(LOCAL_BACKEND, now)? {
                Route::Queued
            } else {
                Route::Backend(LOCAL_BACKEND.to_string())
            }
        } else if complexity == Complexity::HOSTED_ONLY {
            if self.unavailable(HOSTED_BACKEND, now)? {
                Route::Queued
            } else {
                Route::Backend(HOSTED_BACKEND.to_string())
            }
        } else if !self.unavailable(LOCAL_BACKEND, now)? {
            Route::Backend(LOCAL_BACKEND.to_string())
        } else if !self.unavailable(HOSTED_BACKEND, now)? {
            Route::Backend(HOSTED_BACKEND.to_string())
        } else {
            Route::Queued
        };

        debug!(%complexity, ?route, "routed invocation");
        Ok(route)
    }
}

/// Resolve a task's routing complexity from the input file's
/// `<!-- complexity: N -->` comment, falling back to the cached value for
/// the task, then to [`Complexity::DEFAULT`] (§4.4). The resolved value is
/// cached back for next time.
pub fn resolve_complexity(
    content: &str,
    task: &TaskName,
    layout: &tl_storage::StateLayout,
) -> Complexity {
    if let Some(from_file) = parse_complexity_comment(content) {
        let _ = cache_complexity(task, layout, from_file);
        return from_file;
    }
    if let Some(cached) = read_cached_complexity(task, layout) {
        return cached;
    }
    let default = Complexity::DEFAULT;
    let _ = cache_complexity(task, layout, default);
    default
}

fn parse_complexity_comment(content: &str) -> Option<Complexity> {
    use std::sync::OnceLock;
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        regex::Regex::new(r"(?i)<!--\s*complexity:\s*(\d+)\s*-->").expect("static pattern is valid")
    });
    let caps = re.captures(content)?;
    let n: i64 = caps.get(1)?.as_str().parse().ok()?;
    Complexity::from_raw(n)
}

fn read_cached_complexity(task: &TaskName, layout: &tl_storage::StateLayout) -> Option<Complexity> {
    let raw = std::fs::read_to_string(layout.complexity_path(task)).ok()?;
    Complexity::from_raw(raw.trim().parse().ok()?)
}

fn cache_complexity(
    task: &TaskName,
    layout: &tl_storage::StateLayout,
    complexity: Complexity,
) -> std::io::Result<()> {
    tl_storage::write_atomic(&layout.complexity_path(task), complexity.value().to_string().as_bytes())
        .map_err(|e| std::io::Error::other(e.to_string()))
}

#[cfg(test)]
#[path = "backend_registry_tests.rs"]
mod tests;
