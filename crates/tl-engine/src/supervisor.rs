// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Starts the Watcher and Scheduler as supervised long-lived tasks,
//! restarting either on an unexpected exit (a panic, since neither task's
//! own `run` loop otherwise returns before `shutdown` fires) unless it has
//! crashed `max_restarts` times within `restart_window`, per §4.11. In this
//! collapsed single-process design (§9) "child" means a tokio task, not an
//! OS process.

use crate::error::SupervisorError;
use crate::scheduler::Scheduler;
use crate::watcher::Watcher;
use std::collections::VecDeque;
use std::time::Duration;
use tl_adapters::{NotifyAdapter, NotifyOptions};
use tl_core::Clock;
use tl_storage::{AuditJournal, LockRegistry, StateLayout};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Tracks a task's recent crash timestamps to decide whether another
/// restart is still within budget.
struct RestartBudget {
    crashes: VecDeque<i64>,
    max: u32,
    window_secs: i64,
}

impl RestartBudget {
    fn new(max: u32, window: Duration) -> Self {
        Self {
            crashes: VecDeque::new(),
            max,
            window_secs: window.as_secs() as i64,
        }
    }

    /// Record a crash at `now` and report whether a restart is still
    /// allowed (`false` once `max` crashes have landed inside the window).
    fn record_and_check(&mut self, now: i64) -> bool {
        while let Some(&oldest) = self.crashes.front() {
            if now - oldest > self.window_secs {
                self.crashes.pop_front();
            } else {
                break;
            }
        }
        if self.crashes.len() as u32 >= self.max {
            return false;
        }
        self.crashes.push_back(now);
        true
    }
}

pub struct Supervisor<C: Clock, N: NotifyAdapter> {
    layout: StateLayout,
    locks: LockRegistry,
    audit: AuditJournal,
    watcher: Watcher<C>,
    scheduler: Scheduler<C, N>,
    notify: N,
    clock: C,
    monitor_interval: Duration,
    max_restarts: u32,
    restart_window: Duration,
    shutdown_timeout: Duration,
}

impl<C: Clock, N: NotifyAdapter> Supervisor<C, N> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        layout: StateLayout,
        watcher: Watcher<C>,
        scheduler: Scheduler<C, N>,
        notify: N,
        clock: C,
        monitor_interval: Duration,
        max_restarts: u32,
        restart_window: Duration,
        shutdown_timeout: Duration,
    ) -> Self {
        let locks = LockRegistry::new(layout.clone());
        let audit = AuditJournal::new(layout.clone());
        Self {
            layout,
            locks,
            audit,
            watcher,
            scheduler,
            notify,
            clock,
            monitor_interval,
            max_restarts,
            restart_window,
            shutdown_timeout,
        }
    }

    fn create_required_dirs(&self) -> Result<(), SupervisorError> {
        for dir in self.layout.required_dirs() {
            std::fs::create_dir_all(&dir)
                .map_err(|source| SupervisorError::StateDir { path: dir, source })?;
        }
        Ok(())
    }

    /// §4.7/§8: tasks whose journal has a `START` with no matching `END` are
    /// an operator signal surfaced on startup, not a recovery trigger.
    fn report_incomplete_invocations(&self) {
        match self.audit.check_incomplete() {
            Ok(incomplete) if incomplete.is_empty() => {}
            Ok(incomplete) => {
                warn!(tasks = ?incomplete, "found incomplete invocations from a prior run");
            }
            Err(e) => warn!(error = %e, "failed to check journal for incomplete invocations"),
        }
    }

    /// Run until `shutdown` fires, then gracefully wind down both children.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) -> Result<(), SupervisorError> {
        self.create_required_dirs()?;
        self.report_incomplete_invocations();

        let (mut watcher_tx, watcher_rx) = oneshot::channel();
        let mut watcher_handle = tokio::spawn(self.watcher.clone().run(watcher_rx));
        let mut watcher_budget = RestartBudget::new(self.max_restarts, self.restart_window);
        let mut watcher_down = false;

        let (mut scheduler_tx, scheduler_rx) = oneshot::channel();
        let mut scheduler_handle = tokio::spawn(self.scheduler.clone().run(scheduler_rx));
        let mut scheduler_budget = RestartBudget::new(self.max_restarts, self.restart_window);
        let mut scheduler_down = false;

        let mut monitor = tokio::time::interval(self.monitor_interval);
        monitor.tick().await;

        loop {
            tokio::select! {
                res = &mut watcher_handle, if !watcher_down => {
                    warn!(?res, "watcher task exited unexpectedly");
                    if self.restart_allowed(&mut watcher_budget).await {
                        let (tx, rx) = oneshot::channel();
                        watcher_tx = tx;
                        watcher_handle = tokio::spawn(self.watcher.clone().run(rx));
                        info!("watcher restarted");
                    } else {
                        watcher_down = true;
                        self.notify_exhausted("watcher").await;
                    }
                }

                res = &mut scheduler_handle, if !scheduler_down => {
                    warn!(?res, "scheduler task exited unexpectedly");
                    if self.restart_allowed(&mut scheduler_budget).await {
                        let (tx, rx) = oneshot::channel();
                        scheduler_tx = tx;
                        scheduler_handle = tokio::spawn(self.scheduler.clone().run(rx));
                        info!("scheduler restarted");
                    } else {
                        scheduler_down = true;
                        self.notify_exhausted("scheduler").await;
                    }
                }

                _ = monitor.tick() => {}

                _ = &mut shutdown => {
                    info!("supervisor shutdown requested");
                    break;
                }
            }
        }

        let _ = watcher_tx.send(());
        let _ = scheduler_tx.send(());
        self.wait_or_abort(watcher_handle, scheduler_handle).await;

        if let Ok(reaped) = self.locks.reap_stale() {
            if reaped > 0 {
                info!(reaped, "swept stale locks on shutdown");
            }
        }

        Ok(())
    }

    async fn restart_allowed(&self, budget: &mut RestartBudget) -> bool {
        budget.record_and_check(self.clock.now())
    }

    async fn notify_exhausted(&self, which: &str) {
        let message = format!("{which} crashed {} times within the restart window and was left down", self.max_restarts);
        if let Err(e) = self.notify.notify("Supervisor", &message, NotifyOptions::high_priority()).await {
            warn!(error = %e, "failed to deliver restart-exhaustion notification");
        }
    }

    async fn wait_or_abort(&self, mut watcher_handle: JoinHandle<()>, mut scheduler_handle: JoinHandle<()>) {
        let deadline = tokio::time::sleep(self.shutdown_timeout);
        tokio::pin!(deadline);
        let mut watcher_done = false;
        let mut scheduler_done = false;
        loop {
            if watcher_done && scheduler_done {
                break;
            }
            tokio::select! {
                res = &mut watcher_handle, if !watcher_done => {
                    let _ = res;
                    watcher_done = true;
                }
                res = &mut scheduler_handle, if !scheduler_done => {
                    let _ = res;
                    scheduler_done = true;
                }
                _ = &mut deadline => {
                    warn!("children did not exit within the shutdown timeout, aborting");
                    if !watcher_done {
                        watcher_handle.abort();
                    }
                    if !scheduler_done {
                        scheduler_handle.abort();
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
