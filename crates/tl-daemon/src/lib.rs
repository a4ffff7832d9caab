// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tl-daemon: the `turnloopd` binary. Loads [`Config`] from the process
//! environment, installs structured logging, wires the concrete adapters
//! (`ClaudeInvoker`/`OllamaInvoker`/`DesktopNotifyAdapter`) into a
//! [`tl_engine::Supervisor`], and runs it until a termination signal
//! arrives.

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{ConfigError, DaemonError};

use std::collections::HashMap;
use std::sync::Arc;
use tl_adapters::{ClaudeInvoker, DesktopNotifyAdapter, Invoker, OllamaInvoker};
use tl_core::{BackendKind, SystemClock};
use tl_engine::{BackendRegistry, Scheduler, Supervisor, Watcher};
use tl_storage::{LockRegistry, StateLayout, TokenState};
use tokio::sync::oneshot;
use tracing::info;

/// Build every component the supervisor owns from a resolved [`Config`].
/// Split out from `run` so tests can construct the kernel without also
/// running it forever.
pub fn build_supervisor(config: &Config) -> Supervisor<SystemClock, DesktopNotifyAdapter> {
    let layout = StateLayout::new(config.state_root.clone());
    let clock = SystemClock;
    let notify = DesktopNotifyAdapter::new();

    let queue = tl_storage::EventQueue::new(layout.queue_path(), layout.queue_lock_path());
    let locks = LockRegistry::new(layout.clone());
    let tokens = TokenState::new(layout.token_state_path());
    let registry = BackendRegistry::new(config.backends.clone(), locks, tokens);

    let mut invokers: HashMap<String, Arc<dyn Invoker>> = HashMap::new();
    for backend in config.backends.list() {
        let invoker: Arc<dyn Invoker> = match backend.kind {
            BackendKind::Api => Arc::new(ClaudeInvoker::new(backend.clone(), layout.clone(), clock)),
            BackendKind::Local => Arc::new(OllamaInvoker::new(backend.clone())),
        };
        invokers.insert(backend.name.as_str().to_string(), invoker);
    }

    let watcher = Watcher::new(
        config.vault_root.clone(),
        queue.clone(),
        clock,
        config.stability_timeout.as_secs() as i64,
        config.poll_interval,
        config.inotify_settle_delay,
    );

    let scheduler = Scheduler::new(
        layout.clone(),
        config.vault_root.clone(),
        queue,
        registry,
        invokers,
        notify,
        clock,
        config.scheduler_cycle,
        config.stability_timeout.as_secs() as i64,
        config.default_max_turns,
        config.dry_run,
    );

    Supervisor::new(
        layout,
        watcher,
        scheduler,
        notify,
        clock,
        tl_engine::env::monitor_interval(),
        tl_engine::env::max_restarts(),
        tl_engine::env::restart_window(),
        tl_engine::env::shutdown_timeout(),
    )
}

/// Run the supervisor until `shutdown` fires.
pub async fn run(config: Config, shutdown: oneshot::Receiver<()>) -> Result<(), DaemonError> {
    info!(
        vault = %config.vault_root.display(),
        state = %config.state_root.display(),
        backends = config.backends.len(),
        dry_run = config.dry_run,
        "turnloopd starting"
    );
    build_supervisor(&config).run(shutdown).await?;
    info!("turnloopd stopped");
    Ok(())
}
