// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;
use crate::backend_registry::BackendRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tl_adapters::{FakeInvoker, FakeNotifyAdapter, Invoker};
use tl_core::{Backend, BackendKind, BackendTable, FakeClock};
use tl_storage::{EventQueue, TokenState};

#[test]
fn restart_budget_allows_up_to_max_within_the_window() {
    let mut budget = RestartBudget::new(3, Duration::from_secs(300));
    assert!(budget.record_and_check(1_000));
    assert!(budget.record_and_check(1_010));
    assert!(budget.record_and_check(1_020));
    assert!(!budget.record_and_check(1_030));
}

#[test]
fn restart_budget_forgets_crashes_outside_the_window() {
    let mut budget = RestartBudget::new(1, Duration::from_secs(300));
    assert!(budget.record_and_check(1_000));
    assert!(!budget.record_and_check(1_100));
    assert!(budget.record_and_check(1_400));
}

fn fixture() -> (TempDirs, Supervisor<FakeClock, FakeNotifyAdapter>) {
    let vault = tempdir().expect("tempdir");
    let state = tempdir().expect("tempdir");
    let layout = StateLayout::new(state.path());

    let clock = FakeClock::new(1_000);
    let queue = EventQueue::new(layout.queue_path(), layout.queue_lock_path());
    let watcher = Watcher::new(vault.path(), queue.clone(), clock.clone(), 300, Duration::from_secs(30), Duration::from_secs(1));

    let table = BackendTable::new([
        Backend::new("claude", BackendKind::Api, "claude"),
        Backend::new("ollama", BackendKind::Local, "ollama"),
    ]);
    let locks = LockRegistry::new(layout.clone());
    let tokens = TokenState::new(layout.token_state_path());
    let registry = BackendRegistry::new(table, locks, tokens);

    let mut invokers: HashMap<String, Arc<dyn Invoker>> = HashMap::new();
    invokers.insert("ollama".to_string(), Arc::new(FakeInvoker::new()));
    invokers.insert("claude".to_string(), Arc::new(FakeInvoker::new()));

    let notify = FakeNotifyAdapter::new();
    let scheduler = Scheduler::new(
        layout.clone(),
        vault.path(),
        queue,
        registry,
        invokers,
        notify.clone(),
        clock.clone(),
        Duration::from_millis(50),
        300,
        5,
        false,
    );

    let supervisor = Supervisor::new(
        layout,
        watcher,
        scheduler,
        notify,
        clock,
        Duration::from_millis(20),
        5,
        Duration::from_secs(300),
        Duration::from_millis(200),
    );

    (TempDirs { _vault: vault, _state: state }, supervisor)
}

struct TempDirs {
    _vault: TempDir,
    _state: TempDir,
}

#[tokio::test]
async fn creates_required_directories_and_shuts_down_cleanly() {
    let (dirs, supervisor) = fixture();
    let layout = supervisor.layout.clone();
    let (tx, rx) = oneshot::channel();

    let handle = tokio::spawn(supervisor.run(rx));
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(()).expect("send shutdown");
    let result = handle.await.expect("join supervisor");

    assert!(result.is_ok());
    for dir in layout.required_dirs() {
        assert!(dir.is_dir(), "expected {dir:?} to exist");
    }
    drop(dirs);
}
