// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Vault directory watcher: notify-driven with a polling fallback,
//! translating turn files into queued `file_ready`/`stop_signal` events
//! (§4.9).

use crate::turn_detector::{Classification, TurnDetector, TurnFile};
use crate::util::format_timestamp;
use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tl_core::{validate_task_name, Clock, QueueEventKind, TaskName};
use tl_storage::EventQueue;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

const STATUS_FILENAME: &str = "_status.md";

/// Scans the vault for turn files ready to drive the next invocation,
/// pushing the event each implies onto the shared [`EventQueue`]. Cheap to
/// clone, so the Supervisor can restart a crashed watcher task from a fresh
/// clone of the original.
#[derive(Clone)]
pub struct Watcher<C: Clock> {
    vault_root: PathBuf,
    queue: EventQueue,
    detector: TurnDetector<C>,
    clock: C,
    poll_interval: Duration,
    settle_delay: Duration,
}

impl<C: Clock> Watcher<C> {
    pub fn new(
        vault_root: impl Into<PathBuf>,
        queue: EventQueue,
        clock: C,
        stability_timeout_secs: i64,
        poll_interval: Duration,
        settle_delay: Duration,
    ) -> Self {
        let detector = TurnDetector::new(clock.clone(), stability_timeout_secs);
        Self {
            vault_root: vault_root.into(),
            queue,
            detector,
            clock,
            poll_interval,
            settle_delay,
        }
    }

    /// Run until `shutdown` fires. A raw filesystem event triggers a
    /// debounced rescan; `poll_interval` is a fallback for sync tools or
    /// network filesystems that don't surface reliable notify events.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let (raw_tx, mut raw_rx) = mpsc::channel::<()>(64);
        let _watcher_guard = match create_fs_watcher(&self.vault_root, raw_tx) {
            Ok(w) => Some(w),
            Err(e) => {
                warn!(error = %e, "filesystem watcher unavailable, falling back to polling only");
                None
            }
        };

        self.scan_once();

        let mut poll = tokio::time::interval(self.poll_interval);
        poll.tick().await; // the first tick fires immediately; consume it

        loop {
            tokio::select! {
                Some(()) = raw_rx.recv() => {
                    tokio::time::sleep(self.settle_delay).await;
                    while raw_rx.try_recv().is_ok() {}
                    self.scan_once();
                }

                _ = poll.tick() => {
                    self.scan_once();
                }

                _ = &mut shutdown => {
                    debug!("watcher shutdown requested");
                    break;
                }
            }
        }
    }

    /// One full pass over the vault: list task directories, classify each
    /// one's latest turn file, and queue the event it implies.
    fn scan_once(&mut self) {
        let entries = match std::fs::read_dir(&self.vault_root) {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, vault = %self.vault_root.display(), "failed to read vault root");
                return;
            }
        };

        for entry in entries {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue; // skip rule: files directly under the vault root
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with('.') {
                continue; // skip rule: hidden directories
            }
            if validate_task_name(name).is_err() {
                continue;
            }
            self.scan_task(entry.path(), TaskName::new(name));
        }
    }

    fn scan_task(&self, task_dir: PathBuf, task: TaskName) {
        let filename = match self.detector.latest_file(&task_dir) {
            Ok(Some(f)) => f,
            Ok(None) => return,
            Err(e) => {
                warn!(%task, error = %e, "failed to list task directory");
                return;
            }
        };
        if filename == STATUS_FILENAME {
            return; // skip rule
        }

        let file = match TurnFile::read(&task_dir, &filename) {
            Ok(f) => f,
            Err(e) => {
                warn!(%task, file = %filename, error = %e, "failed to read turn file");
                return;
            }
        };

        if self.detector.detect_stop(&file) {
            self.enqueue(QueueEventKind::StopSignal, &task, &filename, "");
            return;
        }

        match self.detector.classify(&file) {
            Classification::Backend => {}
            Classification::User | Classification::Edited => {
                if self.detector.is_ready(&file) {
                    self.enqueue(QueueEventKind::FileReady, &task, &filename, "");
                }
            }
        }
    }

    fn enqueue(&self, kind: QueueEventKind, task: &TaskName, file: &str, metadata: &str) {
        let timestamp = format_timestamp(self.clock.now());
        if let Err(e) = self.queue.write(&timestamp, kind, task, file, metadata) {
            warn!(%task, file, ?kind, error = %e, "failed to queue event");
        } else {
            debug!(%task, file, ?kind, "queued event");
        }
    }
}

fn create_fs_watcher(
    vault_root: &Path,
    tx: mpsc::Sender<()>,
) -> Result<RecommendedWatcher, notify::Error> {
    let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
        if let Ok(event) = res {
            if event.paths.iter().any(|p| p.extension().is_some_and(|x| x == "md")) {
                let _ = tx.blocking_send(());
            }
        }
    })?;
    watcher.watch(vault_root, RecursiveMode::Recursive)?;
    Ok(watcher)
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
