// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The dispatch loop: drains the event queue, routes `file_ready` events to
//! a backend and spawns the invoker, handles `stop_signal` preemption, and
//! drives the continuation decision on a max-turn exit (§4.10).

use crate::backend_registry::{resolve_complexity, BackendRegistry, Route};
use crate::error::SchedulerError;
use crate::turn_detector::{Classification, TurnDetector, TurnFile};
use crate::util::{date_only, filesystem_safe_timestamp, format_timestamp, sanitize_for_filename};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tl_adapters::{InvokeExit, InvokeOutcome, InvokeRequest, Invoker, InvokerError, NotifyAdapter, NotifyOptions};
use tl_core::{AuditRecord, BackendName, Clock, Complexity, QueueEvent, QueueEventKind, TaskName};
use tl_storage::{AuditJournal, ContinuationStore, EventQueue, FailureSentinelStore, LockStatus, SessionStore, StateLayout};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

const STOP_TERM_WAIT: Duration = Duration::from_secs(5);
const STOP_KILL_WAIT: Duration = Duration::from_secs(1);
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

struct Inner<N: NotifyAdapter> {
    layout: StateLayout,
    vault_root: PathBuf,
    queue: EventQueue,
    registry: BackendRegistry,
    invokers: HashMap<String, Arc<dyn Invoker>>,
    audit: AuditJournal,
    continuations: ContinuationStore,
    failures: FailureSentinelStore,
    sessions: SessionStore,
    notify: N,
    dry_run: bool,
}

/// The scheduler coordinator. Cheap to clone: every field is an `Arc` or a
/// `Copy` value, so the per-invocation monitor routine (§5: "per-invocation
/// monitor routines run as separate spawned tasks") can hold its own handle
/// without the main loop waiting on it.
#[derive(Clone)]
pub struct Scheduler<C: Clock, N: NotifyAdapter> {
    inner: Arc<Inner<N>>,
    clock: C,
    stability_timeout_secs: i64,
    cycle: Duration,
    default_max_turns: u32,
    retry_queue: Arc<Mutex<Vec<QueueEvent>>>,
    exhaustion_notified: Arc<Mutex<HashSet<String>>>,
}

impl<C: Clock, N: NotifyAdapter> Scheduler<C, N> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        layout: StateLayout,
        vault_root: impl Into<PathBuf>,
        queue: EventQueue,
        registry: BackendRegistry,
        invokers: HashMap<String, Arc<dyn Invoker>>,
        notify: N,
        clock: C,
        cycle: Duration,
        stability_timeout_secs: i64,
        default_max_turns: u32,
        dry_run: bool,
    ) -> Self {
        let audit = AuditJournal::new(layout.clone());
        let continuations = ContinuationStore::new(layout.clone());
        let failures = FailureSentinelStore::new(layout.clone());
        let sessions = SessionStore::new(layout.clone());
        Self {
            inner: Arc::new(Inner {
                layout,
                vault_root: vault_root.into(),
                queue,
                registry,
                invokers,
                audit,
                continuations,
                failures,
                sessions,
                notify,
                dry_run,
            }),
            clock,
            stability_timeout_secs,
            cycle,
            default_max_turns,
            retry_queue: Arc::new(Mutex::new(Vec::new())),
            exhaustion_notified: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// The continuation-decision re-classification only ever calls
    /// `classify`/`detect_stop`, not `is_ready`, so a fresh detector built
    /// per call is as good as a cached one.
    fn detector(&self) -> TurnDetector<C> {
        TurnDetector::new(self.clock.clone(), self.stability_timeout_secs)
    }

    /// Run until `shutdown` fires.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.cycle);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = &mut shutdown => {
                    debug!("scheduler shutdown requested");
                    break;
                }
            }
        }
    }

    async fn run_cycle(&self) {
        self.refresh_exhaustion_notified();

        let events = match self.inner.queue.drain() {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "failed to drain event queue");
                Vec::new()
            }
        };
        for event in events {
            self.dispatch(event).await;
        }

        let retry = std::mem::take(&mut *self.retry_queue.lock());
        for event in retry {
            self.dispatch(event).await;
        }

        if let Err(e) = self.inner.registry.reap_stale_locks() {
            warn!(error = %e, "failed to reap stale locks");
        }
    }

    /// Drop the "already notified" marker for any backend that is no longer
    /// exhausted, so the next exhaustion window gets its own notification.
    fn refresh_exhaustion_notified(&self) {
        let now = self.clock.now();
        let mut notified = self.exhaustion_notified.lock();
        notified.retain(|backend| self.inner.registry.is_exhausted(backend, now).unwrap_or(false));
    }

    async fn dispatch(&self, event: QueueEvent) {
        let result = match event.kind {
            QueueEventKind::FileReady => self.handle_file_ready(event.clone()).await,
            QueueEventKind::StopSignal => self.handle_stop_signal(event.clone()).await,
            other => {
                debug!(kind = ?other, task = %event.task, "dropping unhandled event kind");
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!(task = %event.task, file = %event.file, error = %e, "dispatch failed, dropping event");
        }
    }

    fn push_retry(&self, event: QueueEvent) {
        self.retry_queue.lock().push(event);
    }

    async fn notify_exhaustion_once(&self, backend: &str) -> Result<(), SchedulerError> {
        let mut notified = self.exhaustion_notified.lock();
        if !notified.insert(backend.to_string()) {
            return Ok(());
        }
        drop(notified);
        let reset_at = self.inner.registry.reset_at(backend)?;
        let message = match reset_at {
            Some(at) => format!("{backend} is rate-limited; resets at {}", format_timestamp(at)),
            None => format!("{backend} is rate-limited"),
        };
        self.notify("Backend exhausted", &message, NotifyOptions::high_priority()).await;
        Ok(())
    }

    async fn notify(&self, title: &str, message: &str, options: NotifyOptions) {
        if let Err(e) = self.inner.notify.notify(title, message, options).await {
            warn!(error = %e, "notification delivery failed");
        }
    }

    // -- file_ready -------------------------------------------------------

    async fn handle_file_ready(&self, event: QueueEvent) -> Result<(), SchedulerError> {
        let task = event.task.clone();
        let file = event.file.clone();
        let now = self.clock.now();

        let task_dir = self.inner.vault_root.join(task.as_str());
        let content = match std::fs::read_to_string(task_dir.join(&file)) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(%task, file = %file, "turn file vanished before dispatch, dropping event");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let complexity = resolve_complexity(&content, &task, &self.inner.layout);
        let resume_session = event.continuation_session_id().map(str::to_string);

        let route = self.inner.registry.route(complexity, now)?;
        let backend = match route {
            Route::Queued => {
                if complexity == Complexity::HOSTED_ONLY {
                    self.notify_exhaustion_once("claude").await?;
                }
                self.push_retry(event);
                return Ok(());
            }
            Route::Backend(backend) => backend,
        };

        if matches!(self.inner.registry.lock_check(&backend, &task)?, LockStatus::Live(_)) {
            debug!(%task, file = %file, %backend, "already in flight, dropping duplicate file_ready");
            return Ok(());
        }
        if self.inner.failures.read(&task, &file)?.is_some() {
            debug!(%task, file = %file, "failure sentinel set, dropping file_ready until input changes");
            return Ok(());
        }

        let own_pid = std::process::id() as i32;
        if !self.inner.registry.lock_acquire(&backend, &task, own_pid)? {
            debug!(%task, file = %file, %backend, "lost the race to acquire the lock");
            return Ok(());
        }

        let output_file = response_filename(&file);
        let stderr_log_path = self.inner.layout.backend_log_path(&task, &output_file);

        if self.inner.dry_run {
            info!(%task, file = %file, %backend, %complexity, "dry run: would invoke backend");
            self.inner.registry.lock_release(&backend, &task)?;
            return Ok(());
        }

        let Some(invoker) = self.inner.invokers.get(&backend).cloned() else {
            self.inner.registry.lock_release(&backend, &task)?;
            return Err(SchedulerError::UnknownBackend(backend));
        };

        let timestamp = format_timestamp(now);
        self.inner
            .audit
            .journal_start(&timestamp, &task, &file, &backend, own_pid, resume_session.as_deref())?;

        let request = InvokeRequest {
            task: task.clone(),
            task_dir,
            input_file: file.clone(),
            output_file: output_file.clone(),
            resume_session: resume_session.clone(),
            max_turns: self.default_max_turns,
            complexity,
            stderr_log_path,
        };

        let (pid_tx, pid_rx) = oneshot::channel::<i32>();

        let pid_watcher = self.clone();
        let pid_backend = backend.clone();
        let pid_task = task.clone();
        tokio::spawn(async move {
            if let Ok(pid) = pid_rx.await {
                if let Err(e) = pid_watcher.inner.registry.lock_rewrite_pid(&pid_backend, &pid_task, pid) {
                    warn!(task = %pid_task, backend = %pid_backend, error = %e, "failed to rewrite lock to invoker pid");
                }
            }
        });

        let scheduler = self.clone();
        let max_turns = self.default_max_turns;
        tokio::spawn(async move {
            let outcome = invoker.invoke(request, pid_tx).await;
            scheduler
                .finish_invocation(task, file, output_file, backend, resume_session, max_turns, outcome)
                .await;
        });

        Ok(())
    }

    /// Runs in its own task once the invoker returns; never blocks the
    /// scheduler's main loop.
    async fn finish_invocation(
        &self,
        task: TaskName,
        file: String,
        output_file: String,
        backend: String,
        resume_session: Option<String>,
        request_max_turns: u32,
        outcome: Result<InvokeOutcome, InvokerError>,
    ) {
        if let Err(e) = self
            .finish_invocation_inner(&task, &file, &output_file, &backend, resume_session, request_max_turns, outcome)
            .await
        {
            warn!(%task, file = %file, %backend, error = %e, "failed to record invocation outcome");
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish_invocation_inner(
        &self,
        task: &TaskName,
        file: &str,
        output_file: &str,
        backend: &str,
        resume_session: Option<String>,
        request_max_turns: u32,
        outcome: Result<InvokeOutcome, InvokerError>,
    ) -> Result<(), SchedulerError> {
        let now = self.clock.now();
        let timestamp = format_timestamp(now);

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(%task, file, %backend, error = %e, "invoker returned an error");
                self.inner.registry.lock_release(backend, task)?;
                self.inner.failures.record_failure(task, file, -1, &timestamp)?;
                self.notify(
                    "Invocation failed",
                    &format!("{task} on {backend} failed to start: {e}"),
                    NotifyOptions::default(),
                )
                .await;
                return Ok(());
            }
        };

        let pid = outcome.pid.unwrap_or(0);
        self.inner
            .audit
            .journal_end(&timestamp, task, file, backend, pid, outcome.exit.code(), outcome.turns_used)?;

        let record = AuditRecord {
            task: task.clone(),
            file: file.to_string(),
            backend: BackendName::new(backend),
            session_id: outcome.session_id.clone(),
            turns: outcome.turns_used,
            exit_code: Some(outcome.exit.code()),
            interrupted: false,
            timestamp: timestamp.clone(),
            stderr_excerpt: outcome.stderr_excerpt.clone(),
        };
        self.inner.audit.write_record(&record, &filesystem_safe_timestamp(&timestamp))?;

        if let Some(turns) = outcome.turns_used {
            self.inner.audit.update_usage(&date_only(&timestamp), backend, turns, task)?;
        }
        if let Some(session_id) = &outcome.session_id {
            self.inner.sessions.write(task, session_id, now)?;
        }

        self.inner.registry.lock_release(backend, task)?;

        match outcome.exit {
            InvokeExit::Success => {
                self.inner.failures.clear(task, file)?;
                if outcome.hit_max_turns(request_max_turns) {
                    self.handle_continuation_decision(task, output_file, outcome.session_id.as_deref(), now)
                        .await?;
                } else {
                    self.inner.continuations.clear(task)?;
                }
                self.notify(
                    "Turn complete",
                    &format!("{task} produced {output_file} via {backend}"),
                    NotifyOptions::default(),
                )
                .await;
            }
            InvokeExit::RateLimited => {
                if let Some(signal) = outcome.rate_limit {
                    self.inner.registry.mark_exhausted(backend, signal.reset_at(now))?;
                }
                self.push_retry(retry_event(&timestamp, task, file, resume_session.as_deref()));
                self.notify_exhaustion_once(backend).await?;
            }
            InvokeExit::BackendUnreachable => {
                warn!(%task, file, %backend, "backend unreachable, will retry");
                self.push_retry(retry_event(&timestamp, task, file, resume_session.as_deref()));
            }
            InvokeExit::ArgumentError | InvokeExit::Other(_) => {
                self.inner.failures.record_failure(task, file, outcome.exit.code(), &timestamp)?;
                self.notify(
                    "Invocation failed",
                    &format!("{task} on {backend} exited {}", outcome.exit.code()),
                    NotifyOptions::default(),
                )
                .await;
            }
        }

        Ok(())
    }

    /// §4.10 point 7: re-classify the response file once an invocation hits
    /// its turn ceiling, and decide whether to auto-resume.
    async fn handle_continuation_decision(
        &self,
        task: &TaskName,
        output_file: &str,
        session_id: Option<&str>,
        now: i64,
    ) -> Result<(), SchedulerError> {
        let task_dir = self.inner.vault_root.join(task.as_str());
        let file = match TurnFile::read(&task_dir, output_file) {
            Ok(f) => f,
            Err(e) => {
                warn!(%task, file = %output_file, error = %e, "could not re-read response file for continuation decision");
                self.inner.continuations.clear(task)?;
                return Ok(());
            }
        };

        let timestamp = format_timestamp(now);

        let detector = self.detector();
        if detector.classify(&file) == Classification::Edited {
            self.inner.continuations.clear(task)?;
            self.inner.queue.write(
                &timestamp,
                QueueEventKind::FileReady,
                task,
                output_file,
                "",
            )?;
            return Ok(());
        }

        if detector.detect_stop(&file) {
            self.inner.continuations.clear(task)?;
            return Ok(());
        }

        let Some(session_id) = session_id else {
            self.inner.continuations.clear(task)?;
            return Ok(());
        };

        // `mark` increments the count from whatever it already was (zero if
        // this is the first continuation), so `should_continue` must be
        // checked against the record `mark` just wrote. Checking after the
        // increment means the 5th `mark` (count reaches 5) already fails
        // `should_continue`, so only 4 auto-resumes actually fire before the
        // cap stops them — this matches scenario-3's `count:1` after the
        // first continuation and is kept as-is rather than reordered.
        self.inner
            .continuations
            .mark(task, session_id, self.default_max_turns, self.default_max_turns, output_file, &timestamp)?;

        if self.inner.continuations.should_continue(task)? {
            self.inner.queue.write(
                &timestamp,
                QueueEventKind::FileReady,
                task,
                output_file,
                &format!("continuation:{session_id}"),
            )?;
        } else {
            info!(%task, "continuation limit reached, stopping auto-resume");
            self.inner.continuations.clear(task)?;
        }

        Ok(())
    }

    // -- stop_signal --------------------------------------------------------

    async fn handle_stop_signal(&self, event: QueueEvent) -> Result<(), SchedulerError> {
        let task = event.task.clone();
        let now = self.clock.now();

        let Some(backend) = self.inner.registry.backend_holding_lock(&task)? else {
            debug!(%task, "stop_signal for a task with no live invocation");
            return Ok(());
        };
        let Some(pid) = self.inner.registry.lock_pid_of(&backend, &task)? else {
            return Ok(());
        };

        self.terminate(pid).await;

        let safe_task = sanitize_for_filename(task.as_str());
        let safe_file = sanitize_for_filename(&event.file);
        let ts = filesystem_safe_timestamp(&format_timestamp(now));
        let src = self.inner.vault_root.join(task.as_str()).join(&event.file);
        let dst = self.inner.layout.partial_path(&safe_task, &safe_file, &ts);
        if let Err(e) = std::fs::copy(&src, &dst) {
            warn!(%task, file = %event.file, error = %e, "failed to rescue partial response");
        }

        self.inner.sessions.invalidate(&task, now)?;

        let timestamp = format_timestamp(now);
        let record = AuditRecord {
            task: task.clone(),
            file: event.file.clone(),
            backend: BackendName::new(backend.clone()),
            session_id: None,
            turns: None,
            exit_code: Some(130),
            interrupted: true,
            timestamp: timestamp.clone(),
            stderr_excerpt: None,
        };
        self.inner.audit.write_record(&record, &filesystem_safe_timestamp(&timestamp))?;

        self.inner.registry.lock_release(&backend, &task)?;
        self.notify(
            "Task stopped",
            &format!("{task} was stopped and its session invalidated"),
            NotifyOptions::high_priority(),
        )
        .await;

        Ok(())
    }

    /// Graceful-terminate `pid`, escalating to a force-kill if it survives
    /// `STOP_TERM_WAIT` (§4.10 point 2).
    async fn terminate(&self, pid: i32) {
        let target = Pid::from_raw(pid);
        if kill(target, Signal::SIGTERM).is_err() {
            return; // already gone
        }
        if Self::wait_until_dead(pid, STOP_TERM_WAIT).await {
            return;
        }
        let _ = kill(target, Signal::SIGKILL);
        if !Self::wait_until_dead(pid, STOP_KILL_WAIT).await {
            warn!(pid, "process survived SIGKILL");
        }
    }

    async fn wait_until_dead(pid: i32, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if !tl_storage::pid::is_pid_alive(pid) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(STOP_POLL_INTERVAL).await;
        }
    }
}

/// `<stem>_response.md`, per §6's invocation output naming rule.
fn response_filename(input_file: &str) -> String {
    let stem = input_file.strip_suffix(".md").unwrap_or(input_file);
    format!("{stem}_response.md")
}

/// A `file_ready` retry event, preserving `continuation:<sid>` metadata so a
/// rate-limited or unreachable-backend retry doesn't drop a resume in flight.
fn retry_event(timestamp: &str, task: &TaskName, file: &str, resume_session: Option<&str>) -> QueueEvent {
    let metadata = resume_session.map_or_else(String::new, |sid| format!("continuation:{sid}"));
    QueueEvent::new(timestamp, QueueEventKind::FileReady, task.clone(), file, metadata)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
