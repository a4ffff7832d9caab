//! Test helpers for turnloopd's behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

pub const SPEC_POLL_INTERVAL_MS: u64 = 20;
pub const SPEC_WAIT_MAX_MS: u64 = 5000;

/// Resolves the path to the `turnloopd` binary, checking the llvm-cov
/// target directory first (so coverage runs and plain debug builds both
/// find it), falling back to resolving relative to the test binary
/// itself when `CARGO_MANIFEST_DIR` is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

pub fn turnloopd_binary() -> PathBuf {
    binary_path("turnloopd")
}

/// A temporary vault + state directory pair with a fluent helper for
/// writing turn files and spawning/killing `turnloopd` against them.
pub struct Project {
    vault: tempfile::TempDir,
    state: tempfile::TempDir,
    extra_envs: Vec<(String, String)>,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            vault: tempfile::tempdir().unwrap(),
            state: tempfile::tempdir().unwrap(),
            extra_envs: Vec::new(),
        }
    }

    pub fn vault_path(&self) -> &Path {
        self.vault.path()
    }

    pub fn state_path(&self) -> &Path {
        self.state.path()
    }

    /// Register a fake backend for the duration of this project. The
    /// command never actually has to run when `DRY_RUN` is set, since the
    /// scheduler releases the lock before spawning anything.
    pub fn with_backend(mut self, name: &str, kind: &str, command: &str) -> Self {
        let upper = name.to_uppercase();
        self.extra_envs.push((format!("LLM_{upper}_TYPE"), kind.to_string()));
        self.extra_envs.push((format!("LLM_{upper}_COMMAND"), command.to_string()));
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.extra_envs.push(("DRY_RUN".to_string(), "1".to_string()));
        self
    }

    /// Write a task turn file at `<vault>/<task>/<file>`.
    pub fn turn_file(&self, task: &str, file: &str, content: &str) {
        let dir = self.vault.path().join(task);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), content).unwrap();
    }

    pub fn read_turn_file(&self, task: &str, file: &str) -> Option<String> {
        std::fs::read_to_string(self.vault.path().join(task).join(file)).ok()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(turnloopd_binary());
        cmd.env("VAULT_TASKS_DIR", self.vault.path());
        cmd.env("STATE_DIR", self.state.path());
        cmd.env("RUST_LOG", "debug");
        cmd.env("POLL_INTERVAL", "1");
        cmd.env("SCHEDULER_CYCLE", "1");
        cmd.env("INOTIFY_SETTLE_DELAY", "0");
        for (key, value) in &self.extra_envs {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run `turnloopd <args>` to completion (used for `--help`/`--version`,
    /// which exit immediately without starting the supervisor).
    pub fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().unwrap()
    }

    /// Spawn `turnloopd` as a background process.
    pub fn spawn(&self) -> DaemonHandle {
        let child = self
            .command()
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        DaemonHandle { child }
    }

    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.state.path().join("logs").join("daemon.log"))
            .unwrap_or_else(|_| "(no daemon log)".to_string())
    }
}

pub struct DaemonHandle {
    child: Child,
}

impl DaemonHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn terminate(&mut self) {
        let pid = nix::unistd::Pid::from_raw(self.child.id() as i32);
        let _ = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM);
    }

    /// Wait for the process to exit, up to `timeout`. Returns `true` if it
    /// exited on its own.
    pub fn wait_exit(&mut self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            if let Ok(Some(_)) = self.child.try_wait() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(SPEC_POLL_INTERVAL_MS));
        }
        false
    }
}

impl Drop for DaemonHandle {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Poll `condition` until it returns true or `timeout_ms` elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(SPEC_POLL_INTERVAL_MS));
    }
    false
}
