// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The hosted, Claude-style CLI invoker (§4.6 points 3-4).

use super::{reject_path_traversal, InvokeExit, InvokeOutcome, InvokeRequest, Invoker, InvokerError};
use crate::parser::{ClaudeStderrParser, StderrParser};
use async_trait::async_trait;
use std::process::Stdio;
use tl_core::{render_frame, strip_frame, Backend, Clock};
use tl_storage::{SessionStore, StateLayout};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

/// Environment variable passed to the child so the backend CLI does not
/// attempt to attach to an already-running session of its own (avoiding
/// nested-session errors when the daemon itself runs under a supervising
/// terminal multiplexer).
const NO_NESTED_SESSION_ENV: &str = "TL_NO_NESTED_SESSION";

pub struct ClaudeInvoker<C: Clock> {
    backend: Backend,
    sessions: SessionStore,
    clock: C,
    parser: ClaudeStderrParser,
}

impl<C: Clock> ClaudeInvoker<C> {
    pub fn new(backend: Backend, layout: StateLayout, clock: C) -> Self {
        let sessions = SessionStore::new(layout);
        Self {
            backend,
            sessions,
            clock,
            parser: ClaudeStderrParser,
        }
    }

    /// §4.6 point 3: reuse a fresh session only when the caller didn't
    /// already pin one.
    fn resolve_session(&self, request: &InvokeRequest) -> Option<String> {
        if let Some(sid) = &request.resume_session {
            return Some(sid.clone());
        }
        self.sessions
            .fresh(&request.task, self.clock.now())
            .ok()
            .flatten()
    }

    fn build_args(&self, prompt: &str, request: &InvokeRequest, session: Option<&str>) -> Vec<String> {
        let mut args = vec!["-p".to_string(), prompt.to_string()];
        args.push("--max-turns".to_string());
        args.push(request.max_turns.to_string());
        if let Some(model) = &self.backend.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args.extend(self.backend.flags.iter().cloned());
        if let Some(sid) = session {
            args.push("--resume".to_string());
            args.push(sid.to_string());
        }
        args
    }
}

#[async_trait]
impl<C: Clock> Invoker for ClaudeInvoker<C> {
    async fn invoke(
        &self,
        request: InvokeRequest,
        pid_tx: tokio::sync::oneshot::Sender<i32>,
    ) -> Result<InvokeOutcome, InvokerError> {
        reject_path_traversal(&request.input_file)?;
        reject_path_traversal(&request.output_file)?;

        let input_path = request.task_dir.join(&request.input_file);
        let raw = tokio::fs::read_to_string(&input_path).await?;
        let prompt = strip_frame(&raw);
        let session = self.resolve_session(&request);

        let args = self.build_args(&prompt, &request, session.as_deref());
        debug!(task = %request.task, backend = %self.backend.name, ?args, "spawning hosted invoker");

        let child = Command::new(&self.backend.command)
            .args(&args)
            .env(NO_NESTED_SESSION_ENV, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(InvokerError::Spawn)?;
        let pid = child.id().map(|id| id as i32);
        if let Some(pid) = pid {
            let _ = pid_tx.send(pid);
        }
        let output = child.wait_with_output().await?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if let Some(parent) = request.stderr_log_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut log = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&request.stderr_log_path)
            .await?;
        log.write_all(stderr.as_bytes()).await?;

        let rate_limit = self.parser.detect_rate_limit(&stderr);
        let (turns_used, max_turns_reported) =
            self.parser.parse_turns(&stderr).map_or((None, None), |(u, m)| (Some(u), m));

        let exit = if rate_limit.is_some() {
            InvokeExit::RateLimited
        } else {
            InvokeExit::from_code(output.status.code().unwrap_or(-1))
        };

        // §4.6 point 8's fallback chain (stderr pattern, then a recently
        // modified file in the backend's project directory, then a fresh
        // UUID) only makes sense to run through once the invocation actually
        // produced a response worth attaching a session to; a failed
        // invocation just reports whatever stderr said, if anything.
        let session_id = if exit == InvokeExit::Success {
            let mut resolved = self.parser.parse_session(&stderr).or(session);
            if resolved.is_none() {
                if let Some(project_dir) = &self.backend.invoker_path {
                    resolved = session_from_project_dir(project_dir).await;
                }
            }
            Some(resolved.unwrap_or_else(|| Uuid::new_v4().to_string()))
        } else {
            self.parser.parse_session(&stderr).or(session)
        };

        if exit == InvokeExit::Success {
            let body = String::from_utf8_lossy(&output.stdout).into_owned();
            let framed = render_frame(&body);
            let output_path = request.task_dir.join(&request.output_file);
            tl_storage::write_atomic(&output_path, framed.as_bytes())
                .map_err(|e| InvokerError::Io(std::io::Error::other(e.to_string())))?;
        } else {
            warn!(task = %request.task, backend = %self.backend.name, exit = exit.code(), "hosted invoker did not succeed");
        }

        let excerpt = stderr_excerpt(&stderr);
        Ok(InvokeOutcome {
            exit,
            pid,
            session_id,
            turns_used,
            max_turns_reported,
            rate_limit,
            stderr_excerpt: excerpt,
        })
    }
}

/// §4.6 point 8's second fallback: the most recently modified file directly
/// under the backend's project directory, by name. `None` if the directory
/// is missing, empty, or unreadable.
async fn session_from_project_dir(project_dir: &str) -> Option<String> {
    let mut entries = tokio::fs::read_dir(project_dir).await.ok()?;
    let mut newest: Option<(std::time::SystemTime, String)> = None;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let Ok(metadata) = entry.metadata().await else { continue };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else { continue };
        let Some(name) = entry.file_name().to_str().map(str::to_string) else { continue };
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, name));
        }
    }
    newest.map(|(_, name)| name)
}

/// The last 2KB of stderr, for the audit record (§6 `stderr_excerpt`). Slices
/// on a UTF-8 char boundary since `stderr` is `String::from_utf8_lossy`'d and
/// may contain multi-byte characters anywhere near the cut point.
fn stderr_excerpt(stderr: &str) -> Option<String> {
    if stderr.is_empty() {
        return None;
    }
    const MAX: usize = 2048;
    if stderr.len() <= MAX {
        return Some(stderr.to_string());
    }
    let min_start = stderr.len() - MAX;
    let start = (min_start..=stderr.len())
        .find(|&i| stderr.is_char_boundary(i))
        .unwrap_or(stderr.len());
    Some(stderr[start..].to_string())
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
