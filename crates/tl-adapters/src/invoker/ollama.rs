// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! The local, Ollama-style daemon invoker (§4.6 point 5).

use super::{reject_path_traversal, InvokeExit, InvokeOutcome, InvokeRequest, Invoker, InvokerError};
use crate::parser::{OllamaStderrParser, StderrParser};
use async_trait::async_trait;
use std::process::Stdio;
use tl_core::{render_frame, strip_frame, Backend, Complexity};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// §9: "two distinct static prompt strings (terse vs. elaborated
/// instructions) selected by the `COMPLEXITY` env var" — complexity 3 never
/// reaches this invoker since it's hosted-only by the routing table.
const TERSE_SYSTEM_PROMPT: &str =
    "Answer directly and concisely. Skip preamble and restating the question.";
const ELABORATED_SYSTEM_PROMPT: &str =
    "Think through the problem step by step before answering, and explain your reasoning.";

fn system_prompt_for(complexity: Complexity) -> &'static str {
    if complexity > Complexity::LOCAL_ONLY {
        ELABORATED_SYSTEM_PROMPT
    } else {
        TERSE_SYSTEM_PROMPT
    }
}

pub struct OllamaInvoker {
    backend: Backend,
    parser: OllamaStderrParser,
}

impl OllamaInvoker {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            parser: OllamaStderrParser,
        }
    }

    /// A cheap reachability probe, bounded by `daemon_probe_timeout_ms`.
    async fn daemon_reachable(&self) -> bool {
        let probe = Command::new(&self.backend.command)
            .arg("list")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match tokio::time::timeout(crate::env::daemon_probe_timeout_ms(), probe).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) => {
                warn!(backend = %self.backend.name, error = %e, "local daemon probe failed to spawn");
                false
            }
            Err(_) => {
                warn!(backend = %self.backend.name, "local daemon probe timed out");
                false
            }
        }
    }
}

#[async_trait]
impl Invoker for OllamaInvoker {
    async fn invoke(
        &self,
        request: InvokeRequest,
        pid_tx: tokio::sync::oneshot::Sender<i32>,
    ) -> Result<InvokeOutcome, InvokerError> {
        reject_path_traversal(&request.input_file)?;
        reject_path_traversal(&request.output_file)?;

        if !self.daemon_reachable().await {
            info!(task = %request.task, backend = %self.backend.name, "local daemon unreachable");
            return Ok(InvokeOutcome {
                exit: InvokeExit::BackendUnreachable,
                pid: None,
                session_id: None,
                turns_used: None,
                max_turns_reported: None,
                rate_limit: None,
                stderr_excerpt: None,
            });
        }

        let input_path = request.task_dir.join(&request.input_file);
        let raw = tokio::fs::read_to_string(&input_path).await?;
        let prompt = strip_frame(&raw);
        let full_prompt = format!("{}\n\n{}", system_prompt_for(request.complexity), prompt);

        let model = self.backend.model.as_deref().unwrap_or("default");
        debug!(task = %request.task, backend = %self.backend.name, model, "spawning local invoker");

        let mut args = vec!["run".to_string(), model.to_string()];
        args.extend(self.backend.flags.iter().cloned());

        let mut child = Command::new(&self.backend.command)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(InvokerError::Spawn)?;
        let pid = child.id().map(|id| id as i32);
        if let Some(pid) = pid {
            let _ = pid_tx.send(pid);
        }

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(full_prompt.as_bytes()).await?;
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

        if exit == InvokeExit::Success {
            let body = String::from_utf8_lossy(&output.stdout).into_owned();
            let framed = render_frame(&body);
            let output_path = request.task_dir.join(&request.output_file);
            tl_storage::write_atomic(&output_path, framed.as_bytes())
                .map_err(|e| InvokerError::Io(std::io::Error::other(e.to_string())))?;
        }

        Ok(InvokeOutcome {
            exit,
            pid,
            session_id: None,
            turns_used,
            max_turns_reported,
            rate_limit,
            stderr_excerpt: (!stderr.is_empty()).then_some(stderr),
        })
    }
}

#[cfg(test)]
#[path = "ollama_tests.rs"]
mod tests;
