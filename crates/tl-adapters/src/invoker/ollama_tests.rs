// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

use super::*;
use std::os::unix::fs::PermissionsExt;
use tempfile::tempdir;
use tl_core::{BackendKind, TaskName};

fn script(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("ollama-fake");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn request(task_dir: &std::path::Path, stderr_log: &std::path::Path, complexity: Complexity) -> InvokeRequest {
    std::fs::write(task_dir.join("001_demo.md"), "<User>\nhello\n<User>\n").unwrap();
    InvokeRequest {
        task: TaskName::new("demo"),
        task_dir: task_dir.to_path_buf(),
        input_file: "001_demo.md".to_string(),
        output_file: "001_demo_response.md".to_string(),
        resume_session: None,
        max_turns: 5,
        complexity,
        stderr_log_path: stderr_log.to_path_buf(),
    }
}

const DISPATCH_SCRIPT: &str = r#"
case "$1" in
  list) exit 0 ;;
  run) cat > /dev/null; echo "local response"; exit 0 ;;
  *) exit 1 ;;
esac
"#;

#[tokio::test]
async fn successful_invocation_writes_framed_output_with_no_session() {
    let scripts = tempdir().unwrap();
    let bin = script(scripts.path(), DISPATCH_SCRIPT);
    let task_dir = tempdir().unwrap();
    let logs_dir = tempdir().unwrap();

    let backend = Backend::new("ollama", BackendKind::Local, bin.display().to_string());
    let invoker = OllamaInvoker::new(backend);

    let req = request(task_dir.path(), &logs_dir.path().join("demo.log"), Complexity::LOCAL_ONLY);
    let outcome = invoker.invoke(req, tokio::sync::oneshot::channel().0).await.unwrap();

    assert!(outcome.succeeded());
    assert_eq!(outcome.session_id, None);
    let output = std::fs::read_to_string(task_dir.path().join("001_demo_response.md")).unwrap();
    assert!(output.contains("local response"));
}

#[tokio::test]
async fn unreachable_daemon_yields_backend_unreachable_with_no_output() {
    let scripts = tempdir().unwrap();
    let bin = script(scripts.path(), "case \"$1\" in list) exit 1 ;; *) exit 1 ;; esac");
    let task_dir = tempdir().unwrap();
    let logs_dir = tempdir().unwrap();

    let backend = Backend::new("ollama", BackendKind::Local, bin.display().to_string());
    let invoker = OllamaInvoker::new(backend);

    let req = request(task_dir.path(), &logs_dir.path().join("demo.log"), Complexity::LOCAL_ONLY);
    let outcome = invoker.invoke(req, tokio::sync::oneshot::channel().0).await.unwrap();

    assert_eq!(outcome.exit, InvokeExit::BackendUnreachable);
    assert!(!task_dir.path().join("001_demo_response.md").exists());
}

#[test]
fn system_prompt_differs_between_complexity_one_and_two() {
    assert_eq!(system_prompt_for(Complexity::LOCAL_ONLY), TERSE_SYSTEM_PROMPT);
    assert_eq!(system_prompt_for(Complexity::EITHER), ELABORATED_SYSTEM_PROMPT);
}

#[tokio::test]
async fn rejects_path_traversal_in_output_file() {
    let scripts = tempdir().unwrap();
    let bin = script(scripts.path(), DISPATCH_SCRIPT);
    let task_dir = tempdir().unwrap();
    let logs_dir = tempdir().unwrap();

    let backend = Backend::new("ollama", BackendKind::Local, bin.display().to_string());
    let invoker = OllamaInvoker::new(backend);

    let mut req = request(task_dir.path(), &logs_dir.path().join("demo.log"), Complexity::LOCAL_ONLY);
    req.output_file = "../escape.md".to_string();
    let result = invoker.invoke(req, tokio::sync::oneshot::channel().0).await;
    assert!(matches!(result, Err(InvokerError::PathTraversal(_))));
}
