// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! turnloopd: background process that watches a vault of task folders and
//! drives LLM backend invocations from their markdown turn files.

use tl_daemon::Config;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::oneshot;
use tracing::{error, info};

fn print_help() {
    println!("turnloopd {}", env!("CARGO_PKG_VERSION"));
    println!("Task orchestration daemon for markdown-driven LLM conversations");
    println!();
    println!("USAGE:");
    println!("    turnloopd");
    println!();
    println!("turnloopd reads its configuration entirely from the environment");
    println!("(VAULT_TASKS_DIR, STATE_DIR, LLM_<NAME>_*, ...) and runs until it");
    println!("receives SIGTERM or SIGINT.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("turnloopd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: turnloopd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    let _log_guard = tl_daemon::logging::init(&config)?;

    info!("turnloopd starting up");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let run = tl_daemon::run(config, shutdown_rx);
    tokio::pin!(run);

    let mut shutdown_tx = Some(shutdown_tx);
    loop {
        tokio::select! {
            result = &mut run => {
                if let Err(e) = result {
                    error!(error = %e, "turnloopd exited with an error");
                    return Err(e.into());
                }
                return Ok(());
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                if let Some(tx) = shutdown_tx.take() {
                    let _ = tx.send(());
                }
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                if let Some(tx) = shutdown_tx.take() {
                    let _ = tx.send(());
                }
            }
        }
    }
}
