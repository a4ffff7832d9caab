// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Structured logging setup: a non-blocking rolling file appender into
//! `<state>/logs/daemon.log`, filtered by `RUST_LOG` (default `info`),
//! grounded in the teacher daemon's own `setup_logging`.

use crate::config::Config;
use crate::error::ConfigError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Must be kept alive for the lifetime of the process — dropping it stops
/// the background flush thread and silently truncates buffered log lines.
pub fn init(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, ConfigError> {
    let log_path = config.daemon_log_path();
    let dir = log_path.parent().expect("daemon_log_path always has a parent");
    std::fs::create_dir_all(dir).map_err(|source| ConfigError::LogDir { path: dir.to_path_buf(), source })?;

    let file_name = log_path.file_name().expect("daemon_log_path always has a file name");
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
