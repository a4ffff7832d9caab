// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! Configuration and startup errors for the daemon binary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a home directory to default {key} from")]
    NoHomeDir { key: &'static str },
    #[error("{key}={value:?} is not a valid unsigned integer")]
    InvalidInt { key: String, value: String },
    #[error("{key}={value:?} is not a valid complexity (1..=3)")]
    InvalidComplexity { key: String, value: String },
    #[error("backend {name:?} has LLM_{name}_TYPE={value:?}, expected \"api\" or \"local\"")]
    InvalidBackendKind { name: String, value: String },
    #[error("backend {name:?} is missing LLM_{name}_{field}")]
    MissingBackendField { name: String, field: &'static str },
    #[error("failed to create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Supervisor(#[from] tl_engine::SupervisorError),
    #[error("failed to install signal handler: {0}")]
    Signal(#[from] std::io::Error),
}
