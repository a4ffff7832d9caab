// SPDX-License-Identifier: MIT
// Copyright (c) 2026 the turnloop authors

//! `Config::load()` resolves every key in the External Interfaces config
//! table from the process environment, following the same centralized
//! accessor convention as every other crate's `env.rs` — except here the
//! accessors are gathered onto one struct, since the daemon binary is the
//! one place that needs all of them at once to construct the kernel.
//!
//! The timing knobs (`POLL_INTERVAL`, `STABILITY_TIMEOUT`,
//! `INOTIFY_SETTLE_DELAY`, `SCHEDULER_CYCLE`) are resolved here under their
//! spec-literal names first, falling back to `tl_engine::env`'s
//! `TL_*_SECONDS`-prefixed internal tunables (which carry their own
//! hardcoded defaults) when unset — so the exact names in the config table
//! always work, and the engine crate's own overrides still apply for tests
//! that construct a `Watcher`/`Scheduler` directly without going through
//! this loader.

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use tl_core::{Backend, BackendKind, BackendTable, Complexity};

const DEFAULT_STATE_DIRNAME: &str = ".claude-task-system";
const DEFAULT_VAULT_DIRNAME: &str = "claude-tasks";
const DEFAULT_MAX_TURNS: u32 = 10;

fn parse_duration_secs(key: &str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map(Some)
            .map_err(|_| ConfigError::InvalidInt { key: key.to_string(), value: raw }),
        Err(_) => Ok(None),
    }
}

fn parse_u32(key: &str) -> Result<Option<u32>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidInt { key: key.to_string(), value: raw }),
        Err(_) => Ok(None),
    }
}

fn parse_bool_flag(key: &str) -> bool {
    // §6: "if set, do not spawn invokers" — presence is what matters, not
    // the value, matching shell's `[[ -n "$DRY_RUN" ]]` idiom.
    std::env::var(key).is_ok_and(|v| !v.is_empty())
}

fn home_dir(key: &'static str) -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::NoHomeDir { key })
}

/// The daemon's fully resolved configuration (§6 config keys table).
#[derive(Debug, Clone)]
pub struct Config {
    pub vault_root: PathBuf,
    pub state_root: PathBuf,
    pub poll_interval: Duration,
    pub stability_timeout: Duration,
    pub inotify_settle_delay: Duration,
    pub scheduler_cycle: Duration,
    pub default_max_turns: u32,
    pub default_complexity: Complexity,
    pub dry_run: bool,
    pub backends: BackendTable,
}

impl Config {
    /// Resolve the whole config from the process environment. Fatal on any
    /// malformed value (§7 category 4: system error) — the daemon should
    /// not start on a config it can't trust.
    pub fn load() -> Result<Self, ConfigError> {
        let vault_root = match std::env::var("VAULT_TASKS_DIR") {
            Ok(v) => PathBuf::from(v),
            Err(_) => home_dir("VAULT_TASKS_DIR")?.join(DEFAULT_VAULT_DIRNAME),
        };

        let state_root = match std::env::var("STATE_DIR") {
            Ok(v) => PathBuf::from(v),
            Err(_) => home_dir("STATE_DIR")?.join(DEFAULT_STATE_DIRNAME),
        };

        let poll_interval = parse_duration_secs("POLL_INTERVAL")?.unwrap_or_else(tl_engine::env::poll_interval);
        let stability_timeout =
            parse_duration_secs("STABILITY_TIMEOUT")?.unwrap_or_else(tl_engine::env::stability_timeout);
        let inotify_settle_delay =
            parse_duration_secs("INOTIFY_SETTLE_DELAY")?.unwrap_or_else(tl_engine::env::inotify_settle_delay);
        let scheduler_cycle = parse_duration_secs("SCHEDULER_CYCLE")?.unwrap_or_else(tl_engine::env::scheduler_cycle);

        let default_max_turns = parse_u32("DEFAULT_MAX_TURNS")?.unwrap_or(DEFAULT_MAX_TURNS);

        let default_complexity = match std::env::var("DEFAULT_COMPLEXITY") {
            Ok(raw) => {
                let n: i64 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidComplexity { key: "DEFAULT_COMPLEXITY".to_string(), value: raw.clone() })?;
                Complexity::from_raw(n)
                    .ok_or(ConfigError::InvalidComplexity { key: "DEFAULT_COMPLEXITY".to_string(), value: raw })?
            }
            Err(_) => Complexity::DEFAULT,
        };

        let dry_run = parse_bool_flag("DRY_RUN");
        let backends = load_backend_table()?;

        Ok(Self {
            vault_root,
            state_root,
            poll_interval,
            stability_timeout,
            inotify_settle_delay,
            scheduler_cycle,
            default_max_turns,
            default_complexity,
            dry_run,
            backends,
        })
    }

    pub fn daemon_log_path(&self) -> PathBuf {
        self.state_root.join("logs").join("daemon.log")
    }
}

/// Discover `LLM_<NAME>_{TYPE,MAX_PARALLEL,COMMAND,FLAGS,MODEL,ENDPOINT,INVOKER}`
/// variables and group them into [`Backend`] records, one per distinct
/// `<NAME>` (§4.4, §6).
fn load_backend_table() -> Result<BackendTable, ConfigError> {
    #[derive(Default)]
    struct Partial {
        kind: Option<String>,
        command: Option<String>,
        max_parallel: Option<u32>,
        flags: Option<String>,
        model: Option<String>,
        endpoint: Option<String>,
        invoker_path: Option<String>,
    }

    const SUFFIXES: &[(&str, fn(&mut Partial, String))] = &[
        ("_TYPE", |p, v| p.kind = Some(v)),
        ("_MAX_PARALLEL", |p, v| p.max_parallel = v.parse().ok()),
        ("_COMMAND", |p, v| p.command = Some(v)),
        ("_FLAGS", |p, v| p.flags = Some(v)),
        ("_MODEL", |p, v| p.model = Some(v)),
        ("_ENDPOINT", |p, v| p.endpoint = Some(v)),
        ("_INVOKER", |p, v| p.invoker_path = Some(v)),
    ];

    let mut partials: BTreeMap<String, Partial> = BTreeMap::new();

    for (key, value) in std::env::vars() {
        let Some(rest) = key.strip_prefix("LLM_") else { continue };
        let Some((name, setter)) = SUFFIXES.iter().find_map(|(suffix, setter)| {
            rest.strip_suffix(suffix).map(|name| (name.to_lowercase(), setter))
        }) else {
            continue;
        };
        setter(partials.entry(name).or_default(), value);
    }

    let mut backends = Vec::with_capacity(partials.len());
    for (name, partial) in partials {
        let kind_raw = partial.kind.ok_or(ConfigError::MissingBackendField { name: name.clone(), field: "TYPE" })?;
        let kind = match kind_raw.to_lowercase().as_str() {
            "api" => BackendKind::Api,
            "local" => BackendKind::Local,
            _ => return Err(ConfigError::InvalidBackendKind { name, value: kind_raw }),
        };
        let command = partial.command.ok_or(ConfigError::MissingBackendField { name: name.clone(), field: "COMMAND" })?;

        let mut backend = Backend::new(name.clone(), kind, command).with_max_parallel(partial.max_parallel.unwrap_or(1));
        backend.flags = partial.flags.map(|f| f.split_whitespace().map(str::to_string).collect()).unwrap_or_default();
        backend.model = partial.model;
        backend.endpoint = partial.endpoint;
        backend.invoker_path = partial.invoker_path;
        backends.push(backend);
    }

    Ok(BackendTable::new(backends))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
