// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server configuration, resolved once at startup.

use std::path::PathBuf;

use sb_engine::{EngineConfig, WorkerLaunch};

use crate::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub portfolio: PathBuf,
    pub host: String,
    pub port: u16,
    pub cors_allow: Vec<String>,
    pub fail_running_on_start: bool,
    pub worker_launch: WorkerLaunch,
}

impl ServerConfig {
    /// Resolve everything from the environment. The worker launch strategy
    /// is pinned here: explicit binary > sibling of the current executable >
    /// source launcher in a development checkout > disabled.
    pub fn from_env() -> Self {
        Self {
            portfolio: env::portfolio(),
            host: env::host(),
            port: env::port(),
            cors_allow: env::cors_allow(),
            fail_running_on_start: env::fail_running_on_start(),
            worker_launch: resolve_worker_launch(),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            portfolio: self.portfolio.clone(),
            agent_bin: env::agent_bin(),
            model: env::agent_model(),
            trusted_hosts: env::trusted_hosts(),
            agent_timeout: env::agent_timeout(),
            summary_timeout: env::summary_timeout(),
        }
    }

    /// Environment handed to spawned workers so they resolve the same
    /// portfolio and agent.
    pub fn worker_envs(&self) -> Vec<(String, String)> {
        let mut envs = vec![(
            "SB_PORTFOLIO".to_string(),
            self.portfolio.display().to_string(),
        )];
        for key in [
            "SB_AGENT_BIN",
            "SB_AGENT_MODEL",
            "SB_TRUSTED_HOSTS",
            "SB_AGENT_TIMEOUT_SECS",
            "SB_SUMMARY_TIMEOUT_SECS",
        ] {
            if let Ok(value) = std::env::var(key) {
                envs.push((key.to_string(), value));
            }
        }
        envs
    }
}

fn resolve_worker_launch() -> WorkerLaunch {
    if let Some(bin) = env::worker_bin() {
        return WorkerLaunch::Binary(bin);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("sb-worker");
            if sibling.is_file() {
                return WorkerLaunch::Binary(sibling);
            }
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        if cwd.join("Cargo.toml").is_file() {
            return WorkerLaunch::Source { manifest_dir: cwd };
        }
    }
    tracing::warn!("no worker launch strategy found; runs will stay queued");
    WorkerLaunch::Disabled
}
