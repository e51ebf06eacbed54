// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

/// Portfolio root: `SB_PORTFOLIO`, else the current directory.
pub fn portfolio() -> PathBuf {
    std::env::var("SB_PORTFOLIO")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Bind host. Loopback unless `SB_ALLOW_LAN` is set.
pub fn host() -> String {
    if allow_lan() {
        return std::env::var("SB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    }
    std::env::var("SB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
}

pub fn port() -> u16 {
    std::env::var("SB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4477)
}

/// LAN exposure is an explicit opt-in; the default surface is loopback-only.
pub fn allow_lan() -> bool {
    flag("SB_ALLOW_LAN")
}

/// Comma-separated CORS origin allowlist.
pub fn cors_allow() -> Vec<String> {
    list("SB_CORS_ALLOW")
}

/// Mark orphaned `running` rows failed at startup.
pub fn fail_running_on_start() -> bool {
    flag("SB_FAIL_RUNNING_ON_START")
}

pub fn worker_bin() -> Option<PathBuf> {
    std::env::var("SB_WORKER_BIN").ok().map(PathBuf::from)
}

pub fn agent_bin() -> PathBuf {
    std::env::var("SB_AGENT_BIN")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("codex"))
}

pub fn agent_model() -> Option<String> {
    std::env::var("SB_AGENT_MODEL").ok().filter(|s| !s.is_empty())
}

/// The trusted host pack behind `network=trusted`.
pub fn trusted_hosts() -> Vec<String> {
    list("SB_TRUSTED_HOSTS")
}

pub fn agent_timeout() -> Duration {
    secs("SB_AGENT_TIMEOUT_SECS", 600)
}

pub fn summary_timeout() -> Duration {
    secs("SB_SUMMARY_TIMEOUT_SECS", 120)
}

fn flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn list(name: &str) -> Vec<String> {
    std::env::var(name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn secs(name: &str, default: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(default))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
