// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sb-agent: driver for the external agent CLI.
//!
//! The agent is an opaque binary speaking the codex exec contract: prompt on
//! stdin, newline-delimited JSON events on stdout, the final user-facing
//! payload written to an output file validated against a schema we provide.
//! The driver streams events to a callback, mirrors everything into the run
//! log, and turns abort/timeout/exit conditions into typed errors.

mod driver;
mod event;
mod invocation;
mod logtail;

pub use driver::{run_agent, AbortHandle, DriverOutcome};
pub use event::{parse_event, AgentEvent};
pub use invocation::AgentInvocation;
pub use logtail::error_from_log_tail;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to spawn agent {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("agent aborted: {reason}")]
    Aborted { reason: String },

    #[error("agent timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("agent exited with {code}{}", detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Exit { code: i32, detail: Option<String> },

    #[error("agent produced no final message")]
    MissingOutput,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    pub fn kind(&self) -> sb_core::ErrorKind {
        match self {
            DriverError::Aborted { .. } => sb_core::ErrorKind::PolicyDenied,
            DriverError::MissingOutput => sb_core::ErrorKind::SchemaViolation,
            _ => sb_core::ErrorKind::SubprocessFailure,
        }
    }
}
