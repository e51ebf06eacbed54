// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess lifecycle: Spawning → Running (streaming JSONL) → Draining →
//! Exited. Each transition has one producer; the abort handle is the only
//! signal that crosses in from outside the stream loop.

use std::process::Stdio;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use crate::event::parse_event;
use crate::logtail::error_from_log_tail;
use crate::{AgentEvent, AgentInvocation, DriverError};

/// Lets the event callback kill the run. First abort wins; later calls are
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    reason: Arc<OnceLock<String>>,
}

impl AbortHandle {
    pub fn abort(&self, reason: impl Into<String>) {
        let _ = self.reason.set(reason.into());
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }
}

/// What a finished (non-error) invocation produced.
#[derive(Debug, Clone)]
pub struct DriverOutcome {
    /// Content of the output-last-message file.
    pub last_message: String,
    /// Whether a `turn.completed` event was observed.
    pub turn_completed: bool,
}

/// Run the agent once. `on_event` sees every parsed JSONL line in order, at
/// most once, including the residual tail after stdin close; it may call
/// `AbortHandle::abort` to kill the child mid-stream.
pub async fn run_agent(
    invocation: &AgentInvocation,
    mut on_event: impl FnMut(&AgentEvent, &AbortHandle),
) -> Result<DriverOutcome, DriverError> {
    if let Some(parent) = invocation.log_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let log = Arc::new(Mutex::new(
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&invocation.log_path)
            .await?,
    ));

    // Spawning
    let mut child = Command::new(&invocation.bin)
        .args(invocation.args())
        .current_dir(&invocation.cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| DriverError::Spawn {
            bin: invocation.bin.display().to_string(),
            source,
        })?;
    tracing::debug!(bin = %invocation.bin.display(), pid = child.id(), "agent spawned");

    if let Some(mut stdin) = child.stdin.take() {
        // A dead child closes the pipe early; the exit path reports it.
        let _ = stdin.write_all(invocation.prompt.as_bytes()).await;
        let _ = stdin.shutdown().await;
    }

    let stderr = child.stderr.take();
    let stderr_log = Arc::clone(&log);
    let stderr_task = tokio::spawn(async move {
        let Some(stderr) = stderr else { return };
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut file = stderr_log.lock().await;
            let _ = file.write_all(line.as_bytes()).await;
            let _ = file.write_all(b"\n").await;
        }
    });

    let abort = AbortHandle::default();
    let secs = invocation.timeout.as_secs();
    let streamed = tokio::time::timeout(
        invocation.timeout,
        stream_events(&mut child, &log, &abort, &mut on_event),
    )
    .await;

    let result = match streamed {
        Err(_) => {
            let _ = child.kill().await;
            Err(DriverError::Timeout { secs })
        }
        Ok(inner) => inner,
    };
    let _ = tokio::time::timeout(Duration::from_secs(5), stderr_task).await;

    let (status, turn_completed) = result?;
    if let Some(reason) = abort.reason() {
        return Err(DriverError::Aborted { reason: reason.to_string() });
    }
    let code = status.code().unwrap_or(-1);
    if !status.success() && !turn_completed {
        // Exited (failed): pull the most recent error out of the log tail.
        let detail = error_from_log_tail(&invocation.log_path).await;
        return Err(DriverError::Exit { code, detail });
    }

    let last_message = tokio::fs::read_to_string(&invocation.output_last_message_path)
        .await
        .map_err(|_| DriverError::MissingOutput)?;
    if last_message.trim().is_empty() {
        return Err(DriverError::MissingOutput);
    }
    Ok(DriverOutcome { last_message, turn_completed })
}

/// Running + Draining: deliver each complete line exactly once, in order,
/// mirroring everything to the log. Returns the exit status and whether a
/// `turn.completed` was seen.
async fn stream_events(
    child: &mut Child,
    log: &Arc<Mutex<tokio::fs::File>>,
    abort: &AbortHandle,
    on_event: &mut impl FnMut(&AgentEvent, &AbortHandle),
) -> Result<(std::process::ExitStatus, bool), DriverError> {
    let mut turn_completed = false;
    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            let Some(line) = lines.next_line().await? else { break };
            {
                let mut file = log.lock().await;
                file.write_all(line.as_bytes()).await?;
                file.write_all(b"\n").await?;
            }
            if let Some(event) = parse_event(&line) {
                if matches!(event, AgentEvent::TurnCompleted { .. }) {
                    turn_completed = true;
                }
                on_event(&event, abort);
            }
            if abort.reason().is_some() {
                child.start_kill()?;
                // Draining: the pipe is still open; consume what is left so
                // the log stays complete.
                while let Ok(Some(rest)) = lines.next_line().await {
                    let mut file = log.lock().await;
                    let _ = file.write_all(rest.as_bytes()).await;
                    let _ = file.write_all(b"\n").await;
                }
                break;
            }
        }
    }
    let status = child.wait().await?;
    Ok((status, turn_completed))
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
