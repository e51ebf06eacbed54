// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pull a human-readable failure cause out of the run log.

use std::path::Path;

use crate::event::parse_event;
use crate::AgentEvent;

/// How much of the log tail to scan.
const TAIL_BYTES: u64 = 64 * 1024;

/// Scan the tail of the log for the most recent `error` or `turn.failed`
/// event and return its message. Best-effort; `None` when the log is
/// unreadable or carries no such event.
pub async fn error_from_log_tail(log_path: &Path) -> Option<String> {
    let bytes = read_tail(log_path).await?;
    let text = String::from_utf8_lossy(&bytes);
    let mut latest = None;
    for line in text.lines() {
        match parse_event(line) {
            Some(AgentEvent::Error { message }) | Some(AgentEvent::TurnFailed { message }) => {
                latest = Some(message);
            }
            _ => {}
        }
    }
    latest
}

async fn read_tail(path: &Path) -> Option<Vec<u8>> {
    use tokio::io::{AsyncReadExt, AsyncSeekExt};

    let mut file = tokio::fs::File::open(path).await.ok()?;
    let len = file.metadata().await.ok()?.len();
    let start = len.saturating_sub(TAIL_BYTES);
    file.seek(std::io::SeekFrom::Start(start)).await.ok()?;
    let mut buf = Vec::with_capacity((len - start) as usize);
    file.read_to_end(&mut buf).await.ok()?;
    Some(buf)
}

#[cfg(test)]
#[path = "logtail_tests.rs"]
mod tests;
