// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed extraction over the agent's JSONL event stream.
//!
//! The stream uses several shapes to say "a shell command was issued". The
//! extractor recognizes a fixed set of them; a new shape means a code change
//! here, never runtime inference.

use serde_json::Value;

/// One parsed stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    ThreadStarted {
        thread_id: String,
    },
    /// A shell command the agent is executing.
    ShellCommand {
        command: String,
        cwd: Option<String>,
    },
    AssistantMessage {
        text: String,
    },
    TurnCompleted {
        input_tokens: u64,
        cached_input_tokens: u64,
        output_tokens: u64,
    },
    TurnFailed {
        message: String,
    },
    Error {
        message: String,
    },
    /// Recognized JSON we have no use for; kept so callers can trace it.
    Other {
        event_type: String,
    },
}

/// Parse one JSONL line. Non-JSON lines yield `None` (the raw line still
/// lands in the log).
pub fn parse_event(line: &str) -> Option<AgentEvent> {
    let json: Value = serde_json::from_str(line.trim()).ok()?;
    let event_type = json.get("type").and_then(Value::as_str)?;

    let event = match event_type {
        "thread.started" => AgentEvent::ThreadStarted {
            thread_id: str_at(&json, &["thread_id"])
                .or_else(|| str_at(&json, &["session_id"]))
                .unwrap_or_default(),
        },
        "turn.completed" => {
            let usage = json.get("usage");
            let field = |name: &str| {
                usage
                    .and_then(|u| u.get(name))
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
            };
            AgentEvent::TurnCompleted {
                input_tokens: field("input_tokens"),
                cached_input_tokens: field("cached_input_tokens"),
                output_tokens: field("output_tokens"),
            }
        }
        "turn.failed" => AgentEvent::TurnFailed {
            message: str_at(&json, &["error", "message"])
                .or_else(|| str_at(&json, &["message"]))
                .unwrap_or_else(|| "turn failed".to_string()),
        },
        "error" => AgentEvent::Error {
            message: str_at(&json, &["message"]).unwrap_or_else(|| "unknown error".to_string()),
        },
        "item.started" | "item.completed" => return item_event(&json, event_type),
        "tool_invocation" => return tool_invocation(&json),
        other => AgentEvent::Other { event_type: other.to_string() },
    };
    Some(event)
}

fn item_event(json: &Value, event_type: &str) -> Option<AgentEvent> {
    let item = json.get("item")?;
    let item_type = item.get("type").and_then(Value::as_str).unwrap_or("unknown");
    match item_type {
        // Commands are recorded once, when execution starts; the completed
        // twin only repeats the command text.
        "command_execution" if event_type == "item.started" => {
            let command = item.get("command").and_then(Value::as_str)?;
            Some(AgentEvent::ShellCommand {
                command: command.to_string(),
                cwd: item.get("cwd").and_then(Value::as_str).map(str::to_string),
            })
        }
        "agent_message" if event_type == "item.completed" => {
            let text = item.get("text").and_then(Value::as_str).unwrap_or("");
            Some(AgentEvent::AssistantMessage { text: text.to_string() })
        }
        _ => Some(AgentEvent::Other { event_type: format!("{event_type}:{item_type}") }),
    }
}

/// The tool-invocation family: the command text hides under one of
/// `shell_command`, `shell`, `bash`, `sh`, or a nested `*.shell_command`.
fn tool_invocation(json: &Value) -> Option<AgentEvent> {
    let tool = json.get("tool").unwrap_or(json);
    for key in ["shell_command", "shell", "bash", "sh"] {
        if let Some(command) = tool.get(key).and_then(Value::as_str) {
            return Some(AgentEvent::ShellCommand {
                command: command.to_string(),
                cwd: str_at(json, &["cwd"]),
            });
        }
    }
    // Nested object carrying a shell_command field one level down.
    if let Some(obj) = tool.as_object() {
        for value in obj.values() {
            if let Some(command) = value.get("shell_command").and_then(Value::as_str) {
                return Some(AgentEvent::ShellCommand {
                    command: command.to_string(),
                    cwd: str_at(json, &["cwd"]),
                });
            }
        }
    }
    Some(AgentEvent::Other { event_type: "tool_invocation".to_string() })
}

fn str_at(json: &Value, path: &[&str]) -> Option<String> {
    let mut cur = json;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_str().map(str::to_string)
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
