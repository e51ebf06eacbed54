// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt composition: one plain-text document per turn.

use sb_core::{LedgerEntry, Run, Thread};

use crate::context::TurnContext;
use crate::schema::action_schema_text;

/// Render the full prompt for a run.
pub(crate) fn compose(
    thread: &Thread,
    run: &Run,
    context: &TurnContext,
    workorder_runs: &[LedgerEntry],
) -> String {
    let mut doc = String::with_capacity(4096);

    doc.push_str("You are the coding agent behind a portfolio control plane.\n");
    doc.push_str(&format!("Thread scope: {}", thread.scope.kind));
    if let Some(project) = &thread.scope.project_id {
        doc.push_str(&format!(", project {project}"));
    }
    if let Some(wo) = &thread.scope.workorder_id {
        doc.push_str(&format!(", work order {wo}"));
    }
    doc.push('\n');
    doc.push_str(&format!("Access for this turn: {}\n", run.access.summary()));
    doc.push_str(&format!("Working directory: {}\n", run.cwd.display()));

    if !thread.summary.is_empty() {
        doc.push_str("\n## Conversation summary (older turns)\n");
        doc.push_str(&thread.summary);
        doc.push('\n');
    }

    doc.push_str("\n## Conversation\n");
    for message in &context.messages {
        doc.push_str(&format!("[{}] {}\n", message.role, message.content));
    }

    if !context.tools.is_empty() {
        doc.push_str("\n## Tool history from earlier runs\n");
        for section in &context.tools {
            doc.push_str(&format!("### run {}\n", section.run_id));
            for command in &section.commands {
                doc.push_str(&format!("$ {}\n", command.command));
            }
            if let Some(tail) = &section.log_tail {
                doc.push_str("--- log tail ---\n");
                doc.push_str(tail);
                if !tail.ends_with('\n') {
                    doc.push('\n');
                }
            }
        }
    }

    if !workorder_runs.is_empty() {
        doc.push_str("\n## Work-order runs started from this thread\n");
        for entry in workorder_runs {
            let status = match (&entry.error, entry.undone_at_ms) {
                (Some(err), _) => format!("failed: {err}"),
                (None, Some(_)) => "undone".to_string(),
                (None, None) => "dispatched".to_string(),
            };
            doc.push_str(&format!("- {} ({status})\n", entry.payload_json));
        }
    }

    doc.push_str("\n## Response contract\n");
    doc.push_str(&action_schema_text());
    doc
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
