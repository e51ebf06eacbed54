// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One agent invocation: binary, flags, prompt, and where output lands.

use std::path::PathBuf;
use std::time::Duration;

use sb_core::SandboxMode;

/// Everything needed to spawn the agent CLI once. The argument schema is
/// fixed; callers only choose the knobs.
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    pub bin: PathBuf,
    pub cwd: PathBuf,
    pub prompt: String,
    pub sandbox: SandboxMode,
    /// Passes `-c sandbox_workspace_write.network_access=true`.
    pub network_access: bool,
    pub model: Option<String>,
    /// JSON schema the agent's final message must match.
    pub output_schema_path: PathBuf,
    /// Where the agent writes its final message.
    pub output_last_message_path: PathBuf,
    /// Mirror of stdout/stderr; the durable audit record.
    pub log_path: PathBuf,
    pub skip_git_repo_check: bool,
    pub timeout: Duration,
}

impl AgentInvocation {
    /// The fixed argument vector. The prompt goes over stdin, never argv.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--ask-for-approval".to_string(),
            "never".to_string(),
            "exec".to_string(),
            "--json".to_string(),
        ];
        if let Some(model) = &self.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args.push("--sandbox".to_string());
        args.push(self.sandbox.to_string());
        args.push("--output-schema".to_string());
        args.push(self.output_schema_path.display().to_string());
        args.push("--output-last-message".to_string());
        args.push(self.output_last_message_path.display().to_string());
        args.push("--color".to_string());
        args.push("never".to_string());
        if self.skip_git_repo_check {
            args.push("--skip-git-repo-check".to_string());
        }
        if self.network_access {
            args.push("-c".to_string());
            args.push("sandbox_workspace_write.network_access=true".to_string());
        }
        args
    }
}

#[cfg(test)]
#[path = "invocation_tests.rs"]
mod tests;
