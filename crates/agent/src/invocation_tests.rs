// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use sb_core::SandboxMode;

use super::*;

fn invocation(sandbox: SandboxMode, network: bool) -> AgentInvocation {
    AgentInvocation {
        bin: PathBuf::from("codex"),
        cwd: PathBuf::from("/work"),
        prompt: "do it".into(),
        sandbox,
        network_access: network,
        model: None,
        output_schema_path: PathBuf::from("/run/schema.json"),
        output_last_message_path: PathBuf::from("/run/result.json"),
        log_path: PathBuf::from("/run/codex.jsonl"),
        skip_git_repo_check: false,
        timeout: Duration::from_secs(60),
    }
}

#[test]
fn args_follow_the_fixed_schema() {
    let args = invocation(SandboxMode::ReadOnly, false).args();
    assert_eq!(
        args,
        vec![
            "--ask-for-approval",
            "never",
            "exec",
            "--json",
            "--sandbox",
            "read-only",
            "--output-schema",
            "/run/schema.json",
            "--output-last-message",
            "/run/result.json",
            "--color",
            "never",
        ]
    );
}

#[test]
fn network_flag_appends_the_config_override() {
    let args = invocation(SandboxMode::WorkspaceWrite, true).args();
    assert!(args.contains(&"workspace-write".to_string()));
    let idx = args.iter().position(|a| a == "-c").unwrap();
    assert_eq!(args[idx + 1], "sandbox_workspace_write.network_access=true");
}

#[test]
fn model_is_passed_before_sandbox() {
    let mut inv = invocation(SandboxMode::ReadOnly, false);
    inv.model = Some("gpt-5-codex".into());
    let args = inv.args();
    let model_idx = args.iter().position(|a| a == "--model").unwrap();
    let sandbox_idx = args.iter().position(|a| a == "--sandbox").unwrap();
    assert_eq!(args[model_idx + 1], "gpt-5-codex");
    assert!(model_idx < sandbox_idx);
}

#[test]
fn skip_git_repo_check_is_opt_in() {
    let mut inv = invocation(SandboxMode::ReadOnly, false);
    assert!(!inv.args().contains(&"--skip-git-repo-check".to_string()));
    inv.skip_git_repo_check = true;
    assert!(inv.args().contains(&"--skip-git-repo-check".to_string()));
}
