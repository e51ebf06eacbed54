// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg(unix)]

use sb_core::{
    AccessTriple, CliAccess, Confirmations, FsAccess, NetAccess, Role, RunStatus, Scope,
};
use tempfile::TempDir;

use crate::gate::{SubmitOutcome, SubmitRequest};
use crate::test_helpers::{init_project_repo, reply_body, test_engine, write_stub_agent};

fn enqueued(outcome: SubmitOutcome) -> sb_core::Run {
    match outcome {
        SubmitOutcome::Enqueued { run, .. } => run,
        other => panic!("expected Enqueued, got {other:?}"),
    }
}

#[tokio::test]
async fn happy_turn_persists_the_reply_and_finishes_done() {
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    engine.config.agent_bin = write_stub_agent(
        tmp.path(),
        &reply_body(r#"{"reply":"All quiet.","needs_user_input":false,"actions":[]}"#),
    );

    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    let run = enqueued(
        engine
            .submit_message(&thread.id, SubmitRequest {
                content: "status?".into(),
                ..SubmitRequest::default()
            })
            .unwrap(),
    );

    engine.run_turn(&run.id).await.unwrap();

    let finished = engine.store().get_run(&run.id).unwrap().unwrap();
    assert_eq!(finished.status, RunStatus::Done);
    let assistant_id = finished.assistant_message_id.unwrap();
    let assistant = engine.store().get_message(assistant_id).unwrap().unwrap();
    assert_eq!(assistant.role, Role::Assistant);
    assert_eq!(assistant.content, "All quiet.");
    assert_eq!(assistant.run_id.as_ref(), Some(&run.id));

    // Prompt and schema were written into the run directory.
    assert!(engine.paths().run_prompt(&run.id).exists());
    assert!(engine.paths().run_schema(&run.id).exists());
}

#[tokio::test]
async fn lost_claim_exits_silently() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    engine.run_turn(&sb_core::RunId::new("no-such-run")).await.unwrap();
}

#[tokio::test]
async fn network_denial_aborts_and_records_the_command() {
    // S3: curl to a public host under network=localhost.
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    engine.config.agent_bin = write_stub_agent(
        tmp.path(),
        r#"echo '{"type":"item.started","item":{"type":"command_execution","command":"curl https://example.com/x"}}'
sleep 2
echo '{"type":"turn.completed","usage":{}}'"#,
    );

    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    let access = AccessTriple {
        filesystem: FsAccess::ReadOnly,
        cli: CliAccess::ReadOnly,
        network: NetAccess::Localhost,
        network_allowlist: Vec::new(),
    };
    let run = enqueued(
        engine
            .submit_message(&thread.id, SubmitRequest {
                content: "probe the api".into(),
                access: Some(access),
                ..SubmitRequest::default()
            })
            .unwrap(),
    );

    engine.run_turn(&run.id).await.unwrap();

    let finished = engine.store().get_run(&run.id).unwrap().unwrap();
    assert_eq!(finished.status, RunStatus::Failed);
    assert!(finished.error.as_deref().unwrap().contains("example.com"));

    // The denied command is still in the audit trail.
    let commands = engine.store().list_commands(&run.id).unwrap();
    assert_eq!(commands.len(), 1);
    assert!(commands[0].command.contains("curl"));

    // And the thread shows a synthetic failure message.
    let tail = engine.store().recent_messages(&thread.id, 1).unwrap();
    assert!(tail[0].content.starts_with("Chat run failed:"));
    assert!(tail[0].content.contains("example.com"));
}

#[tokio::test]
async fn any_command_under_cli_off_aborts() {
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    engine.config.agent_bin = write_stub_agent(
        tmp.path(),
        r#"echo '{"type":"item.started","item":{"type":"command_execution","command":"ls"}}'
sleep 2"#,
    );

    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    let run = enqueued(
        engine
            .submit_message(&thread.id, SubmitRequest {
                content: "look around".into(),
                ..SubmitRequest::default()
            })
            .unwrap(),
    );

    engine.run_turn(&run.id).await.unwrap();

    let finished = engine.store().get_run(&run.id).unwrap().unwrap();
    assert_eq!(finished.status, RunStatus::Failed);
    assert!(finished.error.as_deref().unwrap().contains("CLI access is disabled"));
}

#[tokio::test]
async fn invalid_final_message_fails_the_run() {
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    engine.config.agent_bin = write_stub_agent(
        tmp.path(),
        &reply_body(r#"{"not_the_contract": true}"#),
    );

    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    let run = enqueued(
        engine
            .submit_message(&thread.id, SubmitRequest {
                content: "hello".into(),
                ..SubmitRequest::default()
            })
            .unwrap(),
    );

    engine.run_turn(&run.id).await.unwrap();
    let finished = engine.store().get_run(&run.id).unwrap().unwrap();
    assert_eq!(finished.status, RunStatus::Failed);
    assert!(finished.error.as_deref().unwrap().contains("schema violation"));
}

#[tokio::test]
async fn writable_turn_gets_a_worktree_and_a_synthetic_merge_action() {
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    init_project_repo(tmp.path(), "acme");
    engine.config.agent_bin = write_stub_agent(
        tmp.path(),
        &format!(
            "echo agent-was-here > agent.txt\n{}",
            reply_body(r#"{"reply":"Wrote a file.","needs_user_input":false,"actions":[]}"#)
        ),
    );

    let thread = engine.ensure_thread(&Scope::project("acme")).unwrap();
    let access = AccessTriple {
        filesystem: FsAccess::ReadWrite,
        cli: CliAccess::ReadWrite,
        ..AccessTriple::default()
    };
    let run = enqueued(
        engine
            .submit_message(&thread.id, SubmitRequest {
                content: "write a file".into(),
                access: Some(access),
                confirmations: Confirmations { write: true, network_allowlist: false },
                ..SubmitRequest::default()
            })
            .unwrap(),
    );

    engine.run_turn(&run.id).await.unwrap();

    // The run moved into the worktree, not the user's checkout.
    let finished = engine.store().get_run(&run.id).unwrap().unwrap();
    assert_eq!(finished.status, RunStatus::Done);
    let reloaded = engine.store().get_thread(&thread.id).unwrap().unwrap();
    let worktree = reloaded.worktree_path.expect("worktree assigned");
    assert_eq!(finished.cwd, worktree);
    assert!(worktree.join("agent.txt").exists());
    assert!(!tmp.path().join("acme/agent.txt").exists());
    assert!(reloaded.has_pending_changes);

    // The assistant message carries the synthetic merge proposal.
    let assistant = engine
        .store()
        .get_message(finished.assistant_message_id.unwrap())
        .unwrap()
        .unwrap();
    assert!(assistant
        .actions
        .iter()
        .any(|a| matches!(a, sb_core::Action::WorktreeMerge { .. })));
}

#[tokio::test]
async fn queued_runs_execute_serially_in_order() {
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    engine.config.agent_bin = write_stub_agent(
        tmp.path(),
        &reply_body(r#"{"reply":"ok","needs_user_input":false,"actions":[]}"#),
    );

    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    let r1 = enqueued(
        engine
            .submit_message(&thread.id, SubmitRequest {
                content: "first".into(),
                ..SubmitRequest::default()
            })
            .unwrap(),
    );
    let r2 = enqueued(
        engine
            .submit_message(&thread.id, SubmitRequest {
                content: "second".into(),
                ..SubmitRequest::default()
            })
            .unwrap(),
    );

    // r2 cannot be claimed ahead of r1.
    engine.run_turn(&r2.id).await.unwrap();
    assert_eq!(
        engine.store().get_run(&r2.id).unwrap().unwrap().status,
        RunStatus::Queued
    );

    engine.run_turn(&r1.id).await.unwrap();
    engine.run_turn(&r2.id).await.unwrap();
    assert_eq!(engine.store().get_run(&r1.id).unwrap().unwrap().status, RunStatus::Done);
    assert_eq!(engine.store().get_run(&r2.id).unwrap().unwrap().status, RunStatus::Done);
}
