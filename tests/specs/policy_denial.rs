//! S3 — a mid-run network violation aborts the agent and fails the run.

#![cfg(unix)]

use sb_core::{AccessTriple, CliAccess, FsAccess, NetAccess, RunStatus};
use sb_engine::{SubmitOutcome, SubmitRequest};
use tempfile::TempDir;

use super::prelude::*;

#[tokio::test]
async fn curl_to_a_public_host_under_localhost_access_fails_the_run() {
    let tmp = TempDir::new().expect("tmp");
    let stub = write_stub_agent(
        tmp.path(),
        r#"echo '{"type":"item.started","item":{"type":"command_execution","command":"curl https://example.com/x"}}'
sleep 2
echo '{"type":"turn.completed","usage":{}}'"#,
    );
    let engine = engine_with_agent(&tmp, stub);
    let thread = engine.ensure_thread(&sb_core::Scope::global()).expect("thread");

    let access = AccessTriple {
        filesystem: FsAccess::ReadOnly,
        cli: CliAccess::ReadOnly,
        network: NetAccess::Localhost,
        network_allowlist: Vec::new(),
    };
    let SubmitOutcome::Enqueued { run, .. } = engine
        .submit_message(&thread.id, SubmitRequest {
            content: "fetch the fixture".into(),
            access: Some(access),
            ..SubmitRequest::default()
        })
        .expect("submit")
    else {
        panic!("expected Enqueued");
    };

    engine.run_turn(&run.id).await.expect("turn");

    let finished = engine.store().get_run(&run.id).expect("get").expect("run");
    assert_eq!(finished.status, RunStatus::Failed);
    let error = finished.error.expect("error recorded");
    assert!(error.contains("example.com"), "denial names the host: {error}");

    // The command was recorded before the verdict.
    let commands = engine.store().list_commands(&run.id).expect("commands");
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].seq, 1);
    assert!(commands[0].command.contains("example.com"));
}

#[tokio::test]
async fn loopback_traffic_under_localhost_access_is_fine() {
    let tmp = TempDir::new().expect("tmp");
    let stub = write_stub_agent(
        tmp.path(),
        &format!(
            "echo '{{\"type\":\"item.started\",\"item\":{{\"type\":\"command_execution\",\"command\":\"curl http://127.0.0.1:8080/health\"}}}}'\n{}",
            reply_body(r#"{"reply":"healthy","needs_user_input":false,"actions":[]}"#)
        ),
    );
    let engine = engine_with_agent(&tmp, stub);
    let thread = engine.ensure_thread(&sb_core::Scope::global()).expect("thread");

    let access = AccessTriple {
        filesystem: FsAccess::ReadOnly,
        cli: CliAccess::ReadOnly,
        network: NetAccess::Localhost,
        network_allowlist: Vec::new(),
    };
    let SubmitOutcome::Enqueued { run, .. } = engine
        .submit_message(&thread.id, SubmitRequest {
            content: "check local health".into(),
            access: Some(access),
            ..SubmitRequest::default()
        })
        .expect("submit")
    else {
        panic!("expected Enqueued");
    };

    engine.run_turn(&run.id).await.expect("turn");
    assert_eq!(
        engine.store().get_run(&run.id).expect("get").expect("run").status,
        RunStatus::Done
    );
}
