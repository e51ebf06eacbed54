// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use sb_core::{AccessTriple, CliAccess, Confirmations, FsAccess, RunStatus, Scope};
use tempfile::TempDir;

use super::*;
use crate::test_helpers::test_engine;
use crate::EngineError;

fn write_access() -> AccessTriple {
    AccessTriple {
        filesystem: FsAccess::ReadWrite,
        cli: CliAccess::ReadWrite,
        ..AccessTriple::default()
    }
}

#[test]
fn harmless_submission_enqueues_directly() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let thread = engine.ensure_thread(&Scope::global()).unwrap();

    let outcome = engine
        .submit_message(&thread.id, SubmitRequest {
            content: "what changed yesterday?".into(),
            ..SubmitRequest::default()
        })
        .unwrap();

    match outcome {
        SubmitOutcome::Enqueued { run, message, resolved } => {
            assert_eq!(run.status, RunStatus::Queued);
            assert_eq!(message.seq, 1);
            assert!(resolved.is_empty());
        }
        other => panic!("expected Enqueued, got {other:?}"),
    }
}

#[test]
fn write_access_without_confirmation_parks_the_message() {
    // S2, first half: 409-shaped outcome with requires.write set.
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let thread = engine.ensure_thread(&Scope::project("acme")).unwrap();

    let outcome = engine
        .submit_message(&thread.id, SubmitRequest {
            content: "fix the login bug".into(),
            access: Some(write_access()),
            ..SubmitRequest::default()
        })
        .unwrap();

    let SubmitOutcome::PendingApproval { id, requires } = outcome else {
        panic!("expected PendingApproval");
    };
    assert!(requires.write);
    assert!(!requires.network_allowlist);
    assert_eq!(engine.store().list_open_pending(&thread.id).unwrap().len(), 1);
    assert!(engine.store().get_pending(&id).unwrap().unwrap().is_open());

    // No message, no run.
    assert_eq!(engine.store().count_messages(&thread.id).unwrap(), 0);
}

#[test]
fn confirmed_resend_resolves_the_parked_copy() {
    // S2, second half.
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let thread = engine.ensure_thread(&Scope::project("acme")).unwrap();

    let request = SubmitRequest {
        content: "fix the login bug".into(),
        access: Some(write_access()),
        ..SubmitRequest::default()
    };
    let SubmitOutcome::PendingApproval { id, .. } =
        engine.submit_message(&thread.id, request.clone()).unwrap()
    else {
        panic!("expected PendingApproval");
    };

    let confirmed = SubmitRequest {
        confirmations: Confirmations { write: true, network_allowlist: false },
        ..request
    };
    let SubmitOutcome::Enqueued { resolved, .. } =
        engine.submit_message(&thread.id, confirmed).unwrap()
    else {
        panic!("expected Enqueued");
    };
    assert_eq!(resolved, vec![id]);
    assert!(engine.store().list_open_pending(&thread.id).unwrap().is_empty());
}

#[test]
fn network_allowlist_needs_its_own_confirmation() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let thread = engine.ensure_thread(&Scope::global()).unwrap();

    let access = AccessTriple {
        network: sb_core::NetAccess::Allowlist,
        network_allowlist: vec!["api.example.com".into()],
        ..AccessTriple::default()
    };
    let outcome = engine
        .submit_message(&thread.id, SubmitRequest {
            content: "check the api".into(),
            access: Some(access),
            confirmations: Confirmations { write: true, network_allowlist: false },
            ..SubmitRequest::default()
        })
        .unwrap();

    let SubmitOutcome::PendingApproval { requires, .. } = outcome else {
        panic!("expected PendingApproval");
    };
    assert!(!requires.write);
    assert!(requires.network_allowlist);
}

#[test]
fn inconsistent_access_is_a_validation_error() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let thread = engine.ensure_thread(&Scope::global()).unwrap();

    let access = AccessTriple {
        filesystem: FsAccess::None,
        cli: CliAccess::ReadOnly,
        ..AccessTriple::default()
    };
    let err = engine
        .submit_message(&thread.id, SubmitRequest {
            content: "hi".into(),
            access: Some(access),
            ..SubmitRequest::default()
        })
        .unwrap_err();
    assert_eq!(err.kind(), sb_core::ErrorKind::Validation);
}

#[test]
fn empty_content_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let thread = engine.ensure_thread(&Scope::global()).unwrap();

    let err = engine
        .submit_message(&thread.id, SubmitRequest {
            content: "   ".into(),
            ..SubmitRequest::default()
        })
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn archived_threads_refuse_submissions() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    engine.store().set_thread_archived(&thread.id, true).unwrap();

    let err = engine
        .submit_message(&thread.id, SubmitRequest {
            content: "hello?".into(),
            ..SubmitRequest::default()
        })
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[test]
fn cancel_pending_is_single_shot() {
    let tmp = TempDir::new().unwrap();
    let engine = test_engine(&tmp);
    let thread = engine.ensure_thread(&Scope::global()).unwrap();

    let SubmitOutcome::PendingApproval { id, .. } = engine
        .submit_message(&thread.id, SubmitRequest {
            content: "write stuff".into(),
            access: Some(write_access()),
            ..SubmitRequest::default()
        })
        .unwrap()
    else {
        panic!("expected PendingApproval");
    };

    engine.cancel_pending(&id).unwrap();
    assert!(matches!(
        engine.cancel_pending(&id),
        Err(EngineError::NotFound { .. })
    ));
}
