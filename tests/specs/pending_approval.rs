//! S2 — write access needs confirmation; the identical confirmed resend
//! resolves the parked copy.

use sb_core::{AccessTriple, CliAccess, Confirmations, FsAccess, RunStatus};
use sb_engine::{SubmitOutcome, SubmitRequest};
use tempfile::TempDir;

use super::prelude::*;

fn write_access() -> AccessTriple {
    AccessTriple {
        filesystem: FsAccess::ReadWrite,
        cli: CliAccess::ReadWrite,
        ..AccessTriple::default()
    }
}

#[test]
fn unconfirmed_write_parks_then_confirmed_resend_enqueues() {
    let tmp = TempDir::new().expect("tmp");
    let engine = engine(&tmp);
    let thread = engine
        .ensure_thread(&sb_core::Scope::project("acme"))
        .expect("thread");

    // Default access is read-only/off/none; the request escalates to write
    // without confirming.
    let request = SubmitRequest {
        content: "refactor the auth module".into(),
        access: Some(write_access()),
        ..SubmitRequest::default()
    };
    let outcome = engine.submit_message(&thread.id, request.clone()).expect("submit");
    let SubmitOutcome::PendingApproval { id: pending_id, requires } = outcome else {
        panic!("expected PendingApproval");
    };
    assert!(requires.write);
    assert!(!requires.network_allowlist);

    // Nothing was enqueued.
    assert_eq!(engine.store().count_messages(&thread.id).expect("count"), 0);
    assert_eq!(
        engine
            .store()
            .count_runs_with_status(&thread.id, RunStatus::Queued)
            .expect("count"),
        0
    );

    // The identical submission with confirmations set goes through and
    // resolves the parked copy atomically.
    let confirmed = SubmitRequest {
        confirmations: Confirmations { write: true, network_allowlist: false },
        ..request
    };
    let outcome = engine.submit_message(&thread.id, confirmed).expect("submit");
    let SubmitOutcome::Enqueued { run, resolved, .. } = outcome else {
        panic!("expected Enqueued");
    };
    assert_eq!(run.status, RunStatus::Queued);
    assert_eq!(resolved, vec![pending_id.clone()]);
    assert!(
        !engine
            .store()
            .get_pending(&pending_id)
            .expect("get")
            .expect("row")
            .is_open()
    );
}

#[test]
fn canceling_a_pending_send_keeps_it_from_resolving() {
    let tmp = TempDir::new().expect("tmp");
    let engine = engine(&tmp);
    let thread = engine
        .ensure_thread(&sb_core::Scope::project("acme"))
        .expect("thread");

    let request = SubmitRequest {
        content: "refactor the auth module".into(),
        access: Some(write_access()),
        ..SubmitRequest::default()
    };
    let SubmitOutcome::PendingApproval { id, .. } =
        engine.submit_message(&thread.id, request.clone()).expect("submit")
    else {
        panic!("expected PendingApproval");
    };

    engine.cancel_pending(&id).expect("cancel");

    let confirmed = SubmitRequest {
        confirmations: Confirmations { write: true, network_allowlist: false },
        ..request
    };
    let SubmitOutcome::Enqueued { resolved, .. } =
        engine.submit_message(&thread.id, confirmed).expect("submit")
    else {
        panic!("expected Enqueued");
    };
    assert!(resolved.is_empty(), "canceled rows never auto-resolve");
}
