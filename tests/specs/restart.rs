//! S6 — restart recovery flips exactly the running rows, with the fixed
//! reason, and nothing else.

use sb_core::test_support::run_fixture;
use sb_core::{RunStatus, Scope};
use sb_storage::Store;

const REASON: &str = "Server restarted; run aborted.";

#[test]
fn only_running_rows_are_failed() {
    let store = Store::open_in_memory().expect("open");
    let thread = store.ensure_thread(&Scope::project("acme")).expect("thread");

    let mut queued = run_fixture(&thread, "queued", 1);
    queued.created_at_ms = 1;
    store.create_run(&queued).expect("create");

    let mut running = run_fixture(&thread, "a-running", 1);
    running.created_at_ms = 0;
    store.create_run(&running).expect("create");
    assert!(store.claim_run(&running.id).expect("claim"));

    let mut terminal = run_fixture(&thread, "terminal", 1);
    terminal.created_at_ms = 2;
    store.create_run(&terminal).expect("create");
    store.finish_run_failed(&terminal.id, "earlier failure").expect("fail");

    let affected = store.fail_running_runs(REASON).expect("recover");
    assert_eq!(affected.len(), 1);
    assert_eq!(affected[0].0, running.id);

    let recovered = store.get_run(&running.id).expect("get").expect("run");
    assert_eq!(recovered.status, RunStatus::Failed);
    assert_eq!(recovered.error.as_deref(), Some(REASON));
    assert!(recovered.finished_at_ms.is_some());

    // The queued sibling is untouched and claimable again.
    assert_eq!(
        store.get_run(&queued.id).expect("get").expect("run").status,
        RunStatus::Queued
    );
    assert_eq!(store.claim_next_run(&thread.id).expect("claim"), Some(queued.id));

    // The earlier terminal row keeps its own error.
    assert_eq!(
        store.get_run(&terminal.id).expect("get").expect("run").error.as_deref(),
        Some("earlier failure")
    );
}

#[test]
fn recovery_on_an_idle_store_is_a_no_op() {
    let store = Store::open_in_memory().expect("open");
    store.ensure_thread(&Scope::global()).expect("thread");
    assert!(store.fail_running_runs(REASON).expect("recover").is_empty());
}
