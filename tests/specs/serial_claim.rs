//! S1 — per-thread serial claim under racing workers.

use sb_core::test_support::run_fixture;
use sb_core::{RunStatus, Scope};
use sb_storage::Store;

fn enqueue(store: &Store, thread: &sb_core::Thread, id: &str, at_ms: u64) -> sb_core::RunId {
    let mut run = run_fixture(thread, id, 1);
    run.created_at_ms = at_ms;
    store.create_run(&run).expect("create run");
    run.id
}

#[test]
fn two_racing_workers_claim_exactly_one_run() {
    let store = Store::open_in_memory().expect("open");
    let thread = store.ensure_thread(&Scope::project("acme")).expect("thread");
    let r1 = enqueue(&store, &thread, "r1", 1);
    let r2 = enqueue(&store, &thread, "r2", 2);

    let mut results = Vec::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                let thread_id = thread.id.clone();
                scope.spawn(move || store.claim_next_run(&thread_id).expect("claim"))
            })
            .collect();
        for handle in handles {
            results.push(handle.join().expect("join"));
        }
    });

    let winners: Vec<_> = results.into_iter().flatten().collect();
    assert_eq!(winners, vec![r1.clone()], "exactly one claim, and it is the oldest");

    // After R1 completes, the chained claim picks up R2.
    store.finish_run_done(&r1, 1).expect("finish");
    assert_eq!(store.claim_next_run(&thread.id).expect("claim"), Some(r2));
}

#[test]
fn at_most_one_running_per_thread_at_all_times() {
    let store = Store::open_in_memory().expect("open");
    let thread = store.ensure_thread(&Scope::project("acme")).expect("thread");
    for i in 0..5 {
        enqueue(&store, &thread, &format!("r{i}"), i);
    }

    let mut done = 0;
    while let Some(claimed) = store.claim_next_run(&thread.id).expect("claim") {
        assert_eq!(
            store
                .count_runs_with_status(&thread.id, RunStatus::Running)
                .expect("count"),
            1
        );
        // A second claim while one is running never succeeds.
        assert_eq!(store.claim_next_run(&thread.id).expect("claim"), None);
        store.finish_run_done(&claimed, 1).expect("finish");
        done += 1;
    }
    assert_eq!(done, 5);
}

#[test]
fn finishing_worker_chains_iff_a_queued_run_exists() {
    let store = Store::open_in_memory().expect("open");
    let launcher = sb_engine::WorkerLauncher::disabled();
    let thread = store.ensure_thread(&Scope::project("acme")).expect("thread");
    let r1 = enqueue(&store, &thread, "r1", 1);
    let r2 = enqueue(&store, &thread, "r2", 2);

    assert!(store.claim_run(&r1).expect("claim"));
    store.finish_run_done(&r1, 1).expect("finish");

    // One queued sibling → exactly one chain attempt, naming it.
    let chained = sb_engine::chain_next(&store, &launcher, &thread.id).expect("chain");
    assert_eq!(chained, Some(r2.clone()));

    assert!(store.claim_run(&r2).expect("claim"));
    store.finish_run_done(&r2, 1).expect("finish");

    // Empty queue → no attempt.
    assert_eq!(
        sb_engine::chain_next(&store, &launcher, &thread.id).expect("chain"),
        None
    );
}
