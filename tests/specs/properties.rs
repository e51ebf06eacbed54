//! Property specs for the cross-cutting invariants.

use proptest::prelude::*;
use sb_core::test_support::run_fixture;
use sb_core::{
    AccessTriple, Action, CliAccess, FsAccess, NetAccess, RunStatus, Scope, WorkOrderStatus,
};
use sb_storage::{LedgerContext, Store};

fn fs_level() -> impl Strategy<Value = FsAccess> {
    prop_oneof![
        Just(FsAccess::None),
        Just(FsAccess::ReadOnly),
        Just(FsAccess::ReadWrite),
    ]
}

fn cli_level() -> impl Strategy<Value = CliAccess> {
    prop_oneof![
        Just(CliAccess::Off),
        Just(CliAccess::ReadOnly),
        Just(CliAccess::ReadWrite),
    ]
}

fn net_level() -> impl Strategy<Value = NetAccess> {
    prop_oneof![
        Just(NetAccess::None),
        Just(NetAccess::Localhost),
        Just(NetAccess::Allowlist),
        Just(NetAccess::Trusted),
    ]
}

proptest! {
    /// Invariant 1 — serial per-thread: under any interleaving of enqueue,
    /// claim, and finish, at most one run is ever running.
    #[test]
    fn serial_per_thread_under_random_ops(ops in proptest::collection::vec(0u8..3, 1..40)) {
        let store = Store::open_in_memory().expect("open");
        let thread = store.ensure_thread(&Scope::project("acme")).expect("thread");
        let mut next_id = 0u32;
        let mut running: Option<sb_core::RunId> = None;

        for op in ops {
            match op {
                0 => {
                    let mut run = run_fixture(&thread, &format!("r{next_id:04}"), 1);
                    run.created_at_ms = next_id as u64;
                    store.create_run(&run).expect("create");
                    next_id += 1;
                }
                1 => {
                    if let Some(claimed) = store.claim_next_run(&thread.id).expect("claim") {
                        prop_assert!(running.is_none(), "claim while running");
                        running = Some(claimed);
                    }
                }
                _ => {
                    if let Some(run_id) = running.take() {
                        store.finish_run_done(&run_id, 1).expect("finish");
                    }
                }
            }
            let count = store
                .count_runs_with_status(&thread.id, RunStatus::Running)
                .expect("count");
            prop_assert!(count <= 1, "running count {count} > 1");
        }
    }

    /// Invariant 4 — policy consistency: sanitize always lands on a triple
    /// the admission check accepts, for every input triple.
    #[test]
    fn sanitize_reaches_a_consistent_triple(
        fs in fs_level(),
        cli in cli_level(),
        net in net_level(),
        hosts in proptest::collection::vec("[a-z]{3,8}\\.example\\.com", 0..3),
        has_pack in proptest::bool::ANY,
    ) {
        let access = AccessTriple {
            filesystem: fs,
            cli,
            network: net,
            network_allowlist: hosts,
        };
        let (fixed, _notes) = sb_policy::sanitize_access(&access, has_pack);
        prop_assert!(sb_policy::check_access(&fixed, has_pack).is_ok());
    }

    /// Invariant 6 — command ordering: seq is the contiguous range [1..n]
    /// in insertion order.
    #[test]
    fn command_seq_is_contiguous(count in 1usize..30) {
        let store = Store::open_in_memory().expect("open");
        let thread = store.ensure_thread(&Scope::project("acme")).expect("thread");
        let run = run_fixture(&thread, "r1", 1);
        store.create_run(&run).expect("create");

        for i in 0..count {
            store
                .record_command(&run.id, std::path::Path::new("/w"), &format!("cmd {i}"))
                .expect("record");
        }
        let commands = store.list_commands(&run.id).expect("list");
        let seqs: Vec<u64> = commands.iter().map(|c| c.seq).collect();
        let expected: Vec<u64> = (1..=count as u64).collect();
        prop_assert_eq!(seqs, expected);
    }

    /// Invariant 2 — summarized_count is monotone under arbitrary chunk
    /// updates; stale writers lose.
    #[test]
    fn summary_count_is_monotone(counts in proptest::collection::vec(0u64..20, 1..20)) {
        let store = Store::open_in_memory().expect("open");
        let thread = store.ensure_thread(&Scope::global()).expect("thread");
        let mut high = 0u64;

        for chunk in counts {
            let target = chunk * 50;
            let result = store.set_thread_summary(&thread.id, "s", target);
            if target >= high {
                prop_assert!(result.is_ok());
                high = target;
            } else {
                prop_assert!(result.is_err());
            }
            let current = store
                .get_thread(&thread.id)
                .expect("get")
                .expect("thread")
                .summarized_count;
            prop_assert_eq!(current, high);
            prop_assert_eq!(current % 50, 0);
        }
    }
}

/// Round-trip law — apply then undo returns the entity to its pre-apply
/// state and marks (never deletes) the entry.
#[test]
fn apply_undo_round_trips_for_every_database_action() {
    let store = Store::open_in_memory().expect("open");
    store.upsert_project("p1", "Acme").expect("project");
    let thread = store.ensure_thread(&Scope::project("p1")).expect("thread");
    let ctx = LedgerContext {
        thread_id: thread.id.clone(),
        run_id: None,
        message_id: None,
        action_index: 0,
    };

    // Seed a work order to mutate.
    let created = store
        .apply_action(&ctx, &Action::WorkOrderCreate {
            project_id: "p1".into(),
            title: "seed".into(),
            description: "before".into(),
        })
        .expect("create");
    let undo: serde_json::Value =
        serde_json::from_str(created.undo_payload_json.as_deref().expect("undo payload"))
            .expect("json");
    let wo_id = undo["created_id"].as_str().expect("id").to_string();

    let actions = vec![
        Action::ProjectSetStar { project_id: "p1".into(), starred: true },
        Action::ProjectSetHidden { project_id: "p1".into(), hidden: true },
        Action::ProjectSetSuccess { project_id: "p1".into(), note: Some("shipped".into()) },
        Action::WorkOrderUpdate {
            workorder_id: wo_id.clone(),
            title: Some("after".into()),
            description: None,
        },
        Action::WorkOrderSetStatus {
            workorder_id: wo_id.clone(),
            status: WorkOrderStatus::Done,
        },
    ];

    for action in actions {
        let project_before = store.get_project("p1").expect("get").expect("row");
        let wo_before = store.get_work_order(&wo_id).expect("get").expect("row");

        let entry = store.apply_action(&ctx, &action).expect("apply");
        let undone = store.undo_action(&entry.id, "law check").expect("undo");

        assert_eq!(store.get_project("p1").expect("get").expect("row"), project_before);
        assert_eq!(store.get_work_order(&wo_id).expect("get").expect("row"), wo_before);
        assert!(undone.is_undone());
        assert_eq!(undone.payload_json, entry.payload_json);
        assert_eq!(undone.applied_at_ms, entry.applied_at_ms);
        assert!(
            store.get_ledger_entry(&entry.id).expect("get").is_some(),
            "undo never deletes"
        );
    }
}
