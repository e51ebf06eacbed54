// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg(unix)]

use sb_core::{Role, Scope};
use sb_storage::messages::NewMessage;
use tempfile::TempDir;

use crate::test_helpers::{test_engine, write_stub_agent};
use crate::SUMMARY_CHUNK;

fn seed_messages(engine: &crate::Engine, thread: &sb_core::Thread, count: usize) {
    for i in 0..count {
        engine
            .store()
            .append_message(NewMessage {
                thread_id: &thread.id,
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                content: &format!("m{i}"),
                actions: &[],
                run_id: None,
                needs_user_input: false,
            })
            .unwrap();
    }
}

/// Stub that counts invocations in `calls.log` next to the chunk dirs.
fn counting_stub(tmp: &TempDir) -> std::path::PathBuf {
    write_stub_agent(
        tmp.path(),
        r#"echo run >> "$(dirname "$out")/../calls.log"
printf '%s' '{"summary":"rolled up"}' > "$out""#,
    )
}

#[tokio::test]
async fn folds_one_chunk_per_invocation_until_current() {
    // S5: 120 messages, none summarized → two invocations, count 100.
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    engine.config.agent_bin = counting_stub(&tmp);
    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    seed_messages(&engine, &thread, 120);

    engine.ensure_summary_current(&thread.id).await.unwrap();

    let updated = engine.store().get_thread(&thread.id).unwrap().unwrap();
    assert_eq!(updated.summarized_count, 100);
    assert_eq!(updated.summary, "rolled up");

    let calls = std::fs::read_to_string(
        engine.paths().summaries_dir(&thread.id).join("calls.log"),
    )
    .unwrap();
    assert_eq!(calls.lines().count(), 2);
}

#[tokio::test]
async fn a_current_thread_invokes_nothing() {
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    engine.config.agent_bin = counting_stub(&tmp);
    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    seed_messages(&engine, &thread, 49);

    engine.ensure_summary_current(&thread.id).await.unwrap();

    let updated = engine.store().get_thread(&thread.id).unwrap().unwrap();
    assert_eq!(updated.summarized_count, 0);
    assert!(!engine.paths().summaries_dir(&thread.id).join("calls.log").exists());
}

#[tokio::test]
async fn count_only_moves_in_chunk_multiples() {
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    engine.config.agent_bin = counting_stub(&tmp);
    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    seed_messages(&engine, &thread, 170);

    engine.ensure_summary_current(&thread.id).await.unwrap();

    let updated = engine.store().get_thread(&thread.id).unwrap().unwrap();
    assert_eq!(updated.summarized_count % SUMMARY_CHUNK, 0);
    assert_eq!(updated.summarized_count, 150);
}

#[tokio::test]
async fn a_failing_summarizer_surfaces_but_is_tolerated_by_the_turn_path() {
    let tmp = TempDir::new().unwrap();
    let mut engine = test_engine(&tmp);
    engine.config.agent_bin = write_stub_agent(tmp.path(), "exit 7");
    let thread = engine.ensure_thread(&Scope::global()).unwrap();
    seed_messages(&engine, &thread, 50);

    // The summarizer itself reports the failure...
    assert!(engine.ensure_summary_current(&thread.id).await.is_err());
    // ...and leaves the count untouched.
    let updated = engine.store().get_thread(&thread.id).unwrap().unwrap();
    assert_eq!(updated.summarized_count, 0);
}
