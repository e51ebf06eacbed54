//! S5 — 120 messages yield exactly two summarizer invocations and a
//! summarized count of 100.

#![cfg(unix)]

use sb_core::{Role, Scope};
use sb_engine::SUMMARY_CHUNK;
use sb_storage::messages::NewMessage;
use tempfile::TempDir;

use super::prelude::*;

#[tokio::test]
async fn one_hundred_twenty_messages_fold_two_chunks() {
    let tmp = TempDir::new().expect("tmp");
    let stub = write_stub_agent(
        tmp.path(),
        r#"echo run >> "$(dirname "$out")/../calls.log"
printf '%s' '{"summary":"compact history"}' > "$out""#,
    );
    let engine = engine_with_agent(&tmp, stub);
    let thread = engine.ensure_thread(&Scope::global()).expect("thread");

    for i in 0..120 {
        engine
            .store()
            .append_message(NewMessage {
                thread_id: &thread.id,
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                content: &format!("message {i}"),
                actions: &[],
                run_id: None,
                needs_user_input: false,
            })
            .expect("insert");
    }

    engine.ensure_summary_current(&thread.id).await.expect("summarize");

    let updated = engine.store().get_thread(&thread.id).expect("get").expect("thread");
    assert_eq!(updated.summarized_count, 100);
    assert_eq!(updated.summarized_count % SUMMARY_CHUNK, 0);
    assert_eq!(updated.summary, "compact history");

    let calls = std::fs::read_to_string(
        engine.paths().summaries_dir(&thread.id).join("calls.log"),
    )
    .expect("calls log");
    assert_eq!(calls.lines().count(), 2, "one invocation per 50-message chunk");

    // The third chunk (101..150) is not due until message 150 exists.
    engine.ensure_summary_current(&thread.id).await.expect("summarize");
    let calls = std::fs::read_to_string(
        engine.paths().summaries_dir(&thread.id).join("calls.log"),
    )
    .expect("calls log");
    assert_eq!(calls.lines().count(), 2);
}
