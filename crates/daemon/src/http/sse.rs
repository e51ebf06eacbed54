// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server-Sent Events off the in-process bus.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use sb_core::ThreadId;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// `GET /chat/stream?thread_id=` — bus events as SSE, optionally filtered to
/// one thread. A consumer that lags and drops events re-reads over HTTP;
/// lagging is silently skipped here.
pub async fn stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = query.thread_id.map(ThreadId::new);
    let rx = state.engine.bus().subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |event| {
        let filter = filter.clone();
        async move {
            let event = event.ok()?;
            if let Some(wanted) = &filter {
                if event.thread_id() != wanted {
                    return None;
                }
            }
            let data = serde_json::to_string(&event).ok()?;
            Some(Ok(Event::default().event(event.topic()).data(data)))
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
