// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The loopback HTTP/JSON surface.

mod error;
mod sse;
mod types;

pub use error::{ApiError, ErrorBody};
pub use types::*;

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use sb_core::{LedgerEntry, PendingSendId, ThreadId};
use sb_engine::{ApplyRequest, Engine, SubmitOutcome, SubmitRequest, Suggestion};

#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub cors_allow: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat/threads", get(list_threads).post(create_thread))
        .route("/chat/threads/{id}", get(thread_detail).patch(patch_thread))
        .route("/chat/threads/{id}/messages", post(post_message))
        .route("/chat/threads/{id}/suggestions", post(post_suggestion))
        .route(
            "/chat/threads/{id}/pending-sends/{pid}/cancel",
            post(cancel_pending),
        )
        .route("/chat/threads/{id}/worktree/diff", get(worktree_diff))
        .route("/chat/runs/{id}", get(run_detail))
        .route("/chat/stream", get(sse::stream))
        .route("/chat/actions/apply", post(apply_action))
        .route("/chat/actions/{id}/undo", post(undo_action))
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .with_state(state)
}

/// Manual CORS from the configured origin allowlist. Loopback UIs served
/// from another port are the expected consumer; everything else gets no
/// headers and the browser refuses.
async fn cors(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: middleware::Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let allowed = origin
        .as_ref()
        .filter(|o| state.cors_allow.iter().any(|a| a == *o))
        .cloned();

    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(&mut response, allowed.as_deref());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(&mut response, allowed.as_deref());
    response
}

fn apply_cors_headers(response: &mut Response, origin: Option<&str>) {
    let Some(origin) = origin else { return };
    let Ok(value) = HeaderValue::from_str(origin) else { return };
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PATCH, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
}

async fn list_threads(
    State(state): State<AppState>,
) -> Result<Json<Vec<ThreadSummary>>, ApiError> {
    let threads = state.engine.store().list_threads(false).map_err(engine_err)?;
    let mut summaries = Vec::with_capacity(threads.len());
    for thread in threads {
        let needs_attention = state.engine.needs_attention(&thread.id)?;
        summaries.push(ThreadSummary { thread, needs_attention });
    }
    Ok(Json(summaries))
}

async fn create_thread(
    State(state): State<AppState>,
    Json(body): Json<CreateThread>,
) -> Result<(StatusCode, Json<ThreadSummary>), ApiError> {
    let thread = state.engine.ensure_thread(&body.scope)?;
    if let Some(name) = &body.name {
        state.engine.store().rename_thread(&thread.id, name).map_err(engine_err)?;
    }
    if body.access.is_some() || body.context_depth.is_some() {
        let access = body.access.unwrap_or_else(|| thread.default_access.clone());
        let depth = body.context_depth.unwrap_or(thread.default_context_depth);
        sb_policy_check(&state.engine, &access)?;
        state
            .engine
            .store()
            .set_thread_defaults(&thread.id, &access, depth)
            .map_err(engine_err)?;
    }
    let thread = state
        .engine
        .store()
        .get_thread(&thread.id)
        .map_err(engine_err)?
        .ok_or_else(|| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "thread vanished"))?;
    Ok((
        StatusCode::CREATED,
        Json(ThreadSummary { needs_attention: false, thread }),
    ))
}

async fn thread_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ThreadDetail>, ApiError> {
    let id = ThreadId::new(id);
    let thread = state
        .engine
        .store()
        .get_thread(&id)
        .map_err(engine_err)?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("thread not found: {id}")))?;
    let messages = state.engine.store().list_messages(&id).map_err(engine_err)?;
    let ledger = state.engine.store().list_ledger(&id).map_err(engine_err)?;
    let pending_sends = state.engine.store().list_open_pending(&id).map_err(engine_err)?;
    let needs_attention = state.engine.needs_attention(&id)?;
    // Reading the full detail acknowledges the thread.
    state
        .engine
        .store()
        .ack_thread(&id, sb_core::epoch_ms_now())
        .map_err(engine_err)?;
    Ok(Json(ThreadDetail { thread, needs_attention, messages, ledger, pending_sends }))
}

async fn patch_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PatchThread>,
) -> Result<Json<ThreadSummary>, ApiError> {
    let id = ThreadId::new(id);
    let thread = state
        .engine
        .store()
        .get_thread(&id)
        .map_err(engine_err)?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("thread not found: {id}")))?;

    if let Some(name) = &body.name {
        state.engine.store().rename_thread(&id, name).map_err(engine_err)?;
    }
    if let Some(scope) = &body.scope {
        // Thread ids are scope-derived; a rescope that would change the id
        // is a different thread, not an edit of this one.
        scope
            .validate()
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
        if scope.thread_id() != id {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "rescope would change the thread identity; create a new thread instead",
            ));
        }
    }
    if body.access.is_some() || body.context_depth.is_some() {
        let access = body.access.unwrap_or_else(|| thread.default_access.clone());
        let depth = body.context_depth.unwrap_or(thread.default_context_depth);
        sb_policy_check(&state.engine, &access)?;
        state
            .engine
            .store()
            .set_thread_defaults(&id, &access, depth)
            .map_err(engine_err)?;
    }
    if body.archived == Some(true) {
        state.engine.archive_thread(&id).await?;
    } else if body.archived == Some(false) {
        state.engine.store().set_thread_archived(&id, false).map_err(engine_err)?;
    }

    let thread = state
        .engine
        .store()
        .get_thread(&id)
        .map_err(engine_err)?
        .ok_or_else(|| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "thread vanished"))?;
    let needs_attention = state.engine.needs_attention(&id)?;
    Ok(Json(ThreadSummary { thread, needs_attention }))
}

async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PostMessage>,
) -> Result<(StatusCode, Json<EnqueuedResponse>), ApiError> {
    let id = ThreadId::new(id);
    let outcome = state.engine.submit_message(&id, SubmitRequest {
        content: body.content,
        access: body.access,
        context_depth: body.context_depth,
        confirmations: body.confirmations,
    })?;
    match outcome {
        SubmitOutcome::Enqueued { run, message, resolved } => Ok((
            StatusCode::CREATED,
            Json(EnqueuedResponse { message, run, resolved_pending: resolved }),
        )),
        SubmitOutcome::PendingApproval { id, requires } => {
            Err(ApiError::approval_required(&id, requires))
        }
    }
}

async fn post_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PostSuggestion>,
) -> Result<Json<Suggestion>, ApiError> {
    let id = ThreadId::new(id);
    Ok(Json(state.engine.suggest(&id, &body.content).await?))
}

async fn cancel_pending(
    State(state): State<AppState>,
    Path((_id, pid)): Path<(String, String)>,
) -> Result<Json<CanceledResponse>, ApiError> {
    state.engine.cancel_pending(&PendingSendId::new(pid))?;
    Ok(Json(CanceledResponse { canceled: true }))
}

async fn worktree_diff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DiffResponse>, ApiError> {
    let diff = state.engine.worktree_diff(&ThreadId::new(id)).await?;
    Ok(Json(DiffResponse { diff }))
}

async fn run_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RunDetail>, ApiError> {
    let id = sb_core::RunId::new(id);
    let run = state
        .engine
        .store()
        .get_run(&id)
        .map_err(engine_err)?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("run not found: {id}")))?;
    let commands = state.engine.store().list_commands(&id).map_err(engine_err)?;
    let log_tail = read_tail(&run.log_path).await;
    Ok(Json(RunDetail { run, commands, log_tail }))
}

async fn apply_action(
    State(state): State<AppState>,
    Json(body): Json<ApplyActionBody>,
) -> Result<Json<LedgerEntry>, ApiError> {
    let entry = state
        .engine
        .apply_action(ApplyRequest {
            thread_id: body.thread_id,
            run_id: body.run_id,
            message_id: body.message_id,
            action_index: body.action_index,
            action: body.action,
        })
        .await?;
    Ok(Json(entry))
}

async fn undo_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UndoBody>,
) -> Result<Json<LedgerEntry>, ApiError> {
    let reason = body.reason.unwrap_or_else(|| "undone by user".to_string());
    let entry = state
        .engine
        .undo_action(&sb_core::LedgerId::new(id), &reason)?;
    Ok(Json(entry))
}

fn engine_err(err: sb_storage::StoreError) -> ApiError {
    sb_engine::EngineError::from(err).into()
}

fn sb_policy_check(engine: &Engine, access: &sb_core::AccessTriple) -> Result<(), ApiError> {
    sb_policy::check_access(access, engine.config().has_trusted_pack())
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))
}

async fn read_tail(path: &std::path::Path) -> Option<String> {
    use tokio::io::{AsyncReadExt, AsyncSeekExt};

    const TAIL: u64 = 8 * 1024;
    let mut file = tokio::fs::File::open(path).await.ok()?;
    let len = file.metadata().await.ok()?.len();
    file.seek(std::io::SeekFrom::Start(len.saturating_sub(TAIL))).await.ok()?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).await.ok()?;
    Some(String::from_utf8_lossy(&buf).into_owned())
}
