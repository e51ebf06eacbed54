// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error body shape and the engine-error → HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sb_core::{PendingSendId, Requires};
use sb_engine::EngineError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody { error: error.into(), code: None, details: None },
        }
    }

    /// The 409 pending-approval shape: which confirmations are missing and
    /// the pending row to confirm or cancel.
    pub fn approval_required(id: &PendingSendId, requires: Requires) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            body: ErrorBody {
                error: "approval required".to_string(),
                code: Some("approval_required".to_string()),
                details: Some(serde_json::json!({
                    "pending_send_id": id,
                    "requires": {
                        "write": requires.write,
                        "network_allowlist": requires.network_allowlist,
                    }
                })),
            },
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let kind = err.kind();
        let status =
            StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
                code: Some(kind.to_string()),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
