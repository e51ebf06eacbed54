// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time as the store records it: milliseconds since the unix epoch.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, saturating at zero on clock skew.
pub fn epoch_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
