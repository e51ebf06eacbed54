// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The runtime verdict on one shell command.

use sb_core::{AccessTriple, NetAccess};

use crate::extract::extract_targets;
use crate::host::{host_in_set, is_loopback};
use crate::netcmd::NetCommandTable;

/// Inspect `command` under `access`. Returns `None` when permitted, or a
/// human-readable denial reason. The caller aborts the run on `Some` — the
/// agent cannot be partially constrained after dispatch.
///
/// `trusted_pack` is the server-configured host set behind
/// `network=trusted`; loopback is always allowed.
pub fn enforce(command: &str, access: &AccessTriple, trusted_pack: &[String]) -> Option<String> {
    let targets = extract_targets(command, NetCommandTable::v1());
    if targets.is_empty() {
        return None;
    }

    for target in &targets {
        match &target.host {
            Some(host) if is_loopback(host) => continue,
            Some(host) => match access.network {
                NetAccess::None | NetAccess::Localhost => {
                    return Some(format!(
                        "network access to {host} is not permitted (network={}, command: {})",
                        access.network, target.display
                    ));
                }
                NetAccess::Allowlist => {
                    if !host_in_set(host, &access.network_allowlist) {
                        return Some(format!(
                            "host {host} is not on the allowlist (command: {})",
                            target.display
                        ));
                    }
                }
                NetAccess::Trusted => {
                    if !host_in_set(host, trusted_pack) {
                        return Some(format!(
                            "host {host} is not in the trusted pack (command: {})",
                            target.display
                        ));
                    }
                }
            },
            // No extractable host (a package manager reaching its registry).
            // There is nothing to match against a host set, so this only
            // passes when the command is loopback-bound — which it is not.
            None => {
                return Some(format!(
                    "{} reaches the network at an address that cannot be checked \
                     (network={})",
                    target.display, access.network
                ));
            }
        }
    }
    tracing::trace!(targets = targets.len(), "network targets permitted");
    None
}

#[cfg(test)]
#[path = "enforce_tests.rs"]
mod tests;
