// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `(filesystem, cli, network)` access triple granted to a run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filesystem access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FsAccess {
    None,
    ReadOnly,
    ReadWrite,
}

crate::simple_display! {
    FsAccess {
        None => "none",
        ReadOnly => "read-only",
        ReadWrite => "read-write",
    }
}

/// Shell/CLI access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CliAccess {
    Off,
    ReadOnly,
    ReadWrite,
}

crate::simple_display! {
    CliAccess {
        Off => "off",
        ReadOnly => "read-only",
        ReadWrite => "read-write",
    }
}

/// Network access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetAccess {
    None,
    Localhost,
    Allowlist,
    Trusted,
}

crate::simple_display! {
    NetAccess {
        None => "none",
        Localhost => "localhost",
        Allowlist => "allowlist",
        Trusted => "trusted",
    }
}

/// Sandbox mode handed to the agent driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxMode {
    ReadOnly,
    WorkspaceWrite,
}

crate::simple_display! {
    SandboxMode {
        ReadOnly => "read-only",
        WorkspaceWrite => "workspace-write",
    }
}

/// Failed to parse a stored access level back into its enum.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {axis} access level: {value}")]
pub struct AccessError {
    pub axis: &'static str,
    pub value: String,
}

impl std::str::FromStr for FsAccess {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "read-only" => Ok(Self::ReadOnly),
            "read-write" => Ok(Self::ReadWrite),
            other => Err(AccessError { axis: "filesystem", value: other.to_string() }),
        }
    }
}

impl std::str::FromStr for CliAccess {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "read-only" => Ok(Self::ReadOnly),
            "read-write" => Ok(Self::ReadWrite),
            other => Err(AccessError { axis: "cli", value: other.to_string() }),
        }
    }
}

impl std::str::FromStr for NetAccess {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "localhost" => Ok(Self::Localhost),
            "allowlist" => Ok(Self::Allowlist),
            "trusted" => Ok(Self::Trusted),
            other => Err(AccessError { axis: "network", value: other.to_string() }),
        }
    }
}

/// The full permission vector for a run, with the host allowlist that
/// backs `NetAccess::Allowlist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTriple {
    pub filesystem: FsAccess,
    pub cli: CliAccess,
    pub network: NetAccess,
    #[serde(default)]
    pub network_allowlist: Vec<String>,
}

impl Default for AccessTriple {
    /// The conservative default: read-only filesystem, no shell, no network.
    fn default() -> Self {
        Self {
            filesystem: FsAccess::ReadOnly,
            cli: CliAccess::Off,
            network: NetAccess::None,
            network_allowlist: Vec::new(),
        }
    }
}

impl AccessTriple {
    /// Sandbox mode derived for the agent driver: `workspace-write` when
    /// either filesystem or cli is read-write, else `read-only`.
    pub fn sandbox_mode(&self) -> SandboxMode {
        if self.filesystem == FsAccess::ReadWrite || self.cli == CliAccess::ReadWrite {
            SandboxMode::WorkspaceWrite
        } else {
            SandboxMode::ReadOnly
        }
    }

    /// Whether this triple grants any write capability.
    pub fn grants_write(&self) -> bool {
        self.filesystem == FsAccess::ReadWrite || self.cli == CliAccess::ReadWrite
    }

    /// Whether this triple reaches beyond loopback (allowlist or trusted pack).
    pub fn grants_network(&self) -> bool {
        matches!(self.network, NetAccess::Allowlist | NetAccess::Trusted)
    }

    /// One-line human summary used in prompts and logs.
    pub fn summary(&self) -> String {
        let mut s = format!(
            "filesystem={} cli={} network={}",
            self.filesystem, self.cli, self.network
        );
        if self.network == NetAccess::Allowlist && !self.network_allowlist.is_empty() {
            s.push_str(&format!(" allowlist=[{}]", self.network_allowlist.join(", ")));
        }
        s
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
