// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pinned table of network-capable commands.
//!
//! Which package-manager subcommands touch the network is a heuristic, so it
//! lives here behind a versioned constructor instead of being scattered
//! through the extractor. Revisions add a new constructor; callers pick one.

/// URL schemes the extractor recognizes.
pub(crate) const URL_SCHEMES: &[&str] = &["http", "https", "ws", "wss", "ftp", "ssh"];

pub struct NetCommandTable {
    /// Commands whose first non-option argument is a network target.
    pub direct: &'static [&'static str],
    /// git subcommands that reach a remote.
    pub git_network: &'static [&'static str],
    /// Package managers with split subcommand sets.
    pub package_managers: &'static [PackageManager],
}

pub struct PackageManager {
    pub name: &'static str,
    /// Subcommands that reach the network.
    pub network: &'static [&'static str],
    /// Subcommands known to stay local. Anything not in either set is
    /// treated as local; the sandbox is the backstop for the long tail.
    pub local: &'static [&'static str],
}

impl NetCommandTable {
    /// Revision 1 of the table.
    pub fn v1() -> &'static Self {
        &V1
    }
}

static V1: NetCommandTable = NetCommandTable {
    direct: &["curl", "wget", "ssh", "scp", "sftp", "rsync", "nc", "telnet", "ftp"],
    git_network: &[
        "clone", "fetch", "pull", "push", "ls-remote", "remote", "submodule", "archive",
    ],
    package_managers: &[
        PackageManager {
            name: "npm",
            network: &["install", "i", "ci", "update", "audit", "publish", "outdated", "view"],
            local: &["run", "test", "start", "stop", "exec", "ls", "link", "pack", "version"],
        },
        PackageManager {
            name: "pnpm",
            network: &["install", "i", "add", "update", "audit", "publish", "outdated"],
            local: &["run", "test", "start", "exec", "list"],
        },
        PackageManager {
            name: "yarn",
            network: &["install", "add", "upgrade", "audit", "publish", "outdated"],
            local: &["run", "test", "start", "workspaces", "list"],
        },
        PackageManager {
            name: "pip",
            network: &["install", "download", "search", "index"],
            local: &["list", "show", "freeze", "uninstall", "check"],
        },
        PackageManager {
            name: "pip3",
            network: &["install", "download", "search", "index"],
            local: &["list", "show", "freeze", "uninstall", "check"],
        },
        PackageManager {
            name: "cargo",
            network: &["install", "update", "fetch", "publish", "add", "search"],
            local: &["build", "check", "test", "run", "clippy", "fmt", "doc", "clean", "tree"],
        },
        PackageManager {
            name: "go",
            network: &["get", "install", "download"],
            local: &["build", "test", "run", "vet", "fmt", "mod"],
        },
        PackageManager {
            name: "gem",
            network: &["install", "update", "push", "fetch", "search"],
            local: &["list", "uninstall", "build"],
        },
        PackageManager {
            name: "brew",
            network: &["install", "update", "upgrade", "fetch", "search"],
            local: &["list", "uninstall", "services", "info"],
        },
        PackageManager {
            name: "apt-get",
            network: &["install", "update", "upgrade", "dist-upgrade", "source"],
            local: &["remove", "purge", "autoremove", "clean"],
        },
        PackageManager {
            name: "apt",
            network: &["install", "update", "upgrade", "full-upgrade", "source"],
            local: &["remove", "purge", "autoremove", "list", "show"],
        },
        PackageManager {
            name: "composer",
            network: &["install", "update", "require", "create-project", "outdated"],
            local: &["run-script", "dump-autoload", "show", "validate"],
        },
    ],
};

impl NetCommandTable {
    pub fn is_direct(&self, command: &str) -> bool {
        self.direct.contains(&command)
    }

    pub fn package_manager(&self, command: &str) -> Option<&PackageManager> {
        self.package_managers.iter().find(|pm| pm.name == command)
    }
}

impl PackageManager {
    pub fn is_network_subcommand(&self, sub: &str) -> bool {
        self.network.contains(&sub)
    }
}
