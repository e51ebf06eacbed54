// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the engine test modules.

use std::path::{Path, PathBuf};

use sb_storage::Store;
use tempfile::TempDir;

use crate::{Engine, EngineConfig, EventBus, WorkerLauncher};

/// Engine over an in-memory store, a temp portfolio, and no worker spawning.
pub(crate) fn test_engine(tmp: &TempDir) -> Engine {
    let store = Store::open_in_memory().unwrap();
    let config = EngineConfig::new(tmp.path());
    Engine::new(store, EventBus::new(), WorkerLauncher::disabled(), config)
}

/// Write an executable stub standing in for the agent CLI. The script body
/// sees `$out` bound to the `--output-last-message` path.
#[cfg(unix)]
pub(crate) fn write_stub_agent(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("stub-agent");
    let script = format!(
        "#!/bin/sh\nout=\"\"\nprev=\"\"\nfor a in \"$@\"; do\n  if [ \"$prev\" = \"--output-last-message\" ]; then out=\"$a\"; fi\n  prev=\"$a\"\ndone\ncat > /dev/null\n{body}\n"
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stub body that emits a fixed final reply.
#[cfg(unix)]
pub(crate) fn reply_body(reply_json: &str) -> String {
    format!(
        "echo '{{\"type\":\"turn.completed\",\"usage\":{{}}}}'\nprintf '%s' '{reply_json}' > \"$out\""
    )
}

/// Initialize a git repository for a project inside the portfolio.
pub(crate) fn init_project_repo(portfolio: &Path, project: &str) -> PathBuf {
    let repo = portfolio.join(project);
    std::fs::create_dir_all(&repo).unwrap();
    let git = |args: &[&str]| {
        let output = std::process::Command::new("git")
            .args(args)
            .current_dir(&repo)
            .output()
            .expect("spawn git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    };
    git(&["init", "-q", "--initial-branch=main"]);
    git(&["config", "user.name", "Test"]);
    git(&["config", "user.email", "test@localhost"]);
    std::fs::write(repo.join("README.md"), "hello\n").unwrap();
    git(&["add", "-A"]);
    git(&["commit", "-q", "-m", "init"]);
    repo
}
