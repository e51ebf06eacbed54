//! Shared fixtures for the spec suite.

use std::path::{Path, PathBuf};

use sb_engine::{Engine, EngineConfig, EventBus, WorkerLauncher};
use sb_storage::Store;
use tempfile::TempDir;

/// Engine over an in-memory store and a temp portfolio, with no worker
/// spawning; specs drive turns in-process.
pub fn engine_with_agent(tmp: &TempDir, agent_bin: PathBuf) -> Engine {
    let store = Store::open_in_memory().expect("open store");
    let mut config = EngineConfig::new(tmp.path());
    config.agent_bin = agent_bin;
    Engine::new(store, EventBus::new(), WorkerLauncher::disabled(), config)
}

pub fn engine(tmp: &TempDir) -> Engine {
    engine_with_agent(tmp, PathBuf::from("codex"))
}

/// Executable stub standing in for the agent CLI; `$out` is bound to the
/// `--output-last-message` path inside `body`.
#[cfg(unix)]
pub fn write_stub_agent(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("stub-agent");
    let script = format!(
        "#!/bin/sh\nout=\"\"\nprev=\"\"\nfor a in \"$@\"; do\n  if [ \"$prev\" = \"--output-last-message\" ]; then out=\"$a\"; fi\n  prev=\"$a\"\ndone\ncat > /dev/null\n{body}\n"
    );
    std::fs::write(&path, script).expect("write stub");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod stub");
    path
}

/// Stub body emitting a fixed, contract-valid reply.
#[cfg(unix)]
pub fn reply_body(reply_json: &str) -> String {
    format!(
        "echo '{{\"type\":\"turn.completed\",\"usage\":{{}}}}'\nprintf '%s' '{reply_json}' > \"$out\""
    )
}

/// Initialize a project git repository inside the portfolio.
pub fn init_project_repo(portfolio: &Path, project: &str) -> PathBuf {
    let repo = portfolio.join(project);
    std::fs::create_dir_all(&repo).expect("mkdir repo");
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
    std::fs::write(repo.join("README.md"), "hello\n").expect("seed file");
    git(&["add", "-A"]);
    git(&["commit", "-q", "-m", "init"]);
    repo
}

pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn git");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
