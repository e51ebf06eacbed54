// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sb-worker` — one detached worker, one run.
//!
//! Claims the run, executes the turn, chains the next queued run, exits.
//! Deliberately independent of the server process: it opens the store
//! itself and spawns successors via its own executable.

use anyhow::Context;
use clap::Parser;
use sb_core::RunId;
use sb_engine::{ChatPaths, Engine, EventBus, WorkerLaunch, WorkerLauncher};
use sb_storage::Store;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sb-worker", about = "Switchboard run worker")]
struct Args {
    /// The run to claim and execute.
    #[arg(long)]
    run_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config = sb_daemon::config::ServerConfig::from_env();
    let paths = ChatPaths::new(&config.portfolio);
    let store = Store::open(&paths.db_path()).context("open store")?;

    // Successors are spawned from this very binary; the chain needs no
    // server and no discovery.
    let launch = std::env::current_exe()
        .map(WorkerLaunch::Binary)
        .unwrap_or(WorkerLaunch::Disabled);
    let launcher = WorkerLauncher::new(launch, config.worker_envs());

    let engine = Engine::new(store, EventBus::new(), launcher, config.engine_config());
    let run_id = RunId::new(args.run_id);
    engine
        .run_turn(&run_id)
        .await
        .with_context(|| format!("run {run_id}"))?;
    Ok(())
}
