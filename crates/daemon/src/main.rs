// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sbd` — the Switchboard server.

use anyhow::Context;
use clap::Parser;
use sb_daemon::config::ServerConfig;
use sb_daemon::http::{router, AppState};
use sb_daemon::lifecycle;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sbd", about = "Switchboard agent control-plane server")]
struct Args {
    /// Portfolio root (overrides SB_PORTFOLIO).
    #[arg(long)]
    portfolio: Option<std::path::PathBuf>,

    /// Bind port (overrides SB_PORT).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(portfolio) = &args.portfolio {
        // Resolved before ServerConfig::from_env reads it.
        std::env::set_var("SB_PORTFOLIO", portfolio);
    }
    if let Some(port) = args.port {
        std::env::set_var("SB_PORT", port.to_string());
    }

    let config = ServerConfig::from_env();

    let log_dir = config.portfolio.join(".system");
    std::fs::create_dir_all(&log_dir).context("create state dir")?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "sbd.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let startup = lifecycle::startup(&config).context("startup")?;
    tracing::info!(portfolio = %config.portfolio.display(), "server state ready");

    let state = AppState {
        engine: startup.engine,
        cors_allow: config.cors_allow.clone(),
    };
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "listening");
    eprintln!("sbd listening on http://{addr}");

    axum::serve(listener, app).await.context("serve")?;
    drop(startup.lock_file);
    Ok(())
}
