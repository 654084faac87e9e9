// Copyright (c) 2026 Trellis Contributors. MIT License.
// See LICENSE for details.

//! # Trellis Node
//!
//! Entry point for the `trellis-node` binary. Parses CLI arguments,
//! initializes logging, seeds an in-memory ledger, and serves the
//! read-only explorer API.
//!
//! The binary supports four subcommands:
//!
//! - `serve`   — host the explorer API over a fresh (optionally seeded) ledger
//! - `demo`    — run the built-in demo scenario and print a summary
//! - `replay`  — replay a scenario file and print a summary
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::RwLock;

use trellis_ledger::config::LedgerConfig;
use trellis_ledger::curves::CurveRegistry;
use trellis_ledger::epochs::ManualEpochSource;
use trellis_ledger::multivault::MultiVault;
use trellis_ledger::wallets::HashWalletResolver;

use cli::{Commands, TrellisNodeCli};
use logging::LogFormat;
use scenario::{Scenario, ScenarioSummary};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = TrellisNodeCli::parse();

    match cli.command {
        Commands::Serve(args) => serve_node(args).await,
        Commands::Demo(args) => run_demo(args),
        Commands::Replay(args) => run_replay(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Builds a fresh ledger and the manual epoch source it reads.
///
/// The epoch source is returned separately because scenario files
/// advance it; the vault only ever observes it.
fn build_ledger(start_epoch: u64) -> Result<(MultiVault, Arc<ManualEpochSource>)> {
    let epochs = Arc::new(ManualEpochSource::starting_at(start_epoch));
    let vault = MultiVault::new(
        LedgerConfig::default(),
        CurveRegistry::standard(),
        epochs.clone(),
        Arc::new(HashWalletResolver::default()),
    )?;
    Ok((vault, epochs))
}

/// Starts the explorer API over an in-memory ledger, optionally seeded
/// from a scenario file.
async fn serve_node(args: cli::ServeArgs) -> Result<()> {
    logging::init_logging(
        "trellis_node=info,trellis_ledger=info,tower_http=debug",
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(port = args.port, epoch = args.epoch, "starting trellis-node");

    let (mut vault, epochs) = build_ledger(args.epoch)?;

    if let Some(path) = &args.scenario {
        let script = Scenario::load(path)?;
        let summary = scenario::run(&mut vault, &epochs, &script)
            .with_context(|| format!("applying scenario {}", path.display()))?;
        tracing::info!(
            scenario = %summary.scenario,
            steps = summary.steps_applied,
            terms = summary.terms,
            events = summary.events,
            "scenario applied"
        );
    }

    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: chrono::Utc::now(),
        ledger: Arc::new(RwLock::new(vault)),
    };

    let router = api::create_router(app_state);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", addr))?;
    tracing::info!("explorer API listening on {}", addr);

    tokio::select! {
        res = axum::serve(listener, router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("trellis-node stopped");
    Ok(())
}

/// Runs the built-in demo scenario against a fresh ledger.
fn run_demo(args: cli::DemoArgs) -> Result<()> {
    logging::init_logging("trellis_node=info,trellis_ledger=info", LogFormat::Pretty);

    let (mut vault, epochs) = build_ledger(0)?;
    let script = Scenario::demo(vault.config());
    let summary = scenario::run(&mut vault, &epochs, &script)?;
    print_outcome(&vault, &summary, args.events)
}

/// Replays a scenario file against a fresh ledger.
fn run_replay(args: cli::ReplayArgs) -> Result<()> {
    logging::init_logging("trellis_node=info,trellis_ledger=info", LogFormat::Pretty);

    let (mut vault, epochs) = build_ledger(0)?;
    let script = Scenario::load(&args.file)?;
    let summary = scenario::run(&mut vault, &epochs, &script)
        .with_context(|| format!("replaying {}", args.file.display()))?;
    print_outcome(&vault, &summary, args.events)
}

/// Prints a run summary (and optionally the full event log) to stdout
/// as JSON, keeping stderr free for logs.
fn print_outcome(vault: &MultiVault, summary: &ScenarioSummary, dump_events: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    if dump_events {
        println!("{}", serde_json::to_string_pretty(vault.events())?);
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("trellis-node {}", env!("CARGO_PKG_VERSION"));
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
