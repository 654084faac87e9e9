//! # CLI Interface
//!
//! Defines the command-line argument structure for `trellis-node` using
//! `clap` derive. Supports four subcommands: `serve`, `demo`, `replay`,
//! and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trellis ledger node.
///
/// Hosts an in-memory Trellis ledger behind a read-only explorer API,
/// and ships scenario tooling for seeding, demos, and deterministic
/// replays. All writes go through scenario files; the HTTP surface
/// never mutates state.
#[derive(Parser, Debug)]
#[command(
    name = "trellis-node",
    about = "Trellis ledger node and explorer",
    version,
    propagate_version = true
)]
pub struct TrellisNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the trellis-node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the explorer API over a fresh in-memory ledger.
    Serve(ServeArgs),
    /// Run the built-in demo scenario and print a summary.
    Demo(DemoArgs),
    /// Replay a scenario file against a fresh ledger and print a summary.
    Replay(ReplayArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port for the explorer HTTP API.
    #[arg(long, env = "TRELLIS_PORT", default_value_t = 8741)]
    pub port: u16,

    /// Scenario file (JSON) applied to the fresh ledger before serving.
    ///
    /// When omitted, the node serves an empty ledger.
    #[arg(long, short = 's', env = "TRELLIS_SCENARIO")]
    pub scenario: Option<PathBuf>,

    /// Epoch the ledger starts in.
    #[arg(long, env = "TRELLIS_EPOCH", default_value_t = 0)]
    pub epoch: u64,

    /// Log output format: pretty (human-readable) or json (structured).
    #[arg(long, env = "TRELLIS_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `demo` subcommand.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Dump the full event log as JSON after the summary.
    #[arg(long)]
    pub events: bool,
}

/// Arguments for the `replay` subcommand.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Path to the scenario JSON file.
    pub file: PathBuf,

    /// Dump the full event log as JSON after the summary.
    #[arg(long)]
    pub events: bool,
}
