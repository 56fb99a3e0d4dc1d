// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sj - Signal Jobs CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{action, daemon, emit, info, rules};
use sj_daemon::CallOptions;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{find_project_root, DaemonClient};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "sj",
    version,
    about = "Signal Jobs - rules that turn signals into jobs"
)]
struct Cli {
    /// Project root directory
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Attempts per daemon command [env: SJ_RETRY_COUNT, default 3]
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Timeout per attempt in milliseconds [env: SJ_TIMEOUT_MS, default 500]
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a signal
    Emit(emit::EmitArgs),
    /// Show a registered action
    Action(action::ActionArgs),
    /// Show the rules for a signal type
    Rules(rules::RulesArgs),
    /// Show daemon application info
    Info,
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut options = CallOptions::from_env();
    if let Some(retries) = cli.retries {
        options = options.with_retry_count(retries);
    }
    if let Some(ms) = cli.timeout_ms {
        options = options.with_timeout(Duration::from_millis(ms));
    }
    let project_root = cli.project.map_or_else(find_project_root, Ok)?;

    // Daemon management works whether or not the daemon is up
    if let Commands::Daemon(args) = cli.command {
        return daemon::handle(args, &project_root, options).await;
    }

    let client = DaemonClient::connect(&project_root, options)?;
    match cli.command {
        Commands::Emit(args) => emit::handle(&client, args).await,
        Commands::Action(args) => action::handle(&client, args, cli.output).await,
        Commands::Rules(args) => rules::handle(&client, args, cli.output).await,
        Commands::Info => info::handle(&client, cli.output).await,
        Commands::Daemon(_) => Ok(()),
    }
}

/// Diagnostics go to stderr; quiet unless RUST_LOG asks for more
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
