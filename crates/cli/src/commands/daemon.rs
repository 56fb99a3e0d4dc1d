// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj daemon` - Start, inspect and stop the project daemon

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Subcommand};
use sj_daemon::CallOptions;

use crate::client::{daemon_stop, ClientError, DaemonClient};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon in the background
    Start,
    /// Show whether the daemon is running
    Status,
    /// Stop the daemon
    Stop,
}

pub async fn handle(args: DaemonArgs, project_root: &Path, options: CallOptions) -> Result<()> {
    match args.command {
        DaemonCommand::Start => start(project_root, options).await,
        DaemonCommand::Status => status(project_root, options).await,
        DaemonCommand::Stop => {
            if daemon_stop(project_root).await? {
                println!("Daemon stopped");
            } else {
                println!("Daemon not running");
            }
            Ok(())
        }
    }
}

async fn start(project_root: &Path, options: CallOptions) -> Result<()> {
    if DaemonClient::connect(project_root, options).is_ok() {
        println!("Daemon already running");
        return Ok(());
    }
    let client = DaemonClient::connect_or_start(project_root, options).await?;
    println!(
        "Daemon started for {}",
        client.config().project_root.display()
    );
    Ok(())
}

async fn status(project_root: &Path, options: CallOptions) -> Result<()> {
    let client = match DaemonClient::connect(project_root, options) {
        Ok(client) => client,
        Err(ClientError::DaemonNotRunning) => {
            println!("Daemon not running");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let version = client.commands().hello().await?;
    let status = client.commands().status().await?;
    println!("Status: running");
    println!("Version: {}", version);
    println!("Uptime: {}", format_uptime(status.uptime));
    println!("Rules: {}", status.rules);
    println!("Actions: {}", status.actions);
    println!("Pending signals: {}", status.signals_pending);
    println!("Pending jobs: {}", status.jobs_pending);
    Ok(())
}

fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    match (secs / 3600, (secs % 3600) / 60, secs % 60) {
        (0, 0, s) => format!("{}s", s),
        (0, m, s) => format!("{}m {}s", m, s),
        (h, m, _) => format!("{}h {}m", h, m),
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
