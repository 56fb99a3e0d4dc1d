// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj info` - Show daemon application info

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let info = client.commands().app_info().await?;
    output::print(&info, format, |info| {
        println!("{} {}", info.name, info.version);
        println!("  Project: {}", info.project_root);
        println!("  Rules: {}", info.rules_dir);
        let actions: Vec<&str> = info.actions.iter().map(|a| a.as_str()).collect();
        println!("  Actions: {}", actions.join(", "));
    })?;
    Ok(())
}
