// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj action <id>` - Show a registered action

use anyhow::{bail, Result};
use clap::Args;
use sj_core::{ActionDescriptor, ActionId};

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ActionArgs {
    /// Action id
    pub id: String,
}

pub async fn handle(client: &DaemonClient, args: ActionArgs, format: OutputFormat) -> Result<()> {
    let Some(action) = client
        .commands()
        .fetch_action(&ActionId::new(args.id.clone()))
        .await?
    else {
        bail!("no action registered as '{}'", args.id);
    };
    output::print(&action, format, print_text)?;
    Ok(())
}

fn print_text(action: &ActionDescriptor) {
    println!("Action: {}", action.id);
    if action.parameters.is_empty() {
        println!("  Parameters: none");
        return;
    }
    println!("  Parameters:");
    for param in &action.parameters {
        let required = if param.required { "required" } else { "optional" };
        match &param.description {
            Some(description) => println!("    {} ({}): {}", param.name, required, description),
            None => println!("    {} ({})", param.name, required),
        }
    }
}
