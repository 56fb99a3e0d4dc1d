// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj rules <sensor>` - Show the rules that react to a signal type

use anyhow::Result;
use clap::Args;
use sj_core::SignalTypeId;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct RulesArgs {
    /// Signal type, e.g. `build.completed`
    pub sensor: String,
}

pub async fn handle(client: &DaemonClient, args: RulesArgs, format: OutputFormat) -> Result<()> {
    let sensor = SignalTypeId::new(args.sensor);
    let Some(rules) = client.commands().fetch_rules(&sensor).await? else {
        println!("No rules for {}", sensor);
        return Ok(());
    };

    output::print(&rules, format, |rules| {
        for rule in rules {
            let state = if rule.enabled { "" } else { " (disabled)" };
            println!("{}{} -> {}", rule.name, state, rule.action.id);
            if !rule.description.is_empty() {
                println!("  {}", rule.description);
            }
            for (name, value) in &rule.signal.parameters {
                println!("  where {} = {}", name, value);
            }
            for condition in &rule.conditions {
                println!(
                    "  when {} {} {}",
                    condition.parameter, condition.kind, condition.value
                );
            }
            for (name, template) in &rule.action.parameters {
                println!("  with {} = {}", name, template);
            }
        }
    })?;
    Ok(())
}
