// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sj emit <sensor> [key=value ...]` - Publish a signal

use anyhow::Result;
use clap::Args;
use sj_core::{Parameters, SignalTypeId};

use crate::client::DaemonClient;

#[derive(Args)]
pub struct EmitArgs {
    /// Signal type, e.g. `build.completed`
    pub sensor: String,

    /// Signal parameters as key=value pairs
    #[arg(value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

pub async fn handle(client: &DaemonClient, args: EmitArgs) -> Result<()> {
    let parameters: Parameters = args.params.into_iter().collect();
    let id = client
        .commands()
        .emit(SignalTypeId::new(args.sensor.clone()), parameters)
        .await?;

    match id {
        Some(id) => println!("Emitted {} (record {})", args.sensor, id),
        None => println!("Emitted {} (duplicate, already stored)", args.sensor),
    }
    Ok(())
}

/// Parse a `key=value` argument; the value may itself contain `=`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

#[cfg(test)]
#[path = "emit_tests.rs"]
mod tests;
