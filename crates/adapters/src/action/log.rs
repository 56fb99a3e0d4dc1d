// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use sj_core::{ActionError, ActionHandler, Job};

/// Id the built-in log action is registered under
pub const LOG_ACTION_ID: &str = "log";

/// Records each job it receives in the log and succeeds
#[derive(Debug, Clone, Default)]
pub struct LogAction;

#[async_trait]
impl ActionHandler for LogAction {
    async fn invoke(&self, job: &Job) -> Result<(), ActionError> {
        let parameters: Vec<String> = job
            .parameters()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        tracing::info!(action = %job.action(), parameters = ?parameters, "job received");
        Ok(())
    }
}
