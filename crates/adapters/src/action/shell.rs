// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script execution action

use async_trait::async_trait;
use sj_core::{ActionError, ActionHandler, Job};
use std::path::PathBuf;
use tokio::process::Command;

/// Runs a shell command with the job's parameters in its environment
///
/// Every parameter is exported as `SJ_PARAM_<NAME>`. A non-zero exit status
/// fails the job.
#[derive(Debug, Clone)]
pub struct ShellAction {
    command: String,
    cwd: Option<PathBuf>,
}

impl ShellAction {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

/// Environment variable a parameter is exported as
pub fn env_var_name(parameter: &str) -> String {
    let name: String = parameter
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("SJ_PARAM_{}", name)
}

#[async_trait]
impl ActionHandler for ShellAction {
    async fn invoke(&self, job: &Job) -> Result<(), ActionError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.command);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd.env("SJ_ACTION", job.action().as_str());
        for (name, value) in job.parameters() {
            cmd.env(env_var_name(name), value.to_string());
        }

        let output = cmd.output().await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let status = match output.status.code() {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        };
        Err(ActionError::Failed(format!("{}: {}", status, stderr.trim())))
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
