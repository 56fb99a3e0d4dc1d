// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process management for CLI commands

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use sj_daemon::{CallOptions, CommandClient, CommandError, Config, ConfigError, UnixTransport};
use thiserror::Error;

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for waiting for daemon to start
pub fn timeout_connect() -> Duration {
    parse_duration_ms("SJ_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for waiting for process to exit
pub fn timeout_exit() -> Duration {
    parse_duration_ms("SJ_TIMEOUT_EXIT_MS").unwrap_or(Duration::from_secs(2))
}

/// Polling interval for retries
pub fn poll_interval() -> Duration {
    parse_duration_ms("SJ_POLL_INTERVAL_MS").unwrap_or(Duration::from_millis(50))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Daemon not running (start it with `sj daemon start`)")]
    DaemonNotRunning,

    #[error("Failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("Connection timeout waiting for daemon to start")]
    DaemonStartTimeout,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine project root")]
    NoProjectRoot,
}

/// A connection to one project's daemon
pub struct DaemonClient {
    config: Config,
    commands: CommandClient<UnixTransport>,
}

impl DaemonClient {
    /// Connect to existing daemon (no auto-start)
    pub fn connect(project_root: &Path, options: CallOptions) -> Result<Self, ClientError> {
        let config = Config::for_project(project_root)?;
        if !config.socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        let commands = CommandClient::connect(&config.socket_path, options);
        Ok(Self { config, commands })
    }

    /// Connect to daemon, starting it in the background if needed
    pub async fn connect_or_start(
        project_root: &Path,
        options: CallOptions,
    ) -> Result<Self, ClientError> {
        match Self::connect(project_root, options) {
            Ok(client) => Ok(client),
            Err(ClientError::DaemonNotRunning) => {
                let config = Config::for_project(project_root)?;
                let child = start_daemon_background(&config.project_root)?;
                Self::connect_with_retry(&config, options, timeout_connect(), child).await
            }
            Err(e) => Err(e),
        }
    }

    async fn connect_with_retry(
        config: &Config,
        options: CallOptions,
        timeout: Duration,
        mut child: std::process::Child,
    ) -> Result<Self, ClientError> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            // Check if daemon process exited early (startup failure)
            if let Ok(Some(status)) = child.try_wait() {
                // Poll for startup error in log (filesystem may need to sync)
                let poll_start = Instant::now();
                while poll_start.elapsed() < timeout_exit() {
                    if let Some(err) = read_startup_error(config) {
                        return Err(ClientError::DaemonStartFailed(err));
                    }
                    tokio::time::sleep(poll_interval()).await;
                }
                return Err(ClientError::DaemonStartFailed(format!(
                    "exited with {}",
                    status
                )));
            }

            if let Ok(client) = Self::connect(&config.project_root, options) {
                // The socket file appears before the accept loop runs
                if client.commands.ping().await.is_ok() {
                    return Ok(client);
                }
            }
            tokio::time::sleep(poll_interval()).await;
        }

        // Timeout - check log for startup errors
        Err(wrap_with_startup_error(
            ClientError::DaemonStartTimeout,
            config,
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn commands(&self) -> &CommandClient<UnixTransport> {
        &self.commands
    }
}

/// Start the daemon in the background, returning the child process handle
fn start_daemon_background(project_root: &Path) -> Result<std::process::Child, ClientError> {
    let sjd_path = find_sjd_binary();
    tracing::debug!(
        binary = %sjd_path.display(),
        root = %project_root.display(),
        "starting daemon"
    );

    Command::new(&sjd_path)
        .arg(project_root)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(format!("{}: {}", sjd_path.display(), e)))
}

/// Stop the daemon (graceful first, then forceful)
/// Returns true if daemon was stopped, false if it wasn't running
pub async fn daemon_stop(project_root: &Path) -> Result<bool, ClientError> {
    let client = match DaemonClient::connect(project_root, CallOptions::from_env()) {
        Ok(c) => c,
        Err(ClientError::DaemonNotRunning) => return Ok(false),
        Err(e) => return Err(e),
    };

    let shutdown_result = client.commands().shutdown().await;

    if let Some(pid) = read_daemon_pid(client.config()) {
        if shutdown_result.is_ok() {
            // Graceful shutdown succeeded, wait for process to exit
            wait_for_exit(pid, timeout_exit()).await;
        }

        // Force kill if still running
        if process_exists(pid) {
            force_kill_daemon(pid);
            wait_for_exit(pid, timeout_exit()).await;
        }
    }

    // A killed daemon leaves its socket behind
    cleanup_stale_files(client.config());
    Ok(true)
}

/// Wait for a process to exit
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(poll_interval()).await;
    }
    false
}

/// Find the sjd binary
fn find_sjd_binary() -> PathBuf {
    // Explicit override (used by tests to ensure correct binary)
    if let Ok(path) = std::env::var("SJ_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    // Check current executable's directory
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("sjd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    // Fall back to PATH lookup
    PathBuf::from("sjd")
}

/// Find the project root by walking up from current directory
///
/// Checks SJ_PROJECT_ROOT first, then walks up looking for `sj.toml` or a
/// `.sj` state directory. Falls back to the current directory.
pub fn find_project_root() -> Result<PathBuf, ClientError> {
    if let Ok(root) = std::env::var("SJ_PROJECT_ROOT") {
        return Ok(PathBuf::from(root));
    }

    let start = std::env::current_dir().map_err(|_| ClientError::NoProjectRoot)?;
    Ok(project_root_from(&start))
}

fn project_root_from(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join("sj.toml").is_file() || dir.join(".sj").is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

/// Remove socket and PID files left by a daemon that is gone
fn cleanup_stale_files(config: &Config) {
    for path in [&config.socket_path, &config.lock_path] {
        if path.exists() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Get the PID from the daemon PID file, if it exists
pub fn read_daemon_pid(config: &Config) -> Option<u32> {
    std::fs::read_to_string(&config.lock_path)
        .ok()
        .and_then(|content| content.trim().parse::<u32>().ok())
}

/// Check if a process with the given PID exists
pub fn process_exists(pid: u32) -> bool {
    // Use kill -0 to check if process exists without sending a signal
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Force kill a daemon process
pub fn force_kill_daemon(pid: u32) -> bool {
    Command::new("kill")
        .args(["-9", &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Startup marker prefix that daemon writes to log before anything else.
/// Full format: "--- sjd: starting (pid: 12345) ---"
const STARTUP_MARKER_PREFIX: &str = "--- sjd: starting (pid: ";

/// Read daemon log from the last startup marker, looking for errors.
pub fn read_startup_error(config: &Config) -> Option<String> {
    let content = std::fs::read_to_string(&config.log_path).ok()?;
    startup_error_from_log(&content)
}

fn startup_error_from_log(content: &str) -> Option<String> {
    let start_pos = content.rfind(STARTUP_MARKER_PREFIX)?;
    let startup_log = &content[start_pos..];

    let errors: Vec<&str> = startup_log
        .lines()
        .filter(|line| line.contains(" ERROR ") || line.contains("Failed to start"))
        .collect();

    if errors.is_empty() {
        return None;
    }

    // Keep the message after the "Failed to start daemon:" or "target:" prefix
    let messages: Vec<String> = errors
        .iter()
        .map(|line| match line.split_once(": ") {
            Some((_, msg)) => msg.to_string(),
            None => line.to_string(),
        })
        .collect();
    Some(messages.join("\n"))
}

/// If the daemon log contains startup errors, report those instead of `err`
fn wrap_with_startup_error(err: ClientError, config: &Config) -> ClientError {
    match read_startup_error(config) {
        Some(startup_error) => ClientError::DaemonStartFailed(startup_error),
        None => err,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
