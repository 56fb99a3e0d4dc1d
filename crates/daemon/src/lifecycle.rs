// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, rule rescans, shutdown.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use fs2::FileExt;
use sj_adapters::{LogAction, ShellAction, TracedAction, LOG_ACTION_ID};
use sj_core::{ActionDefinition, ActionStorage, RegistryError, UuidIdGen};
use sj_daemon::config::{ActionSettings, Config, ConfigError, Settings};
use sj_engine::{
    Agent, Codec, JobCodec, ProcessorHandle, Publisher, RuleEngine, Runtime, SignalCodec,
};
use sj_rules::{RuleDirectory, RuleSet};
use sj_storage::{DurableChannel, WalChannel, WalError};
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    pub settings: Settings,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    /// Store behind the `signals` and `jobs` channels
    pub channel: Arc<WalChannel>,
    /// Live rule set, shared with the rule engine
    pub rules: Arc<RuleSet>,
    rule_dir: RuleDirectory,
    pub actions: Arc<ActionStorage>,
    /// Publishes signals received over the socket
    pub sensor: Publisher<SignalCodec>,
    processors: Vec<ProcessorHandle>,
    loops: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
    /// When daemon started
    pub start_time: Instant,
    /// Shutdown requested flag
    pub shutdown_requested: bool,
}

impl DaemonState {
    /// Pick up added, changed and removed rule files
    pub fn rescan_rules(&mut self) -> Result<(), LifecycleError> {
        let report = self.rule_dir.rescan(&self.rules)?;
        if !report.is_empty() {
            info!(
                added = report.added.len(),
                updated = report.updated.len(),
                removed = report.removed.len(),
                failed = report.failed.len(),
                rules = self.rules.len(),
                "rules reloaded"
            );
        }
        Ok(())
    }

    /// Shutdown the daemon gracefully
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        // 1. Let the engine and agent loops finish what is queued, so those
        //    records are acknowledged
        let _ = self.shutdown_tx.send(true);
        for handle in std::mem::take(&mut self.loops) {
            if let Err(e) = handle.await {
                warn!("processing loop ended abnormally: {}", e);
            }
        }

        // 2. Stop the processors; anything claimed since stays unacknowledged
        //    and is delivered again on restart
        for processor in std::mem::take(&mut self.processors) {
            processor.stop().await;
        }

        // 3. Remove socket file
        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        // 4. Remove PID file
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        // 5. Lock file is released automatically when self.lock_file is dropped

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(std::path::PathBuf, std::io::Error),

    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("action registration failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Clean up any resources created before failure, unless another
            // daemon holds the lock and owns them
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create state directory (needed for socket, lock, etc.)
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races. Truncate only once the
    //    lock is held so a running daemon's PID is never clobbered.
    let mut lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // 3. Create directories
    if let Some(parent) = config.wal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // 4. Load settings and actions BEFORE binding socket (fail fast)
    let settings = Settings::load(&config.settings_path)?;
    let actions = Arc::new(register_actions(&settings.actions, &config.project_root)?);

    // 5. Initial rule scan
    let rules = Arc::new(RuleSet::new());
    let mut rule_dir = RuleDirectory::new(config.rules_dir.clone());
    let report = rule_dir.rescan(&rules)?;
    info!(
        files = report.added.len(),
        failed = report.failed.len(),
        rules = rules.len(),
        "Loaded rules from {}",
        config.rules_dir.display()
    );

    // 6. Open the channel store; unacknowledged records are redelivered
    let channel = Arc::new(WalChannel::open(&config.wal_path)?);
    let store: Arc<dyn DurableChannel> = channel.clone();
    for name in [SignalCodec::CHANNEL, JobCodec::CHANNEL] {
        let pending = channel.records(name).len();
        if pending > 0 {
            warn!("Recovered {} unacknowledged record(s) on {}", pending, name);
        }
    }

    // 7. Wire engine and agent
    let runtime = Arc::new(Runtime::new(
        RuleEngine::new(Arc::clone(&rules)),
        Publisher::new(Arc::clone(&store), &UuidIdGen),
        settings.delivery.clone(),
    ));
    let agent = Arc::new(Agent::new(Arc::clone(&actions)));
    let sensor = Publisher::new(Arc::clone(&store), &UuidIdGen);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let processors = vec![
        runtime.subscribe(Arc::clone(&store)),
        agent.subscribe(Arc::clone(&store), settings.delivery.clone()),
    ];
    let loops = vec![
        tokio::spawn({
            let runtime = Arc::clone(&runtime);
            let shutdown = shutdown_rx.clone();
            async move { runtime.run(shutdown).await }
        }),
        tokio::spawn({
            let agent = Arc::clone(&agent);
            async move { agent.run(shutdown_rx).await }
        }),
    ];

    // 8. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(
        "Daemon started for project: {}",
        config.project_root.display()
    );

    Ok(DaemonState {
        config: config.clone(),
        settings,
        lock_file,
        listener,
        channel,
        rules,
        rule_dir,
        actions,
        sensor,
        processors,
        loops,
        shutdown_tx,
        start_time: Instant::now(),
        shutdown_requested: false,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    // Remove socket if we created it
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }

    // Remove PID/lock file
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Built-in `log` action plus every shell action declared in settings
fn register_actions(
    declared: &[ActionSettings],
    project_root: &Path,
) -> Result<ActionStorage, LifecycleError> {
    let actions = ActionStorage::new();
    actions.add(ActionDefinition::new(
        LOG_ACTION_ID,
        Vec::new(),
        TracedAction::new(LogAction),
    ))?;

    for action in declared {
        let cwd = match &action.cwd {
            Some(dir) => project_root.join(dir),
            None => project_root.to_path_buf(),
        };
        let shell = ShellAction::new(action.command.clone()).with_cwd(cwd);
        actions.add(ActionDefinition::new(
            action.id.clone(),
            action.parameters.clone(),
            TracedAction::new(shell),
        ))?;
        info!(action = %action.id, "registered shell action");
    }
    Ok(actions)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
