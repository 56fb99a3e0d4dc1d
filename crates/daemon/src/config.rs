// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon paths and project settings (`sj.toml`)

use serde::{Deserialize, Serialize};
use sj_core::{ActionId, ParameterSpec};
use sj_engine::DeliveryConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the per-project state directory
pub const STATE_DIR_NAME: &str = ".sj";

/// Project settings file, relative to the project root
pub const SETTINGS_FILE: &str = "sj.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Project not found at {0}: {1}")]
    ProjectNotFound(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Filesystem layout of one project's daemon
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root directory
    pub project_root: PathBuf,
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Write-ahead log backing the durable channels
    pub wal_path: PathBuf,
    /// Directory scanned for `*.toml` rule files
    pub rules_dir: PathBuf,
    pub settings_path: PathBuf,
}

impl Config {
    /// Create config for a project
    ///
    /// `SJ_STATE_DIR` overrides the default `<root>/.sj` state directory.
    pub fn for_project(project_root: &Path) -> Result<Self, ConfigError> {
        let state_dir = std::env::var_os("SJ_STATE_DIR").map(PathBuf::from);
        Self::with_state_dir(project_root, state_dir)
    }

    pub fn with_state_dir(
        project_root: &Path,
        state_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let canonical = project_root
            .canonicalize()
            .map_err(|e| ConfigError::ProjectNotFound(project_root.to_path_buf(), e))?;
        let state_dir = state_dir.unwrap_or_else(|| canonical.join(STATE_DIR_NAME));

        Ok(Self {
            socket_path: state_dir.join("sjd.sock"),
            lock_path: state_dir.join("sjd.pid"),
            log_path: state_dir.join("daemon.log"),
            wal_path: state_dir.join("wal").join("channels.wal"),
            rules_dir: canonical.join("rules"),
            settings_path: canonical.join(SETTINGS_FILE),
            state_dir,
            project_root: canonical,
        })
    }
}

/// Contents of `sj.toml`; every section is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub delivery: DeliveryConfig,
    pub rules: RulesSettings,
    #[serde(rename = "action")]
    pub actions: Vec<ActionSettings>,
}

impl Settings {
    /// Load settings, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::parse(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSettings {
    /// How often the rules directory is rescanned for changes
    #[serde(with = "humantime_serde")]
    pub rescan_interval: Duration,
}

impl Default for RulesSettings {
    fn default() -> Self {
        Self {
            rescan_interval: Duration::from_secs(2),
        }
    }
}

/// A shell action declared in `sj.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSettings {
    pub id: ActionId,
    pub command: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    /// Working directory; relative paths resolve against the project root
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
