// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command/RPC client with per-call retry and timeout
//!
//! Queries are read-only, so a lost or slow reply is retried by resending the
//! same request. Writes (`Emit`, `Shutdown`) go through [`CommandClient::send_once`].

use crate::protocol::{self, AppInfo, ProtocolError, Query, Request, Response};
use async_trait::async_trait;
use sj_core::{ActionDescriptor, ActionId, Parameters, SignalTypeId};
use sj_rules::RuleDefinition;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::net::UnixStream;

/// Default number of attempts per command
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum CommandError {
    /// Attempts ran out and at least one of them hit the deadline
    #[error("no reply after {attempts} attempt(s) of {timeout:?} each")]
    Timeout { attempts: u32, timeout: Duration },

    /// Every attempt failed before the deadline (e.g. nothing listening)
    #[error("daemon unavailable after {attempts} attempt(s): {source}")]
    Unavailable {
        attempts: u32,
        #[source]
        source: ProtocolError,
    },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("unexpected response from daemon")]
    UnexpectedResponse,
}

/// Sends one request and waits for its response
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn call(&self, request: &Request) -> Result<Response, ProtocolError>;
}

/// Transport over the daemon's Unix socket, one connection per call
#[derive(Debug, Clone)]
pub struct UnixTransport {
    socket_path: PathBuf,
}

impl UnixTransport {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

#[async_trait]
impl CommandTransport for UnixTransport {
    async fn call(&self, request: &Request) -> Result<Response, ProtocolError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        let data = protocol::encode(request)?;
        protocol::write_message(&mut writer, &data).await?;

        let bytes = protocol::read_message(&mut reader).await?;
        protocol::decode(&bytes)
    }
}

/// Retry and timeout for one command call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    pub retry_count: u32,
    pub timeout: Duration,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CallOptions {
    /// Defaults overridden by `SJ_RETRY_COUNT` and `SJ_TIMEOUT_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            retry_count: parse_env("SJ_RETRY_COUNT").unwrap_or(defaults.retry_count),
            timeout: parse_env("SJ_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attempts actually made; a retry count of zero still sends once
    pub fn attempts(&self) -> u32 {
        self.retry_count.max(1)
    }
}

fn parse_env<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

/// Send `request` until a response arrives or the attempts run out
///
/// Transport failures and timeouts each consume an attempt. Running out of
/// attempts is a `Timeout` if any attempt hit the deadline, otherwise
/// `Unavailable` with the last transport error. An error response is an
/// answer, not a lost reply, and is returned without retrying.
pub async fn invoke<T: CommandTransport + ?Sized>(
    transport: &T,
    request: &Request,
    options: &CallOptions,
) -> Result<Response, CommandError> {
    let attempts = options.attempts();
    let mut timed_out = false;
    let mut last_error = None;
    for attempt in 1..=attempts {
        match tokio::time::timeout(options.timeout, transport.call(request)).await {
            Ok(Ok(Response::Error { message })) => return Err(CommandError::Rejected(message)),
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(e)) => {
                tracing::debug!(attempt, error = %e, "command attempt failed");
                last_error = Some(e);
            }
            Err(_) => {
                tracing::debug!(
                    attempt,
                    timeout_ms = options.timeout.as_millis() as u64,
                    "command attempt timed out"
                );
                timed_out = true;
            }
        }
    }
    match last_error {
        Some(source) if !timed_out => Err(CommandError::Unavailable { attempts, source }),
        _ => Err(CommandError::Timeout {
            attempts,
            timeout: options.timeout,
        }),
    }
}

/// Snapshot returned by [`CommandClient::status`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonStatus {
    pub uptime: Duration,
    pub rules: usize,
    pub actions: usize,
    pub signals_pending: usize,
    pub jobs_pending: usize,
}

/// The daemon's command sets over a transport
pub struct CommandClient<T> {
    transport: T,
    options: CallOptions,
}

impl CommandClient<UnixTransport> {
    /// Client for the daemon listening on `socket_path`
    pub fn connect(socket_path: impl Into<PathBuf>, options: CallOptions) -> Self {
        Self::new(UnixTransport::new(socket_path), options)
    }
}

impl<T: CommandTransport> CommandClient<T> {
    pub fn new(transport: T, options: CallOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &CallOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send with the configured retry and timeout
    pub async fn send(&self, request: &Request) -> Result<Response, CommandError> {
        invoke(&self.transport, request, &self.options).await
    }

    /// Send exactly once, bounded by the configured timeout
    pub async fn send_once(&self, request: &Request) -> Result<Response, CommandError> {
        let once = self.options.with_retry_count(1);
        invoke(&self.transport, request, &once).await
    }

    /// Full definition of an action; `None` if the daemon has no such action
    pub async fn fetch_action(
        &self,
        id: &ActionId,
    ) -> Result<Option<ActionDescriptor>, CommandError> {
        let request = Request::Query {
            query: Query::GetAction { id: id.clone() },
        };
        match self.send(&request).await? {
            Response::Action { action } => Ok(action),
            _ => Err(CommandError::UnexpectedResponse),
        }
    }

    /// Rules registered for a signal type; `None` if there are none
    pub async fn fetch_rules(
        &self,
        sensor: &SignalTypeId,
    ) -> Result<Option<Vec<RuleDefinition>>, CommandError> {
        let request = Request::Query {
            query: Query::RulesFor {
                sensor: sensor.clone(),
            },
        };
        match self.send(&request).await? {
            Response::Rules { rules } if rules.is_empty() => Ok(None),
            Response::Rules { rules } => Ok(Some(rules)),
            _ => Err(CommandError::UnexpectedResponse),
        }
    }

    pub async fn app_info(&self) -> Result<AppInfo, CommandError> {
        let request = Request::Query {
            query: Query::AppInfo,
        };
        match self.send(&request).await? {
            Response::AppInfo { info } => Ok(info),
            _ => Err(CommandError::UnexpectedResponse),
        }
    }

    pub async fn ping(&self) -> Result<(), CommandError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            _ => Err(CommandError::UnexpectedResponse),
        }
    }

    /// Daemon version via the hello handshake
    pub async fn hello(&self) -> Result<String, CommandError> {
        let request = Request::Hello {
            version: protocol::PROTOCOL_VERSION.to_string(),
        };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            _ => Err(CommandError::UnexpectedResponse),
        }
    }

    pub async fn status(&self) -> Result<DaemonStatus, CommandError> {
        match self.send(&Request::Status).await? {
            Response::Status {
                uptime_secs,
                rules,
                actions,
                signals_pending,
                jobs_pending,
            } => Ok(DaemonStatus {
                uptime: Duration::from_secs(uptime_secs),
                rules,
                actions,
                signals_pending,
                jobs_pending,
            }),
            _ => Err(CommandError::UnexpectedResponse),
        }
    }

    /// Publish a signal; returns its record id, or `None` for a duplicate
    pub async fn emit(
        &self,
        sensor: SignalTypeId,
        parameters: Parameters,
    ) -> Result<Option<u64>, CommandError> {
        let request = Request::Emit { sensor, parameters };
        match self.send_once(&request).await? {
            Response::Emitted { id } => Ok(id),
            _ => Err(CommandError::UnexpectedResponse),
        }
    }

    pub async fn shutdown(&self) -> Result<(), CommandError> {
        match self.send_once(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            _ => Err(CommandError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
