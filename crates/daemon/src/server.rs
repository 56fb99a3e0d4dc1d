// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use sj_core::{Parameters, Signal, SignalTypeId};
use sj_daemon::protocol::{
    self, AppInfo, Query, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION,
};
use sj_engine::{Codec, JobCodec, SignalCodec};
use sj_storage::DurableChannel;
use tokio::net::UnixStream;
use tracing::{debug, error, info, warn};

use crate::lifecycle::DaemonState;

/// Handle a single client connection
pub async fn handle_connection(
    daemon: &mut DaemonState,
    stream: UnixStream,
) -> Result<(), ServerError> {
    // Split stream for reading/writing
    let (mut reader, mut writer) = stream.into_split();

    // Read request with timeout
    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    let response = handle_request(daemon, request).await;

    debug!("Sending response: {:?}", response);

    // Write response with timeout
    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Handle a single request and return a response
pub async fn handle_request(daemon: &mut DaemonState, request: Request) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "client version differs");
            }
            Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            }
        }

        Request::Emit { sensor, parameters } => emit(daemon, sensor, parameters).await,

        Request::Query { query } => handle_query(daemon, query),

        Request::Shutdown => {
            daemon.shutdown_requested = true;
            Response::ShuttingDown
        }

        Request::Status => {
            let signals_pending = daemon.channel.depth(SignalCodec::CHANNEL).await;
            let jobs_pending = daemon.channel.depth(JobCodec::CHANNEL).await;
            match (signals_pending, jobs_pending) {
                (Ok(signals_pending), Ok(jobs_pending)) => Response::Status {
                    uptime_secs: daemon.start_time.elapsed().as_secs(),
                    rules: daemon.rules.len(),
                    actions: daemon.actions.len(),
                    signals_pending,
                    jobs_pending,
                },
                (Err(e), _) | (_, Err(e)) => Response::Error {
                    message: e.to_string(),
                },
            }
        }
    }
}

/// Validate and publish a signal on behalf of a sensor
async fn emit(daemon: &DaemonState, sensor: SignalTypeId, parameters: Parameters) -> Response {
    let signal = match Signal::new(sensor, parameters) {
        Ok(signal) => signal,
        Err(e) => {
            return Response::Error {
                message: format!("invalid signal: {}", e),
            }
        }
    };
    match daemon.sensor.publish(&signal).await {
        Ok(id) => {
            info!(sensor = %signal.sensor(), id = ?id, "signal published");
            Response::Emitted { id }
        }
        Err(e) => {
            error!(sensor = %signal.sensor(), error = %e, "signal publish failed");
            Response::Error {
                message: e.to_string(),
            }
        }
    }
}

/// Handle query requests
fn handle_query(daemon: &DaemonState, query: Query) -> Response {
    match query {
        Query::GetAction { id } => Response::Action {
            action: daemon.actions.action(&id).map(|d| d.descriptor()),
        },

        Query::RulesFor { sensor } => Response::Rules {
            rules: daemon.rules.rules_for(&sensor),
        },

        Query::AppInfo => Response::AppInfo {
            info: AppInfo {
                name: "sjd".to_string(),
                version: PROTOCOL_VERSION.to_string(),
                project_root: daemon.config.project_root.display().to_string(),
                rules_dir: daemon.config.rules_dir.display().to_string(),
                actions: daemon
                    .actions
                    .descriptors()
                    .into_iter()
                    .map(|d| d.id)
                    .collect(),
            },
        },
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}
