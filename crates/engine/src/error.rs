// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine loops

use crate::PublishError;
use sj_core::{ActionError, ActionId};
use thiserror::Error;

/// Errors that can occur in the signal runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),
    #[error("storage error: {0}")]
    Channel(#[from] sj_storage::ChannelError),
}

/// Why a job could not be carried out
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no action registered for {0}")]
    UnknownAction(ActionId),
    #[error("action {action} missing required parameters: {}", missing.join(", "))]
    MissingParameters {
        action: ActionId,
        missing: Vec<String>,
    },
    #[error("action {action} failed: {source}")]
    Action {
        action: ActionId,
        #[source]
        source: ActionError,
    },
    #[error("action {action} panicked")]
    Panicked { action: ActionId },
    #[error("action {action} was aborted")]
    Aborted { action: ActionId },
}
