// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action definitions: the catalogue entries jobs are dispatched to

use crate::ids::ActionId;
use crate::job::Job;
use crate::value::Parameters;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by an action invocation
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("missing required parameter: {0}")]
    MissingParameter(String),
    #[error("action failed: {0}")]
    Failed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Declared parameter of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            description: None,
        }
    }
}

/// Executable behavior behind an action id
#[async_trait]
pub trait ActionHandler: Send + Sync + 'static {
    async fn invoke(&self, job: &Job) -> Result<(), ActionError>;
}

/// A registered action: id, declared parameters and the handler to invoke
#[derive(Clone)]
pub struct ActionDefinition {
    id: ActionId,
    parameters: Vec<ParameterSpec>,
    handler: Arc<dyn ActionHandler>,
}

impl ActionDefinition {
    pub fn new(
        id: impl Into<ActionId>,
        parameters: Vec<ParameterSpec>,
        handler: impl ActionHandler,
    ) -> Self {
        Self {
            id: id.into(),
            parameters,
            handler: Arc::new(handler),
        }
    }

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn handler(&self) -> Arc<dyn ActionHandler> {
        Arc::clone(&self.handler)
    }

    /// Required parameters absent from `params`, in declaration order
    pub fn missing_parameters<'a>(&'a self, params: &Parameters) -> Vec<&'a str> {
        self.parameters
            .iter()
            .filter(|spec| spec.required && !params.contains(&spec.name))
            .map(|spec| spec.name.as_str())
            .collect()
    }

    /// Serializable view of this definition, without the handler
    pub fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            id: self.id.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("id", &self.id)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// What other processes learn about an action over the command protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub id: ActionId,
    pub parameters: Vec<ParameterSpec>,
}
