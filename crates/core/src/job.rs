// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs: resolved action invocations ready for dispatch

use crate::ids::ActionId;
use crate::traced::Traced;
use crate::value::{Parameters, Value};

/// An action id plus the concrete parameters it should run with
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    action: ActionId,
    parameters: Parameters,
}

impl Job {
    pub fn new(action: impl Into<ActionId>, parameters: Parameters) -> Self {
        Self {
            action: action.into(),
            parameters,
        }
    }

    pub fn action(&self) -> &ActionId {
        &self.action
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }
}

impl Traced for Job {
    fn name(&self) -> &'static str {
        "job"
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("action", self.action.to_string()),
            ("parameters", self.parameters.len().to_string()),
        ]
    }
}
