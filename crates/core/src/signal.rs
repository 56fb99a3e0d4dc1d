// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signals emitted by sensors

use crate::ids::SignalTypeId;
use crate::traced::Traced;
use crate::value::{Parameters, Value};
use thiserror::Error;

/// Errors raised when constructing core values from caller input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("signal sensor id must not be empty")]
    EmptySensor,
    #[error("parameter name must not be empty")]
    EmptyParameterName,
}

/// An immutable event: the sensor that produced it plus its parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    sensor: SignalTypeId,
    parameters: Parameters,
}

impl Signal {
    pub fn new(
        sensor: impl Into<SignalTypeId>,
        parameters: Parameters,
    ) -> Result<Self, ValidationError> {
        let sensor = sensor.into();
        if sensor.is_empty() {
            return Err(ValidationError::EmptySensor);
        }
        if parameters.iter().any(|(name, _)| name.is_empty()) {
            return Err(ValidationError::EmptyParameterName);
        }
        Ok(Self { sensor, parameters })
    }

    pub fn sensor(&self) -> &SignalTypeId {
        &self.sensor
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Case-insensitive parameter lookup
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }
}

impl Traced for Signal {
    fn name(&self) -> &'static str {
        "signal"
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sensor", self.sensor.to_string()),
            ("parameters", self.parameters.len().to_string()),
        ]
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
