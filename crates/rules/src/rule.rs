// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule definitions

use crate::condition::{ConditionDefinition, PredicateRegistry, UnknownPredicate};
use crate::template::{resolve_all, TemplateError};
use serde::{Deserialize, Serialize};
use sj_core::{ActionId, Job, Parameters, Signal, SignalTypeId};
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a matching rule could not produce a job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error(transparent)]
    UnknownPredicate(#[from] UnknownPredicate),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// One declarative rule: which signal it reacts to, what must hold, and
/// which action to run with which parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub signal: SignalSelector,
    #[serde(default, rename = "condition")]
    pub conditions: Vec<ConditionDefinition>,
    pub action: ActionRuleDefinition,
}

impl RuleDefinition {
    /// Build this rule's job for `signal`
    ///
    /// `Ok(None)` when the rule is disabled, the selector does not match, or
    /// a condition fails. Conditions run in order and stop at the first
    /// failure.
    pub fn build_job(
        &self,
        signal: &Signal,
        predicates: &PredicateRegistry,
    ) -> Result<Option<Job>, RuleError> {
        if !self.enabled || !self.signal.matches(signal) {
            return Ok(None);
        }
        for condition in &self.conditions {
            if !condition.evaluate(signal, predicates)? {
                return Ok(None);
            }
        }
        let parameters = resolve_all(&self.action.parameters, signal.parameters())?;
        Ok(Some(Job::new(self.action.id.clone(), parameters)))
    }
}

fn default_enabled() -> bool {
    true
}

/// The signal type a rule reacts to plus literal parameter constraints
/// checked before any condition runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSelector {
    pub sensor: SignalTypeId,
    #[serde(default)]
    pub parameters: Parameters,
}

impl SignalSelector {
    /// Sensor ids must be equal and every constraint must equal the signal's
    /// parameter by string form. A missing parameter never matches.
    pub fn matches(&self, signal: &Signal) -> bool {
        if &self.sensor != signal.sensor() {
            return false;
        }
        self.parameters.iter().all(|(name, expected)| {
            signal
                .parameter(name)
                .is_some_and(|actual| actual.to_string() == expected.to_string())
        })
    }
}

/// The action a matched rule invokes and its parameter templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRuleDefinition {
    pub id: ActionId,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
