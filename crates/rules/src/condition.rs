// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditions and the predicate registry they are evaluated with

use serde::{Deserialize, Serialize};
use sj_core::{Signal, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown condition kind: {0}")]
pub struct UnknownPredicate(pub String);

/// A predicate over one named signal parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDefinition {
    pub parameter: String,
    pub kind: String,
    pub value: Value,
}

impl ConditionDefinition {
    pub fn new(
        parameter: impl Into<String>,
        kind: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Evaluate against a signal. A parameter absent from the signal is
    /// `false`, an unregistered kind is an error.
    pub fn evaluate(
        &self,
        signal: &Signal,
        predicates: &PredicateRegistry,
    ) -> Result<bool, UnknownPredicate> {
        let predicate = predicates
            .get(&self.kind)
            .ok_or_else(|| UnknownPredicate(self.kind.clone()))?;
        Ok(match signal.parameter(&self.parameter) {
            Some(actual) => predicate.test(&actual.to_string(), &self.value.to_string()),
            None => false,
        })
    }
}

/// Compares a parameter's string form against the expected string
pub trait Predicate: Send + Sync {
    fn test(&self, actual: &str, expected: &str) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn test(&self, actual: &str, expected: &str) -> bool {
        self(actual, expected)
    }
}

pub const EQUALS: &str = "equals";
pub const STARTS_WITH: &str = "starts-with";
pub const ENDS_WITH: &str = "ends-with";

/// Closed set of condition kinds, keyed by kind string
#[derive(Clone)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Arc<dyn Predicate>>,
}

impl PredicateRegistry {
    /// Registry with no predicates at all
    pub fn empty() -> Self {
        Self {
            predicates: HashMap::new(),
        }
    }

    /// Register (or replace) the predicate for `kind`
    pub fn register(&mut self, kind: impl Into<String>, predicate: impl Predicate + 'static) {
        self.predicates.insert(kind.into(), Arc::new(predicate));
    }

    pub fn get(&self, kind: &str) -> Option<&dyn Predicate> {
        self.predicates.get(kind).map(|p| p.as_ref())
    }
}

impl Default for PredicateRegistry {
    /// Ordinal, case-sensitive equality and affix checks
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(EQUALS, |a: &str, e: &str| a == e);
        registry.register(STARTS_WITH, |a: &str, e: &str| a.starts_with(e));
        registry.register(ENDS_WITH, |a: &str, e: &str| a.ends_with(e));
        registry
    }
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
