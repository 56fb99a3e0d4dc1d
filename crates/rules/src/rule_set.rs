// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The current rule set, keyed by source file

use crate::RuleDefinition;
use sj_core::SignalTypeId;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Inner {
    files: BTreeMap<String, Vec<RuleDefinition>>,
    snapshot: Arc<Vec<RuleDefinition>>,
}

impl Inner {
    fn rebuild(&mut self) {
        let rules = self.files.values().flatten().cloned().collect();
        self.snapshot = Arc::new(rules);
    }
}

/// Rules grouped by the file that defined them
///
/// Readers take cheap immutable snapshots, ordered by file key and then by
/// position within the file. Changes replace the snapshot atomically.
#[derive(Default)]
pub struct RuleSet {
    inner: RwLock<Inner>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all rules that came from `file`
    pub fn upsert_file(&self, file: impl Into<String>, rules: Vec<RuleDefinition>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.files.insert(file.into(), rules);
        inner.rebuild();
    }

    /// Drop all rules that came from `file`; returns whether any were known
    pub fn remove_file(&self, file: &str) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let removed = inner.files.remove(file).is_some();
        if removed {
            inner.rebuild();
        }
        removed
    }

    pub fn snapshot(&self) -> Arc<Vec<RuleDefinition>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&inner.snapshot)
    }

    /// All rules (enabled or not) reacting to `sensor`
    pub fn rules_for(&self, sensor: &SignalTypeId) -> Vec<RuleDefinition> {
        self.snapshot()
            .iter()
            .filter(|rule| &rule.signal.sensor == sensor)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "rule_set_tests.rs"]
mod tests;
