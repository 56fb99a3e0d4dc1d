// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory catalogue of registered actions

use crate::action::{ActionDefinition, ActionDescriptor};
use crate::ids::ActionId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate action definition: {0}")]
    DuplicateActionDefinition(ActionId),
}

/// Actions keyed by id
///
/// Written once at load time by the owning process, read concurrently by
/// job dispatch and command handlers. Entries are stored behind `Arc` so
/// readers never observe a partially built definition.
#[derive(Default)]
pub struct ActionStorage {
    actions: RwLock<HashMap<ActionId, Arc<ActionDefinition>>>,
}

impl ActionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Fails without modifying the catalogue if the
    /// id is already taken.
    pub fn add(&self, definition: ActionDefinition) -> Result<(), RegistryError> {
        let mut actions = self.actions.write().unwrap_or_else(|e| e.into_inner());
        match actions.entry(definition.id().clone()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateActionDefinition(
                entry.key().clone(),
            )),
            Entry::Vacant(entry) => {
                tracing::debug!(action = %entry.key(), "registered action");
                entry.insert(Arc::new(definition));
                Ok(())
            }
        }
    }

    pub fn action(&self, id: &ActionId) -> Option<Arc<ActionDefinition>> {
        let actions = self.actions.read().unwrap_or_else(|e| e.into_inner());
        actions.get(id).cloned()
    }

    /// Existence check. An empty id is never registered.
    pub fn has_action_for(&self, id: &str) -> bool {
        if id.is_empty() {
            return false;
        }
        let actions = self.actions.read().unwrap_or_else(|e| e.into_inner());
        actions.contains_key(id)
    }

    /// Descriptors of every registered action, sorted by id
    pub fn descriptors(&self) -> Vec<ActionDescriptor> {
        let actions = self.actions.read().unwrap_or_else(|e| e.into_inner());
        let mut descriptors: Vec<_> = actions.values().map(|a| a.descriptor()).collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.actions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "action_storage_tests.rs"]
mod tests;
