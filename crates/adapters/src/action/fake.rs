// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake action for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use sj_core::{ActionError, ActionHandler, Job};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What the fake does when invoked
#[derive(Debug, Clone, Default)]
pub enum FakeBehavior {
    #[default]
    Succeed,
    Fail(String),
    Panic,
    /// Never return
    Hang,
}

/// Fake action that records every job it is invoked with
#[derive(Clone, Default)]
pub struct FakeAction {
    calls: Arc<Mutex<Vec<Job>>>,
    behavior: Arc<Mutex<FakeBehavior>>,
    invoked: Arc<Notify>,
}

impl FakeAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        let fake = Self::new();
        fake.set_behavior(FakeBehavior::Fail(message.into()));
        fake
    }

    pub fn set_behavior(&self, behavior: FakeBehavior) {
        *self.behavior.lock().unwrap_or_else(|e| e.into_inner()) = behavior;
    }

    /// Jobs received so far
    pub fn calls(&self) -> Vec<Job> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Resolve after the next invocation
    pub async fn invoked(&self) {
        self.invoked.notified().await;
    }
}

#[async_trait]
impl ActionHandler for FakeAction {
    #[allow(clippy::panic)]
    async fn invoke(&self, job: &Job) -> Result<(), ActionError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(job.clone());
        self.invoked.notify_one();

        let behavior = self
            .behavior
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match behavior {
            FakeBehavior::Succeed => Ok(()),
            FakeBehavior::Fail(message) => Err(ActionError::Failed(message)),
            FakeBehavior::Panic => panic!("fake action panicked"),
            FakeBehavior::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
