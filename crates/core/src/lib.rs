// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sj-core: value types shared by every Signal Jobs process
//!
//! This crate provides:
//! - Identifier types (`SignalTypeId`, `ActionId`)
//! - Case-insensitive parameter maps
//! - Signals, jobs and action definitions
//! - The in-memory action catalogue and FIFO hand-off queues

pub mod action;
pub mod action_storage;
pub mod id;
pub mod ids;
pub mod job;
pub mod queue;
pub mod signal;
pub mod traced;
pub mod value;

pub use action::{ActionDefinition, ActionDescriptor, ActionError, ActionHandler, ParameterSpec};
pub use action_storage::{ActionStorage, RegistryError};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use ids::{ActionId, SignalTypeId};
pub use job::Job;
pub use queue::{Fifo, JobQueue, QueueError, QueueItem, SignalQueue};
pub use signal::{Signal, ValidationError};
pub use traced::Traced;
pub use value::{Parameters, Value};
