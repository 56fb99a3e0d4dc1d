// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Signal Jobs engine: rule matching, durable publish/process, and the
//! signal and job loops built on them

mod agent;
mod codec;
mod delivery;
mod error;
mod intake;
mod processor;
mod publisher;
mod rule_engine;
mod runtime;

#[cfg(test)]
mod test_support;

pub use agent::{Agent, JobOutcome};
pub use codec::{Codec, CodecError, JobCodec, JobData, SignalCodec, SignalData};
pub use delivery::DeliveryConfig;
pub use error::{DispatchError, RuntimeError};
pub use intake::QueueIntake;
pub use processor::{HandlerError, ItemHandler, Processor, ProcessorHandle};
pub use publisher::{PublishError, Publisher};
pub use rule_engine::RuleEngine;
pub use runtime::Runtime;
