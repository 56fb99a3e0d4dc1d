// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage: the write-ahead log and the channels built on it

mod channel;
mod operation;
mod state;
mod wal;
mod wal_channel;

pub use channel::{ChannelError, Delivery, DurableChannel, PublishOutcome, Record};
pub use operation::{dead_letter_channel, Operation};
pub use state::{MaterializedState, StoredRecord};
pub use wal::{Wal, WalEntry, WalError};
pub use wal_channel::WalChannel;
