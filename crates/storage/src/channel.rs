// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable channel contract
//!
//! A durable channel pairs a persistent store with a wake-up signal. Records
//! published on a channel stay stored until a processor acknowledges them or
//! they are moved to the channel's dead-letter channel.

use crate::WalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("storage error: {0}")]
    Wal(#[from] WalError),
    #[error("unknown record {id} on channel {channel}")]
    UnknownRecord { channel: String, id: u64 },
}

/// A serialized item as written by one producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identity of the publishing process or component
    pub producer: String,
    /// Per-producer sequence number, strictly increasing
    pub seq: u64,
    pub payload: serde_json::Value,
}

/// Result of a publish that the store accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Stored under this record id
    Stored(u64),
    /// The producer already published this seq; nothing was written
    Duplicate,
}

/// A record handed to a processor
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub id: u64,
    /// 1 on first delivery, incremented on every redelivery
    pub attempt: u32,
    pub payload: serde_json::Value,
}

#[async_trait]
pub trait DurableChannel: Send + Sync + 'static {
    /// Durably store a record. Returns after the store acknowledges the write.
    async fn publish(&self, channel: &str, record: Record)
        -> Result<PublishOutcome, ChannelError>;

    /// Take the next deliverable record, if any. Records from one producer
    /// are handed out one at a time, in publish order.
    async fn claim(&self, channel: &str) -> Result<Option<Delivery>, ChannelError>;

    /// Forget a handled record
    async fn ack(&self, channel: &str, id: u64) -> Result<(), ChannelError>;

    /// Put a claimed record back so it is delivered again
    async fn release(&self, channel: &str, id: u64) -> Result<(), ChannelError>;

    /// Move a claimed record to the dead-letter channel
    async fn dead_letter(&self, channel: &str, id: u64, reason: &str)
        -> Result<(), ChannelError>;

    /// Number of unacknowledged records on a channel
    async fn depth(&self, channel: &str) -> Result<usize, ChannelError>;

    /// Resolve when the channel may have something to claim
    async fn wait(&self, channel: &str);
}
