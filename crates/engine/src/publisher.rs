// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable publisher

use crate::codec::{Codec, CodecError};
use sj_core::IdGen;
use sj_storage::{ChannelError, DurableChannel, PublishOutcome, Record};
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish to {channel} failed: {source}")]
    PublishFailure {
        channel: &'static str,
        #[source]
        source: ChannelError,
    },
    #[error("encode error: {0}")]
    Codec(#[from] CodecError),
}

/// Writes items of one kind to their durable channel
///
/// Each publisher is a distinct producer. Records carry a per-producer
/// sequence number that only advances once the store has accepted a
/// record, so retrying a failed publish cannot reorder or duplicate it.
pub struct Publisher<C: Codec> {
    channel: Arc<dyn DurableChannel>,
    producer: String,
    next_seq: Mutex<u64>,
    _codec: PhantomData<fn() -> C>,
}

impl<C: Codec> Publisher<C> {
    pub fn new(channel: Arc<dyn DurableChannel>, ids: &impl IdGen) -> Self {
        Self {
            channel,
            producer: ids.next(),
            next_seq: Mutex::new(1),
            _codec: PhantomData,
        }
    }

    pub fn producer(&self) -> &str {
        &self.producer
    }

    /// Publish one item, returning once the store has durably accepted it
    ///
    /// Returns the stored record id, or `None` when the store already held
    /// this record.
    pub async fn publish(&self, item: &C::Item) -> Result<Option<u64>, PublishError> {
        let payload = C::to_payload(item)?;
        let mut next_seq = self.next_seq.lock().await;
        let record = Record {
            producer: self.producer.clone(),
            seq: *next_seq,
            payload,
        };
        let outcome = self
            .channel
            .publish(C::CHANNEL, record)
            .await
            .map_err(|source| PublishError::PublishFailure {
                channel: C::CHANNEL,
                source,
            })?;
        *next_seq += 1;
        match outcome {
            PublishOutcome::Stored(id) => {
                tracing::debug!(channel = C::CHANNEL, id, "published");
                Ok(Some(id))
            }
            PublishOutcome::Duplicate => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
