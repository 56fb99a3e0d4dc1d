// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL-backed durable channel
//!
//! Every state change is appended to one WAL shared by all channels before
//! it is applied in memory. Waiting processors are woken through a
//! per-channel `Notify`. The log is compacted down to the live state when
//! the store opens and whenever enough entries pile up behind it.

use crate::channel::{ChannelError, Delivery, DurableChannel, PublishOutcome, Record};
use crate::state::{MaterializedState, StoredRecord};
use crate::{Operation, Wal, WalError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Entries appended since the last compaction that trigger another one
const COMPACT_THRESHOLD: usize = 10_000;

struct Inner {
    path: PathBuf,
    wal: Wal,
    state: MaterializedState,
    /// Entries in the log file
    entries: usize,
    threshold: usize,
}

impl Inner {
    fn persist(&mut self, op: Operation) -> Result<u64, ChannelError> {
        let seq = self.wal.append(&op)?;
        self.state.apply(seq, &op);
        self.entries += 1;
        if self.entries >= self.threshold {
            // The entry is already durable; a failed compaction only delays the next one
            if let Err(e) = self.compact() {
                tracing::error!(path = %self.path.display(), error = %e, "WAL compaction failed");
            }
        }
        Ok(seq)
    }

    /// Rewrite the log to the operations that rebuild the current state
    fn compact(&mut self) -> Result<(), WalError> {
        let ops = self.state.snapshot();
        let before = self.entries;
        self.wal = Wal::rewrite(&self.path, self.wal.sequence(), &ops)?;
        self.entries = ops.len();
        // Live state alone may be over the threshold; wait for as much again
        self.threshold = self.threshold.max(self.entries.saturating_mul(2));
        tracing::info!(
            path = %self.path.display(),
            before,
            after = self.entries,
            "compacted WAL"
        );
        Ok(())
    }
}

pub struct WalChannel {
    inner: Mutex<Inner>,
    wakers: Mutex<HashMap<String, Arc<Notify>>>,
}

impl WalChannel {
    /// Open the store, replaying existing operations and compacting the log
    pub fn open(path: &Path) -> Result<Self, WalError> {
        Self::open_with_threshold(path, COMPACT_THRESHOLD)
    }

    /// Open with a custom compaction threshold
    pub fn open_with_threshold(path: &Path, threshold: usize) -> Result<Self, WalError> {
        let (wal, entries) = Wal::open(path)?;
        let mut state = MaterializedState::default();
        for entry in &entries {
            state.apply(entry.seq, &entry.op);
        }
        tracing::info!(path = %path.display(), entries = entries.len(), "opened channel store");

        let mut inner = Inner {
            path: path.to_path_buf(),
            wal,
            state,
            entries: entries.len(),
            threshold: threshold.max(1),
        };
        if inner.state.snapshot().len() < inner.entries {
            inner.compact()?;
        }
        Ok(Self {
            inner: Mutex::new(inner),
            wakers: Mutex::new(HashMap::new()),
        })
    }

    /// Unacknowledged records on `channel`, in publish order
    pub fn records(&self, channel: &str) -> Vec<StoredRecord> {
        self.lock().state.records(channel)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn waker(&self, channel: &str) -> Arc<Notify> {
        let mut wakers = self.wakers.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(wakers.entry(channel.to_string()).or_default())
    }

    fn require(&self, inner: &Inner, channel: &str, id: u64) -> Result<(), ChannelError> {
        if inner.state.contains(channel, id) {
            Ok(())
        } else {
            Err(ChannelError::UnknownRecord {
                channel: channel.to_string(),
                id,
            })
        }
    }
}

#[async_trait]
impl DurableChannel for WalChannel {
    async fn publish(
        &self,
        channel: &str,
        record: Record,
    ) -> Result<PublishOutcome, ChannelError> {
        let outcome = {
            let mut inner = self.lock();
            if inner
                .state
                .is_duplicate(channel, &record.producer, record.seq)
            {
                tracing::debug!(
                    channel,
                    producer = %record.producer,
                    seq = record.seq,
                    "duplicate publish ignored"
                );
                PublishOutcome::Duplicate
            } else {
                let id = inner.persist(Operation::Publish {
                    channel: channel.to_string(),
                    producer: record.producer,
                    seq: record.seq,
                    payload: record.payload,
                })?;
                PublishOutcome::Stored(id)
            }
        };
        if let PublishOutcome::Stored(_) = outcome {
            self.waker(channel).notify_one();
        }
        Ok(outcome)
    }

    async fn claim(&self, channel: &str) -> Result<Option<Delivery>, ChannelError> {
        let mut inner = self.lock();
        let Some(record) = inner.state.claim_next(channel) else {
            return Ok(None);
        };
        if let Err(e) = inner.persist(Operation::Deliver {
            channel: channel.to_string(),
            id: record.id,
        }) {
            inner.state.release(channel, record.id);
            return Err(e);
        }
        Ok(Some(Delivery {
            id: record.id,
            attempt: record.attempts + 1,
            payload: record.payload,
        }))
    }

    async fn ack(&self, channel: &str, id: u64) -> Result<(), ChannelError> {
        {
            let mut inner = self.lock();
            self.require(&inner, channel, id)?;
            let acked = inner.persist(Operation::Ack {
                channel: channel.to_string(),
                id,
            });
            if let Err(e) = acked {
                inner.state.release(channel, id);
                return Err(e);
            }
        }
        // The producer's next record may now be claimable
        self.waker(channel).notify_one();
        Ok(())
    }

    async fn release(&self, channel: &str, id: u64) -> Result<(), ChannelError> {
        {
            let mut inner = self.lock();
            self.require(&inner, channel, id)?;
            inner.state.release(channel, id);
        }
        self.waker(channel).notify_one();
        Ok(())
    }

    async fn dead_letter(
        &self,
        channel: &str,
        id: u64,
        reason: &str,
    ) -> Result<(), ChannelError> {
        let dead = crate::dead_letter_channel(channel);
        {
            let mut inner = self.lock();
            self.require(&inner, channel, id)?;
            let moved = inner.persist(Operation::DeadLetter {
                channel: channel.to_string(),
                id,
                reason: reason.to_string(),
            });
            if let Err(e) = moved {
                inner.state.release(channel, id);
                return Err(e);
            }
        }
        tracing::warn!(channel, id, reason, "record moved to {}", dead);
        self.waker(channel).notify_one();
        self.waker(&dead).notify_one();
        Ok(())
    }

    async fn depth(&self, channel: &str) -> Result<usize, ChannelError> {
        Ok(self.lock().state.depth(channel))
    }

    async fn wait(&self, channel: &str) {
        self.waker(channel).notified().await;
    }
}

#[cfg(test)]
#[path = "wal_channel_tests.rs"]
mod tests;
