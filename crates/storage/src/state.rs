// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel state materialized from WAL replay

use crate::operation::{dead_letter_channel, Operation};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A record waiting on a channel
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: u64,
    pub producer: String,
    pub seq: u64,
    pub payload: serde_json::Value,
    /// Delivery attempts made so far
    pub attempts: u32,
    /// Why the record was dead-lettered, for records on a dead-letter channel
    pub reason: Option<String>,
}

#[derive(Debug, Default)]
struct ChannelQueue {
    /// Unacknowledged records ordered by id (publish order)
    pending: BTreeMap<u64, StoredRecord>,
    /// Highest seq accepted from each producer
    last_seq: HashMap<String, u64>,
    /// Records currently handed to a processor. Not persisted: after a
    /// restart every unacknowledged record is pending again.
    in_flight: HashSet<u64>,
}

/// Materialized state built from WAL operations
#[derive(Debug, Default)]
pub struct MaterializedState {
    channels: HashMap<String, ChannelQueue>,
}

impl MaterializedState {
    /// True if `producer` already published `seq` (or a later record) on
    /// `channel`
    pub fn is_duplicate(&self, channel: &str, producer: &str, seq: u64) -> bool {
        self.channels
            .get(channel)
            .and_then(|q| q.last_seq.get(producer))
            .is_some_and(|last| seq <= *last)
    }

    /// Apply an operation that was written with WAL sequence `entry_seq`
    pub fn apply(&mut self, entry_seq: u64, op: &Operation) {
        match op {
            Operation::Publish {
                channel,
                producer,
                seq,
                payload,
            } => {
                if self.is_duplicate(channel, producer, *seq) {
                    return;
                }
                let queue = self.channels.entry(channel.clone()).or_default();
                queue.last_seq.insert(producer.clone(), *seq);
                queue.pending.insert(
                    entry_seq,
                    StoredRecord {
                        id: entry_seq,
                        producer: producer.clone(),
                        seq: *seq,
                        payload: payload.clone(),
                        attempts: 0,
                        reason: None,
                    },
                );
            }

            Operation::Deliver { channel, id } => {
                if let Some(record) = self
                    .channels
                    .get_mut(channel)
                    .and_then(|q| q.pending.get_mut(id))
                {
                    record.attempts += 1;
                }
            }

            Operation::Ack { channel, id } => {
                if let Some(queue) = self.channels.get_mut(channel) {
                    queue.pending.remove(id);
                    queue.in_flight.remove(id);
                }
            }

            Operation::DeadLetter {
                channel,
                id,
                reason,
            } => {
                let Some(queue) = self.channels.get_mut(channel) else {
                    return;
                };
                queue.in_flight.remove(id);
                let Some(mut record) = queue.pending.remove(id) else {
                    return;
                };
                record.reason = Some(reason.clone());
                self.channels
                    .entry(dead_letter_channel(channel))
                    .or_default()
                    .pending
                    .insert(record.id, record);
            }

            Operation::Restore {
                channel,
                id,
                producer,
                seq,
                payload,
                attempts,
                reason,
            } => {
                self.channels.entry(channel.clone()).or_default().pending.insert(
                    *id,
                    StoredRecord {
                        id: *id,
                        producer: producer.clone(),
                        seq: *seq,
                        payload: payload.clone(),
                        attempts: *attempts,
                        reason: reason.clone(),
                    },
                );
            }

            Operation::Watermark {
                channel,
                producer,
                seq,
            } => {
                let last = self
                    .channels
                    .entry(channel.clone())
                    .or_default()
                    .last_seq
                    .entry(producer.clone())
                    .or_insert(0);
                *last = (*last).max(*seq);
            }
        }
    }

    /// Operations that rebuild this state from an empty log: one watermark
    /// per producer and one restore per unacknowledged record, channels in
    /// name order
    pub fn snapshot(&self) -> Vec<Operation> {
        let mut channels: Vec<_> = self.channels.iter().collect();
        channels.sort_by(|a, b| a.0.cmp(b.0));

        let mut ops = Vec::new();
        for (channel, queue) in channels {
            let mut producers: Vec<_> = queue.last_seq.iter().collect();
            producers.sort();
            ops.extend(producers.into_iter().map(|(producer, seq)| Operation::Watermark {
                channel: channel.clone(),
                producer: producer.clone(),
                seq: *seq,
            }));
            ops.extend(queue.pending.values().map(|record| Operation::Restore {
                channel: channel.clone(),
                id: record.id,
                producer: record.producer.clone(),
                seq: record.seq,
                payload: record.payload.clone(),
                attempts: record.attempts,
                reason: record.reason.clone(),
            }));
        }
        ops
    }

    /// Oldest pending record that is not in flight and whose producer has
    /// nothing in flight. Marks it in flight.
    pub fn claim_next(&mut self, channel: &str) -> Option<StoredRecord> {
        let queue = self.channels.get_mut(channel)?;
        let busy: HashSet<&str> = queue
            .in_flight
            .iter()
            .filter_map(|id| queue.pending.get(id))
            .map(|r| r.producer.as_str())
            .collect();
        let record = queue
            .pending
            .values()
            .find(|r| !queue.in_flight.contains(&r.id) && !busy.contains(r.producer.as_str()))?
            .clone();
        queue.in_flight.insert(record.id);
        Some(record)
    }

    /// Return an in-flight record to the pending set
    pub fn release(&mut self, channel: &str, id: u64) -> bool {
        self.channels
            .get_mut(channel)
            .is_some_and(|q| q.in_flight.remove(&id))
    }

    pub fn contains(&self, channel: &str, id: u64) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|q| q.pending.contains_key(&id))
    }

    pub fn is_in_flight(&self, channel: &str, id: u64) -> bool {
        self.channels
            .get(channel)
            .is_some_and(|q| q.in_flight.contains(&id))
    }

    /// Number of unacknowledged records (pending or in flight)
    pub fn depth(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, |q| q.pending.len())
    }

    /// Unacknowledged records in publish order
    pub fn records(&self, channel: &str) -> Vec<StoredRecord> {
        self.channels
            .get(channel)
            .map(|q| q.pending.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
