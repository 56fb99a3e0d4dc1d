// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log

use serde::{Deserialize, Serialize};

/// Operations that can be persisted to the WAL
///
/// A record's id is the WAL sequence number of its `Publish` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Store a record on a channel
    Publish {
        channel: String,
        producer: String,
        seq: u64,
        payload: serde_json::Value,
    },

    /// A record was handed to a processor (counts as one delivery attempt)
    Deliver { channel: String, id: u64 },

    /// A record was handled and can be forgotten
    Ack { channel: String, id: u64 },

    /// Move a record to the channel's dead-letter channel
    DeadLetter {
        channel: String,
        id: u64,
        reason: String,
    },

    /// Reinstate an unacknowledged record as it stood when the log was
    /// compacted
    Restore {
        channel: String,
        id: u64,
        producer: String,
        seq: u64,
        payload: serde_json::Value,
        attempts: u32,
        reason: Option<String>,
    },

    /// Highest seq accepted from a producer, kept across compaction so
    /// republished records are still recognized as duplicates
    Watermark {
        channel: String,
        producer: String,
        seq: u64,
    },
}

impl Operation {
    pub fn channel(&self) -> &str {
        match self {
            Operation::Publish { channel, .. }
            | Operation::Deliver { channel, .. }
            | Operation::Ack { channel, .. }
            | Operation::DeadLetter { channel, .. }
            | Operation::Restore { channel, .. }
            | Operation::Watermark { channel, .. } => channel,
        }
    }
}

/// Name of the channel that receives dead letters from `channel`
pub fn dead_letter_channel(channel: &str) -> String {
    format!("{}.dead", channel)
}
