// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory FIFO buffers
//!
//! Hand-off point between durable delivery and a processing loop. The
//! buffer is unbounded; back-pressure belongs to the durable layer.

use crate::job::Job;
use crate::signal::Signal;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("cannot enqueue a blank {0}")]
    BlankItem(&'static str),
}

/// Items that can be placed on a [`Fifo`]
pub trait QueueItem {
    /// Kind name used in errors
    const KIND: &'static str;

    /// True when the item carries no usable identity
    fn is_blank(&self) -> bool;
}

impl QueueItem for Signal {
    const KIND: &'static str = "signal";

    fn is_blank(&self) -> bool {
        self.sensor().is_empty()
    }
}

impl QueueItem for Job {
    const KIND: &'static str = "job";

    fn is_blank(&self) -> bool {
        self.action().is_empty()
    }
}

/// Thread-safe FIFO queue
///
/// Each item may carry a receipt `R` that travels with it, used by
/// consumers to report back once the item has been handled.
#[derive(Debug)]
pub struct Fifo<T, R = ()> {
    items: Mutex<VecDeque<(T, R)>>,
}

pub type SignalQueue<R = ()> = Fifo<Signal, R>;
pub type JobQueue<R = ()> = Fifo<Job, R>;

impl<T: QueueItem> Fifo<T> {
    /// Append to the tail
    pub fn enqueue(&self, item: T) -> Result<(), QueueError> {
        self.enqueue_with(item, ())
    }

    /// Remove the head, or `None` when empty
    pub fn dequeue(&self) -> Option<T> {
        self.dequeue_with().map(|(item, ())| item)
    }
}

impl<T: QueueItem, R> Fifo<T, R> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Append an item and its receipt to the tail
    pub fn enqueue_with(&self, item: T, receipt: R) -> Result<(), QueueError> {
        if item.is_blank() {
            return Err(QueueError::BlankItem(T::KIND));
        }
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back((item, receipt));
        Ok(())
    }

    /// Remove the head with its receipt
    pub fn dequeue_with(&self) -> Option<(T, R)> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<T: QueueItem, R> Default for Fifo<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
