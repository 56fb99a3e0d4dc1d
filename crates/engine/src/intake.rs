// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hand-off from a durable processor into an in-memory queue
//!
//! The intake does not return until the loop draining the queue has
//! finished the item, so the durable record is acknowledged only once the
//! item is handled. An item still queued or running when the process dies
//! is redelivered on restart.

use crate::processor::{HandlerError, ItemHandler};
use async_trait::async_trait;
use sj_core::{Fifo, QueueItem};
use std::sync::Arc;
use tokio::sync::{oneshot, Notify};

/// Sent by the draining loop once an item is finished
pub type Completion = oneshot::Sender<Result<(), HandlerError>>;

/// Enqueues each delivered item and wakes the loop that drains the queue
pub struct QueueIntake<T> {
    queue: Arc<Fifo<T, Completion>>,
    ready: Arc<Notify>,
}

impl<T> QueueIntake<T> {
    pub fn new(queue: Arc<Fifo<T, Completion>>, ready: Arc<Notify>) -> Self {
        Self { queue, ready }
    }
}

#[async_trait]
impl<T> ItemHandler<T> for QueueIntake<T>
where
    T: QueueItem + Send + 'static,
{
    async fn handle(&self, item: T) -> Result<(), HandlerError> {
        let (done, finished) = oneshot::channel();
        self.queue
            .enqueue_with(item, done)
            .map_err(|e| HandlerError::Permanent(e.to_string()))?;
        self.ready.notify_one();
        finished.await.unwrap_or_else(|_| {
            Err(HandlerError::Transient(
                "dropped before it was handled".to_string(),
            ))
        })
    }
}
