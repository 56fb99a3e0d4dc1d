// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable processor
//!
//! Claims records from one channel, decodes them, and hands each item to a
//! handler. A record is acknowledged only after the handler succeeds, so a
//! crash mid-handling redelivers it. A claim whose settlement fails in the
//! store is released so later records from the same producer still flow. Transient failures are redelivered
//! with backoff until the attempt bound; permanent failures and undecodable
//! payloads go straight to the dead-letter channel.

use crate::codec::Codec;
use crate::delivery::DeliveryConfig;
use async_trait::async_trait;
use sj_storage::{Delivery, DurableChannel};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Poll interval used when no wake-up arrives
const IDLE_POLL: Duration = Duration::from_secs(1);

/// Failure classification chosen by the handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("transient: {0}")]
    Transient(String),
    #[error("permanent: {0}")]
    Permanent(String),
}

#[async_trait]
pub trait ItemHandler<T>: Send + Sync + 'static {
    async fn handle(&self, item: T) -> Result<(), HandlerError>;
}

pub struct Processor<C: Codec> {
    channel: Arc<dyn DurableChannel>,
    config: DeliveryConfig,
    _codec: PhantomData<fn() -> C>,
}

/// Running processor task
pub struct ProcessorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ProcessorHandle {
    /// Stop claiming new records and wait for the current one to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "processor task failed");
        }
    }
}

/// Stop was requested, or the handle was dropped
fn stopped(stop: &watch::Receiver<bool>) -> bool {
    *stop.borrow() || stop.has_changed().is_err()
}

enum Step {
    Handled,
    Idle,
}

impl<C: Codec> Processor<C> {
    pub fn new(channel: Arc<dyn DurableChannel>, config: DeliveryConfig) -> Self {
        Self {
            channel,
            config,
            _codec: PhantomData,
        }
    }

    /// Spawn the processing loop
    pub fn start<H: ItemHandler<C::Item>>(self, handler: H) -> ProcessorHandle {
        let (shutdown, mut stop) = watch::channel(false);
        let task = tokio::spawn(async move {
            tracing::info!(channel = C::CHANNEL, "processor started");
            loop {
                if stopped(&stop) {
                    break;
                }
                match self.step(&handler, &mut stop).await {
                    Ok(Step::Handled) => {}
                    Ok(Step::Idle) => {
                        tokio::select! {
                            _ = self.channel.wait(C::CHANNEL) => {}
                            _ = tokio::time::sleep(IDLE_POLL) => {}
                            _ = stop.changed() => {}
                        }
                    }
                    Err(e) => {
                        tracing::error!(channel = C::CHANNEL, error = %e, "delivery failed");
                        tokio::select! {
                            _ = tokio::time::sleep(self.config.initial_backoff) => {}
                            _ = stop.changed() => {}
                        }
                    }
                }
            }
            tracing::info!(channel = C::CHANNEL, "processor stopped");
        });
        ProcessorHandle { shutdown, task }
    }

    /// Claim and handle at most one record
    async fn step<H: ItemHandler<C::Item>>(
        &self,
        handler: &H,
        stop: &mut watch::Receiver<bool>,
    ) -> Result<Step, sj_storage::ChannelError> {
        let Some(delivery) = self.channel.claim(C::CHANNEL).await? else {
            return Ok(Step::Idle);
        };
        self.deliver(handler, delivery, stop).await?;
        Ok(Step::Handled)
    }

    async fn deliver<H: ItemHandler<C::Item>>(
        &self,
        handler: &H,
        delivery: Delivery,
        stop: &mut watch::Receiver<bool>,
    ) -> Result<(), sj_storage::ChannelError> {
        let Delivery {
            id,
            attempt,
            payload,
        } = delivery;

        let settled = match C::from_payload(payload) {
            Ok(item) => {
                let outcome = tokio::select! {
                    biased;
                    outcome = handler.handle(item) => outcome,
                    _ = stop.changed() => {
                        // Left claimed and unacknowledged; delivered again on restart
                        tracing::info!(channel = C::CHANNEL, id, "stopped while handling");
                        return Ok(());
                    }
                };
                self.settle(id, attempt, outcome, stop).await
            }
            Err(e) => {
                let reason = format!("undecodable payload: {}", e);
                self.channel.dead_letter(C::CHANNEL, id, &reason).await
            }
        };

        if let Err(e) = settled {
            // Give the claim back so the producer's later records stay deliverable
            if let Err(release) = self.channel.release(C::CHANNEL, id).await {
                tracing::error!(channel = C::CHANNEL, id, error = %release, "release failed");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Acknowledge, redeliver or dead-letter according to the handler outcome
    async fn settle(
        &self,
        id: u64,
        attempt: u32,
        outcome: Result<(), HandlerError>,
        stop: &mut watch::Receiver<bool>,
    ) -> Result<(), sj_storage::ChannelError> {
        match outcome {
            Ok(()) => self.channel.ack(C::CHANNEL, id).await,
            Err(HandlerError::Transient(message)) if self.config.can_retry(attempt) => {
                let delay = self.config.backoff(attempt);
                tracing::warn!(
                    channel = C::CHANNEL,
                    id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %message,
                    "transient failure, redelivering"
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = stop.changed() => {}
                }
                self.channel.release(C::CHANNEL, id).await
            }
            Err(HandlerError::Transient(message)) => {
                let reason = format!("gave up after {} attempts: {}", attempt, message);
                self.channel.dead_letter(C::CHANNEL, id, &reason).await
            }
            Err(HandlerError::Permanent(message)) => {
                self.channel.dead_letter(C::CHANNEL, id, &message).await
            }
        }
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
