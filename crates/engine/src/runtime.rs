// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal processing loop
//!
//! Signals arrive through a durable processor that enqueues them and waits.
//! This loop drains the queue one signal at a time, matches it against the
//! rule set and publishes the resulting jobs, then reports back so the
//! durable signal is acknowledged. Rule evaluation for a signal is never
//! interleaved with another signal's.

use crate::codec::{JobCodec, SignalCodec};
use crate::delivery::DeliveryConfig;
use crate::error::RuntimeError;
use crate::intake::{Completion, QueueIntake};
use crate::processor::{HandlerError, Processor, ProcessorHandle};
use crate::publisher::{PublishError, Publisher};
use crate::rule_engine::RuleEngine;
use sj_core::{Job, Signal, SignalQueue, Traced};
use sj_storage::DurableChannel;
use std::sync::Arc;
use tokio::sync::{watch, Notify};

pub struct Runtime {
    engine: RuleEngine,
    signals: Arc<SignalQueue<Completion>>,
    ready: Arc<Notify>,
    jobs: Publisher<JobCodec>,
    delivery: DeliveryConfig,
}

impl Runtime {
    pub fn new(engine: RuleEngine, jobs: Publisher<JobCodec>, delivery: DeliveryConfig) -> Self {
        Self {
            engine,
            signals: Arc::new(SignalQueue::new()),
            ready: Arc::new(Notify::new()),
            jobs,
            delivery,
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Start the durable processor that feeds this runtime's signal queue
    pub fn subscribe(&self, channel: Arc<dyn DurableChannel>) -> ProcessorHandle {
        Processor::<SignalCodec>::new(channel, self.delivery.clone()).start(QueueIntake::new(
            Arc::clone(&self.signals),
            Arc::clone(&self.ready),
        ))
    }

    /// Drain the signal queue until `shutdown` flips to true
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            while let Some((signal, done)) = self.signals.dequeue_with() {
                let (matched, published) = self.evaluate(&signal).await;
                let result = if published == matched {
                    Ok(())
                } else {
                    Err(HandlerError::Transient(format!(
                        "{} of {} jobs not published",
                        matched - published,
                        matched
                    )))
                };
                // The intake may have given up already
                let _ = done.send(result);
            }
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = self.ready.notified() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }

    /// Match one signal and publish its jobs. Returns the number published.
    pub async fn process_signal(&self, signal: &Signal) -> usize {
        self.evaluate(signal).await.1
    }

    /// Returns the number of jobs built and the number published
    async fn evaluate(&self, signal: &Signal) -> (usize, usize) {
        let jobs = self.engine.match_and_build_jobs(signal);
        tracing::info!(signal = ?signal.fields(), jobs = jobs.len(), "signal matched");

        let mut published = 0;
        for job in &jobs {
            match self.publish_job(job).await {
                Ok(()) => published += 1,
                Err(e) => {
                    tracing::error!(action = %job.action(), error = %e, "dropping job");
                }
            }
        }
        (jobs.len(), published)
    }

    /// Publish with the delivery backoff until the attempt bound
    async fn publish_job(&self, job: &Job) -> Result<(), RuntimeError> {
        let mut attempt = 1;
        loop {
            match self.jobs.publish(job).await {
                Ok(_) => return Ok(()),
                Err(e @ PublishError::Codec(_)) => return Err(e.into()),
                Err(e) if self.delivery.can_retry(attempt) => {
                    let delay = self.delivery.backoff(attempt);
                    tracing::warn!(
                        action = %job.action(),
                        attempt,
                        error = %e,
                        "job publish failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
