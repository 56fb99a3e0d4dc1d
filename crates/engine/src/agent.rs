// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job dispatch loop
//!
//! Jobs are delivered from the durable `jobs` channel into an in-memory
//! queue and dispatched in order to the registered actions. The durable
//! record is acknowledged once dispatch finishes, so a job queued or running
//! when the process dies is delivered again on restart. A failing or
//! panicking action is logged and the job counts as failed; it is not
//! retried here.

use crate::codec::JobCodec;
use crate::delivery::DeliveryConfig;
use crate::error::DispatchError;
use crate::intake::{Completion, QueueIntake};
use crate::processor::{Processor, ProcessorHandle};
use sj_core::{ActionStorage, Job, JobQueue, Traced};
use sj_storage::DurableChannel;
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tracing::Instrument;

/// Result of dispatching one job
#[derive(Debug)]
pub enum JobOutcome {
    Completed,
    Failed(DispatchError),
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed)
    }
}

pub struct Agent {
    actions: Arc<ActionStorage>,
    jobs: Arc<JobQueue<Completion>>,
    ready: Arc<Notify>,
}

impl Agent {
    pub fn new(actions: Arc<ActionStorage>) -> Self {
        Self {
            actions,
            jobs: Arc::new(JobQueue::new()),
            ready: Arc::new(Notify::new()),
        }
    }

    pub fn actions(&self) -> &Arc<ActionStorage> {
        &self.actions
    }

    /// Start the durable processor that feeds this agent's job queue
    pub fn subscribe(
        &self,
        channel: Arc<dyn DurableChannel>,
        delivery: DeliveryConfig,
    ) -> ProcessorHandle {
        Processor::<JobCodec>::new(channel, delivery).start(QueueIntake::new(
            Arc::clone(&self.jobs),
            Arc::clone(&self.ready),
        ))
    }

    /// Dispatch queued jobs until `shutdown` flips to true
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            while let Some((job, done)) = self.jobs.dequeue_with() {
                self.dispatch(job).await;
                let _ = done.send(Ok(()));
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

    /// Run one job to completion
    pub async fn dispatch(&self, job: Job) -> JobOutcome {
        let span = tracing::info_span!("action", action = %job.action());
        let start = std::time::Instant::now();
        let result = self.dispatch_inner(job).instrument(span.clone()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let _guard = span.enter();
        match result {
            Ok(()) => {
                tracing::info!(elapsed_ms, "completed");
                JobOutcome::Completed
            }
            Err(e) => {
                tracing::error!(elapsed_ms, error = %e, "failed");
                JobOutcome::Failed(e)
            }
        }
    }

    async fn dispatch_inner(&self, job: Job) -> Result<(), DispatchError> {
        let action = job.action().clone();
        let definition = self
            .actions
            .action(&action)
            .ok_or_else(|| DispatchError::UnknownAction(action.clone()))?;

        let missing = definition.missing_parameters(job.parameters());
        if !missing.is_empty() {
            return Err(DispatchError::MissingParameters {
                action,
                missing: missing.into_iter().map(String::from).collect(),
            });
        }

        tracing::info!(fields = ?job.fields(), "dispatching");
        let handler = definition.handler();
        let task = tokio::spawn(async move { handler.invoke(&job).await });
        match task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(DispatchError::Action { action, source }),
            Err(e) if e.is_panic() => Err(DispatchError::Panicked { action }),
            Err(_) => Err(DispatchError::Aborted { action }),
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
