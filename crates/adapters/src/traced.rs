// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced action wrapper for consistent observability

use async_trait::async_trait;
use sj_core::{ActionError, ActionHandler, Job};
use tracing::Instrument;

/// Wrapper that adds tracing to any ActionHandler
#[derive(Clone)]
pub struct TracedAction<A> {
    inner: A,
}

impl<A> TracedAction<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: ActionHandler> ActionHandler for TracedAction<A> {
    async fn invoke(&self, job: &Job) -> Result<(), ActionError> {
        let span = tracing::info_span!("action.invoke", action = %job.action());

        async {
            tracing::info!(param_count = job.parameters().len(), "starting");

            let start = std::time::Instant::now();
            let result = self.inner.invoke(job).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "succeeded"),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "invocation failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
