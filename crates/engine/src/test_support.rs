// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for engine tests

use async_trait::async_trait;
use sj_storage::{ChannelError, Delivery, DurableChannel, PublishOutcome, Record, WalChannel};
use std::sync::atomic::{AtomicU32, Ordering};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A WAL-backed channel in a temp dir that lives as long as the value
pub struct TestStore {
    pub channel: Arc<WalChannel>,
    pub path: PathBuf,
    _dir: TempDir,
}

impl TestStore {
    /// Open the same log again, as a restarted process would
    pub fn reopen(&self) -> WalChannel {
        WalChannel::open(&self.path).unwrap()
    }
}

pub fn open_store() -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("channels.wal");
    let channel = Arc::new(WalChannel::open(&path).unwrap());
    TestStore {
        channel,
        path,
        _dir: dir,
    }
}

/// Delivery policy with short backoff so retries finish quickly
pub fn fast_delivery(max_attempts: u32) -> crate::DeliveryConfig {
    crate::DeliveryConfig {
        max_attempts,
        initial_backoff: Duration::from_millis(5),
        max_backoff: Duration::from_millis(20),
        multiplier: 2,
    }
}

/// Rejects the first `failures` publishes (and the first `ack_failures`
/// acks), then forwards to the inner channel
pub struct FlakyChannel {
    inner: Arc<WalChannel>,
    failures: AtomicU32,
    ack_failures: AtomicU32,
    pub attempts: AtomicU32,
}

impl FlakyChannel {
    pub fn new(inner: Arc<WalChannel>, failures: u32) -> Self {
        Self {
            inner,
            failures: AtomicU32::new(failures),
            ack_failures: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
        }
    }

    pub fn failing_acks(inner: Arc<WalChannel>, ack_failures: u32) -> Self {
        let channel = Self::new(inner, 0);
        channel.ack_failures.store(ack_failures, Ordering::SeqCst);
        channel
    }
}

/// Take one from `counter` if it is positive
fn take(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl DurableChannel for FlakyChannel {
    async fn publish(
        &self,
        channel: &str,
        record: Record,
    ) -> Result<PublishOutcome, ChannelError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if take(&self.failures) {
            return Err(ChannelError::Unavailable("store offline".to_string()));
        }
        self.inner.publish(channel, record).await
    }

    async fn claim(&self, channel: &str) -> Result<Option<Delivery>, ChannelError> {
        self.inner.claim(channel).await
    }

    async fn ack(&self, channel: &str, id: u64) -> Result<(), ChannelError> {
        if take(&self.ack_failures) {
            return Err(ChannelError::Unavailable("store offline".to_string()));
        }
        self.inner.ack(channel, id).await
    }

    async fn release(&self, channel: &str, id: u64) -> Result<(), ChannelError> {
        self.inner.release(channel, id).await
    }

    async fn dead_letter(
        &self,
        channel: &str,
        id: u64,
        reason: &str,
    ) -> Result<(), ChannelError> {
        self.inner.dead_letter(channel, id, reason).await
    }

    async fn depth(&self, channel: &str) -> Result<usize, ChannelError> {
        self.inner.depth(channel).await
    }

    async fn wait(&self, channel: &str) {
        self.inner.wait(channel).await
    }
}

/// Poll `check` until it holds or two seconds pass
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}
