// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::codec::Codec;
use crate::test_support::{eventually, fast_delivery, open_store, FlakyChannel};
use sj_core::{Parameters, SequentialIdGen, Value};
use sj_rules::{parse_rules, RuleSet};
use std::sync::atomic::Ordering;

const RULES: &str = r#"
[[rule]]
name = "notify-success"
signal.sensor = "build.completed"
action.id = "notify"
action.parameters.msg = "Project {{signal.project}} built ok"

[[rule.condition]]
parameter = "status"
kind = "equals"
value = "success"
"#;

fn engine() -> RuleEngine {
    let rules = Arc::new(RuleSet::new());
    rules.upsert_file("notify.toml", parse_rules(RULES).unwrap());
    RuleEngine::new(rules)
}

fn build_signal(status: &str) -> Signal {
    let params: Parameters = [("status", status), ("project", "demo")].into_iter().collect();
    Signal::new("build.completed", params).unwrap()
}

#[tokio::test]
async fn matched_jobs_are_published() {
    let store = open_store();
    let jobs = Publisher::new(store.channel.clone(), &SequentialIdGen::new("engine"));
    let runtime = Runtime::new(engine(), jobs, fast_delivery(3));

    assert_eq!(runtime.process_signal(&build_signal("success")).await, 1);
    assert_eq!(runtime.process_signal(&build_signal("failed")).await, 0);

    let records = store.channel.records("jobs");
    assert_eq!(records.len(), 1);
    let job = JobCodec::from_payload(records[0].payload.clone()).unwrap();
    assert_eq!(job.action().as_str(), "notify");
    assert_eq!(job.parameter("msg"), Some(&Value::from("Project demo built ok")));
}

#[tokio::test]
async fn job_publish_is_retried() {
    let store = open_store();
    let flaky = Arc::new(FlakyChannel::new(store.channel.clone(), 2));
    let jobs = Publisher::new(flaky.clone(), &SequentialIdGen::new("engine"));
    let runtime = Runtime::new(engine(), jobs, fast_delivery(3));

    assert_eq!(runtime.process_signal(&build_signal("success")).await, 1);
    assert_eq!(flaky.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(store.channel.records("jobs").len(), 1);
}

#[tokio::test]
async fn job_is_dropped_after_publish_attempts_run_out() {
    let store = open_store();
    let flaky = Arc::new(FlakyChannel::new(store.channel.clone(), 5));
    let jobs = Publisher::new(flaky.clone(), &SequentialIdGen::new("engine"));
    let runtime = Runtime::new(engine(), jobs, fast_delivery(3));

    assert_eq!(runtime.process_signal(&build_signal("success")).await, 0);
    assert_eq!(flaky.attempts.load(Ordering::SeqCst), 3);
    assert!(store.channel.records("jobs").is_empty());
}

#[tokio::test]
async fn durable_signals_flow_through_to_jobs() {
    let store = open_store();
    let jobs = Publisher::new(store.channel.clone(), &SequentialIdGen::new("engine"));
    let runtime = Arc::new(Runtime::new(engine(), jobs, fast_delivery(3)));
    let intake = runtime.subscribe(store.channel.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = {
        let runtime = Arc::clone(&runtime);
        tokio::spawn(async move { runtime.run(shutdown_rx).await })
    };

    let sensor: Publisher<SignalCodec> =
        Publisher::new(store.channel.clone(), &SequentialIdGen::new("sensor"));
    sensor.publish(&build_signal("success")).await.unwrap();
    sensor.publish(&build_signal("failed")).await.unwrap();
    sensor.publish(&build_signal("success")).await.unwrap();

    assert!(eventually(|| store.channel.records("jobs").len() == 2).await);
    assert!(eventually(|| store.channel.records("signals").is_empty()).await);

    shutdown_tx.send(true).unwrap();
    running.await.unwrap();
    intake.stop().await;
}

#[tokio::test]
async fn queued_signal_survives_a_restart() {
    let store = open_store();
    let jobs = Publisher::new(store.channel.clone(), &SequentialIdGen::new("engine"));
    let runtime = Runtime::new(engine(), jobs, fast_delivery(3));
    // the signal loop never runs
    let intake = runtime.subscribe(store.channel.clone());

    let sensor: Publisher<SignalCodec> =
        Publisher::new(store.channel.clone(), &SequentialIdGen::new("sensor"));
    sensor.publish(&build_signal("success")).await.unwrap();

    assert!(eventually(|| store.channel.records("signals")[0].attempts == 1).await);
    tokio::time::timeout(std::time::Duration::from_secs(2), intake.stop())
        .await
        .unwrap();

    let restarted = store.reopen();
    assert_eq!(restarted.records("signals").len(), 1);
    assert!(restarted.records("jobs").is_empty());
}

#[tokio::test]
async fn signal_is_redelivered_when_jobs_cannot_be_published() {
    let store = open_store();
    let flaky = Arc::new(FlakyChannel::new(store.channel.clone(), 4));
    let jobs = Publisher::new(flaky.clone(), &SequentialIdGen::new("engine"));
    let runtime = Arc::new(Runtime::new(engine(), jobs, fast_delivery(3)));
    let intake = runtime.subscribe(store.channel.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = {
        let runtime = Arc::clone(&runtime);
        tokio::spawn(async move { runtime.run(shutdown_rx).await })
    };

    let sensor: Publisher<SignalCodec> =
        Publisher::new(store.channel.clone(), &SequentialIdGen::new("sensor"));
    sensor.publish(&build_signal("success")).await.unwrap();

    // first delivery exhausts three publish attempts, the second gets through
    assert!(eventually(|| store.channel.records("jobs").len() == 1).await);
    assert!(eventually(|| store.channel.records("signals").is_empty()).await);
    assert!(store.channel.records("signals.dead").is_empty());
    assert_eq!(flaky.attempts.load(Ordering::SeqCst), 5);

    shutdown_tx.send(true).unwrap();
    running.await.unwrap();
    intake.stop().await;
}
