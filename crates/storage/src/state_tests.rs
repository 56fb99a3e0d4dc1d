// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn publish(channel: &str, producer: &str, seq: u64) -> Operation {
    Operation::Publish {
        channel: channel.to_string(),
        producer: producer.to_string(),
        seq,
        payload: serde_json::json!(seq),
    }
}

#[test]
fn duplicate_publish_is_ignored() {
    let mut state = MaterializedState::default();
    state.apply(1, &publish("c", "p", 1));
    assert!(state.is_duplicate("c", "p", 1));
    state.apply(2, &publish("c", "p", 1));
    assert_eq!(state.depth("c"), 1);
    assert!(!state.is_duplicate("c", "other", 1));
}

#[test]
fn claim_follows_publish_order() {
    let mut state = MaterializedState::default();
    state.apply(1, &publish("c", "a", 1));
    state.apply(2, &publish("c", "b", 1));
    assert_eq!(state.claim_next("c").map(|r| r.id), Some(1));
    assert_eq!(state.claim_next("c").map(|r| r.id), Some(2));
    assert!(state.claim_next("c").is_none());
}

#[test]
fn one_in_flight_record_per_producer() {
    let mut state = MaterializedState::default();
    state.apply(1, &publish("c", "a", 1));
    state.apply(2, &publish("c", "a", 2));
    state.apply(3, &publish("c", "b", 1));

    assert_eq!(state.claim_next("c").map(|r| r.id), Some(1));
    // a's second record waits for the first; b is free
    assert_eq!(state.claim_next("c").map(|r| r.id), Some(3));
    assert!(state.claim_next("c").is_none());

    state.apply(4, &Operation::Ack { channel: "c".to_string(), id: 1 });
    assert_eq!(state.claim_next("c").map(|r| r.id), Some(2));
}

#[test]
fn release_makes_record_claimable_again() {
    let mut state = MaterializedState::default();
    state.apply(1, &publish("c", "a", 1));
    let first = state.claim_next("c").unwrap();
    assert!(state.is_in_flight("c", first.id));
    assert!(state.release("c", first.id));
    assert_eq!(state.claim_next("c").map(|r| r.id), Some(1));
}

#[test]
fn deliver_counts_attempts() {
    let mut state = MaterializedState::default();
    state.apply(1, &publish("c", "a", 1));
    state.apply(2, &Operation::Deliver { channel: "c".to_string(), id: 1 });
    state.apply(3, &Operation::Deliver { channel: "c".to_string(), id: 1 });
    assert_eq!(state.records("c")[0].attempts, 2);
}

#[test]
fn dead_letter_moves_record() {
    let mut state = MaterializedState::default();
    state.apply(1, &publish("c", "a", 1));
    state.apply(
        2,
        &Operation::DeadLetter {
            channel: "c".to_string(),
            id: 1,
            reason: "bad payload".to_string(),
        },
    );
    assert_eq!(state.depth("c"), 0);
    let dead = state.records("c.dead");
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].reason.as_deref(), Some("bad payload"));
}

#[test]
fn snapshot_rebuilds_equivalent_state() {
    let mut state = MaterializedState::default();
    state.apply(1, &publish("c", "a", 1));
    state.apply(2, &publish("c", "a", 2));
    state.apply(3, &Operation::Deliver { channel: "c".to_string(), id: 2 });
    state.apply(4, &Operation::Ack { channel: "c".to_string(), id: 1 });
    state.apply(5, &publish("c", "b", 1));
    state.apply(
        6,
        &Operation::DeadLetter {
            channel: "c".to_string(),
            id: 5,
            reason: "poison".to_string(),
        },
    );

    let mut rebuilt = MaterializedState::default();
    for op in state.snapshot() {
        rebuilt.apply(6, &op);
    }

    assert_eq!(rebuilt.records("c"), state.records("c"));
    assert_eq!(rebuilt.records("c.dead"), state.records("c.dead"));
    assert_eq!(rebuilt.records("c")[0].attempts, 1);
    assert!(rebuilt.is_duplicate("c", "a", 2));
    assert!(rebuilt.is_duplicate("c", "b", 1));
    assert!(!rebuilt.is_duplicate("c", "a", 3));
}
