// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write as _;

fn publish(seq: u64) -> Operation {
    Operation::Publish {
        channel: "signals".to_string(),
        producer: "p".to_string(),
        seq,
        payload: serde_json::json!({ "n": seq }),
    }
}

#[test]
fn wal_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let (mut wal, existing) = Wal::open(&path).unwrap();
        assert!(existing.is_empty());
        wal.append(&publish(1)).unwrap();
        wal.append(&Operation::Ack {
            channel: "signals".to_string(),
            id: 1,
        })
        .unwrap();
    }

    let entries = Wal::replay(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 1);
    assert!(matches!(entries[0].op, Operation::Publish { .. }));
    assert!(matches!(entries[1].op, Operation::Ack { .. }));
}

#[test]
fn wal_sequence_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let (mut wal, _) = Wal::open(&path).unwrap();
        assert_eq!(wal.sequence(), 0);
        wal.append(&publish(1)).unwrap();
        assert_eq!(wal.sequence(), 1);
    }

    let (mut wal, entries) = Wal::open(&path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(wal.sequence(), 1);
    assert_eq!(wal.append(&publish(2)).unwrap(), 2);
}

#[test]
fn wal_replay_nonexistent() {
    let path = Path::new("/nonexistent/path/wal");
    assert!(Wal::replay(path).unwrap().is_empty());
}

#[test]
fn wal_truncates_torn_tail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let (mut wal, _) = Wal::open(&path).unwrap();
        wal.append(&publish(1)).unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "{{\"seq\":2,\"op\":").unwrap();
    }

    let (mut wal, entries) = Wal::open(&path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(wal.append(&publish(2)).unwrap(), 2);
    assert_eq!(Wal::replay(&path).unwrap().len(), 2);
}

#[test]
fn wal_rejects_corruption_before_tail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let (mut wal, _) = Wal::open(&path).unwrap();
        wal.append(&publish(1)).unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file, "{}", serde_json::to_string(&WalEntry { seq: 3, op: publish(3) }).unwrap())
            .unwrap();
    }
    assert!(matches!(
        Wal::replay(&path),
        Err(WalError::Corrupt { line: 2 })
    ));
}

#[test]
fn rewrite_replaces_log_and_keeps_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let (mut wal, _) = Wal::open(&path).unwrap();
        for seq in 1..=5 {
            wal.append(&publish(seq)).unwrap();
        }
    }

    let mut wal = Wal::rewrite(&path, 5, &[publish(5)]).unwrap();
    assert_eq!(wal.sequence(), 5);
    assert_eq!(wal.append(&publish(6)).unwrap(), 6);

    let entries = Wal::replay(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].seq, 6);
    assert!(!path.with_extension("compact").exists());
}
