// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::{BTreeMap, HashMap};

#[test]
fn ids_compare_ordinally() {
    assert_eq!(ActionId::new("notify"), ActionId::from("notify"));
    assert_ne!(ActionId::new("notify"), ActionId::new("Notify"));
    assert!(SignalTypeId::new("a.b") < SignalTypeId::new("a.c"));
}

#[test]
fn ids_work_as_map_keys() {
    let mut map = HashMap::new();
    map.insert(ActionId::new("deploy"), 1);
    assert_eq!(map.get("deploy"), Some(&1));

    let mut ordered = BTreeMap::new();
    ordered.insert(SignalTypeId::new("z"), ());
    ordered.insert(SignalTypeId::new("a"), ());
    let keys: Vec<_> = ordered.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["a", "z"]);
}

#[test]
fn ids_serialize_as_plain_strings() {
    let json = serde_json::to_string(&SignalTypeId::new("build.completed")).unwrap();
    assert_eq!(json, "\"build.completed\"");
    let back: SignalTypeId = serde_json::from_str(&json).unwrap();
    assert_eq!(back.as_str(), "build.completed");
}
