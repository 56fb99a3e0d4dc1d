// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::server::handle_request;
use sj_core::{ActionId, Parameters, SignalTypeId};
use sj_daemon::{Query, Request, Response};
use std::time::Duration;
use tempfile::TempDir;

const SETTINGS: &str = r#"
[delivery]
max_attempts = 2
initial_backoff = "10ms"
max_backoff = "50ms"

[[action]]
id = "record"
command = "printf '%s' \"$SJ_PARAM_MSG\" > out.txt"
parameters = [{ name = "msg", required = true }]
"#;

const RULES: &str = r#"
[[rule]]
name = "record-green-builds"
signal.sensor = "build.completed"

[[rule.condition]]
parameter = "status"
kind = "equals"
value = "success"

[rule.action]
id = "record"
parameters = { msg = "built {{signal.project}}" }
"#;

fn project() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("sj.toml"), SETTINGS).unwrap();
    std::fs::create_dir_all(dir.path().join("rules")).unwrap();
    std::fs::write(dir.path().join("rules/builds.toml"), RULES).unwrap();
    let config = Config::with_state_dir(dir.path(), None).unwrap();
    (dir, config)
}

fn emit(sensor: &str, params: &[(&str, &str)]) -> Request {
    Request::Emit {
        sensor: SignalTypeId::new(sensor),
        parameters: params.iter().copied().collect::<Parameters>(),
    }
}

async fn wait_for_file(path: &Path) -> Option<String> {
    for _ in 0..200 {
        if let Ok(content) = std::fs::read_to_string(path) {
            if !content.is_empty() {
                return Some(content);
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    None
}

#[tokio::test]
async fn startup_registers_actions_and_rules() {
    let (_dir, config) = project();
    let mut daemon = startup(&config).await.unwrap();

    assert!(config.socket_path.exists());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());

    assert!(daemon.actions.has_action_for("log"));
    assert!(daemon.actions.has_action_for("record"));
    assert_eq!(daemon.rules.len(), 1);

    daemon.shutdown().await.unwrap();
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}

#[tokio::test]
async fn emitted_signal_runs_matching_shell_action() {
    let (dir, config) = project();
    let mut daemon = startup(&config).await.unwrap();

    let response = handle_request(
        &mut daemon,
        emit(
            "build.completed",
            &[("status", "success"), ("Project", "demo")],
        ),
    )
    .await;
    assert!(matches!(response, Response::Emitted { id: Some(_) }));

    let written = wait_for_file(&dir.path().join("out.txt")).await;
    assert_eq!(written.as_deref(), Some("built demo"));

    daemon.shutdown().await.unwrap();
    drop(daemon);

    // handled work is acknowledged, so a restart has nothing to redo
    let store = WalChannel::open(&config.wal_path).unwrap();
    assert!(store.records("signals").is_empty());
    assert!(store.records("jobs").is_empty());
}

#[tokio::test]
async fn failed_condition_runs_nothing() {
    let (dir, config) = project();
    let mut daemon = startup(&config).await.unwrap();

    let response = handle_request(
        &mut daemon,
        emit("build.completed", &[("status", "failed"), ("project", "demo")]),
    )
    .await;
    assert!(matches!(response, Response::Emitted { .. }));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!dir.path().join("out.txt").exists());

    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn second_daemon_cannot_take_the_lock() {
    let (_dir, config) = project();
    let mut daemon = startup(&config).await.unwrap();

    let err = startup(&config).await.err().unwrap();
    assert!(matches!(err, LifecycleError::LockFailed(_)));
    // The running daemon keeps its files
    assert!(config.lock_path.exists());
    assert!(config.socket_path.exists());

    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn invalid_settings_fail_startup_and_clean_up() {
    let (dir, config) = project();
    std::fs::write(dir.path().join("sj.toml"), "[[action]]\nid = \"x\"\n").unwrap();

    let err = startup(&config).await.err().unwrap();

    assert!(matches!(err, LifecycleError::Config(_)));
    assert!(!config.lock_path.exists());
    assert!(!config.socket_path.exists());
}

#[tokio::test]
async fn queries_answer_from_live_state() {
    let (_dir, config) = project();
    let mut daemon = startup(&config).await.unwrap();

    let action = handle_request(
        &mut daemon,
        Request::Query {
            query: Query::GetAction {
                id: ActionId::new("record"),
            },
        },
    )
    .await;
    match action {
        Response::Action {
            action: Some(descriptor),
        } => assert_eq!(descriptor.parameters[0].name, "msg"),
        other => panic!("unexpected response: {:?}", other),
    }

    let missing = handle_request(
        &mut daemon,
        Request::Query {
            query: Query::GetAction {
                id: ActionId::new("absent"),
            },
        },
    )
    .await;
    assert_eq!(missing, Response::Action { action: None });

    let rules = handle_request(
        &mut daemon,
        Request::Query {
            query: Query::RulesFor {
                sensor: SignalTypeId::new("build.completed"),
            },
        },
    )
    .await;
    match rules {
        Response::Rules { rules } => assert_eq!(rules[0].name, "record-green-builds"),
        other => panic!("unexpected response: {:?}", other),
    }

    let info = handle_request(
        &mut daemon,
        Request::Query {
            query: Query::AppInfo,
        },
    )
    .await;
    match info {
        Response::AppInfo { info } => {
            assert_eq!(info.name, "sjd");
            assert_eq!(
                info.actions,
                vec![ActionId::new("log"), ActionId::new("record")]
            );
        }
        other => panic!("unexpected response: {:?}", other),
    }

    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn blank_sensor_is_rejected() {
    let (_dir, config) = project();
    let mut daemon = startup(&config).await.unwrap();

    let response = handle_request(&mut daemon, emit("", &[])).await;

    assert!(matches!(response, Response::Error { .. }));
    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn rescan_picks_up_new_rule_files() {
    let (dir, config) = project();
    let mut daemon = startup(&config).await.unwrap();

    std::fs::write(
        dir.path().join("rules/deploys.toml"),
        "[[rule]]\nname = \"log-deploys\"\nsignal.sensor = \"deploy.done\"\naction.id = \"log\"\n",
    )
    .unwrap();
    daemon.rescan_rules().unwrap();
    assert_eq!(daemon.rules.len(), 2);

    std::fs::remove_file(dir.path().join("rules/builds.toml")).unwrap();
    daemon.rescan_rules().unwrap();
    assert_eq!(daemon.rules.len(), 1);

    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_and_status_requests() {
    let (_dir, config) = project();
    let mut daemon = startup(&config).await.unwrap();

    match handle_request(&mut daemon, Request::Status).await {
        Response::Status { rules, actions, .. } => {
            assert_eq!(rules, 1);
            assert_eq!(actions, 2);
        }
        other => panic!("unexpected response: {:?}", other),
    }

    let response = handle_request(&mut daemon, Request::Shutdown).await;
    assert_eq!(response, Response::ShuttingDown);
    assert!(daemon.shutdown_requested);

    daemon.shutdown().await.unwrap();
}
