//! Command specs
//!
//! Emit signals and query actions, rules and app info through a running
//! daemon.

use crate::prelude::*;

const SETTINGS: &str = r#"
[[action]]
id = "record"
command = "printf '%s' \"$SJ_PARAM_SUMMARY\" > summary.txt"
parameters = [{ name = "summary", required = true, description = "text to record" }]
"#;

const RULES: &str = r#"
[[rule]]
name = "record-builds"
description = "Record green builds"
signal = { sensor = "build.completed" }
condition = [{ parameter = "status", kind = "equals", value = "success" }]
action = { id = "record", parameters = { summary = "{{signal.project}} passed" } }
"#;

fn running_project() -> Project {
    let temp = Project::empty();
    temp.file("sj.toml", SETTINGS)
        .file("rules/builds.toml", RULES);
    temp.sj().args(&["daemon", "start"]).passes();
    temp
}

#[test]
fn emit_runs_matching_action() {
    let temp = running_project();

    temp.sj()
        .args(&["emit", "build.completed", "status=success", "project=demo"])
        .passes()
        .stdout_has("Emitted build.completed");

    assert_eq!(
        temp.wait_for_file("summary.txt").as_deref(),
        Some("demo passed")
    );
}

#[test]
fn action_shows_parameters() {
    let temp = running_project();

    temp.sj()
        .args(&["action", "record"])
        .passes()
        .stdout_has("Action: record")
        .stdout_has("summary (required): text to record");
}

#[test]
fn unknown_action_fails() {
    let temp = running_project();

    temp.sj()
        .args(&["action", "missing"])
        .fails()
        .stderr_has("no action registered as 'missing'");
}

#[test]
fn rules_lists_rules_for_sensor() {
    let temp = running_project();

    temp.sj()
        .args(&["rules", "build.completed"])
        .passes()
        .stdout_has("record-builds -> record")
        .stdout_has("when status equals success");
}

#[test]
fn rules_for_unknown_sensor() {
    let temp = running_project();

    temp.sj()
        .args(&["rules", "deploy.finished"])
        .passes()
        .stdout_has("No rules for deploy.finished");
}

#[test]
fn info_lists_actions_as_json() {
    let temp = running_project();

    temp.sj()
        .args(&["info", "--output", "json"])
        .passes()
        .stdout_has("\"name\": \"sjd\"")
        .stdout_has("\"record\"");
}
