// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sj_core::Value;

fn signal(params: &[(&str, Value)]) -> Signal {
    Signal::new("build.completed", params.iter().cloned().collect()).unwrap()
}

fn selector(constraints: &[(&str, Value)]) -> SignalSelector {
    SignalSelector {
        sensor: SignalTypeId::new("build.completed"),
        parameters: constraints.iter().cloned().collect(),
    }
}

#[test]
fn selector_matches_sensor_without_constraints() {
    assert!(selector(&[]).matches(&signal(&[])));
}

#[test]
fn selector_rejects_other_sensor() {
    let other = Signal::new("build.started", Parameters::new()).unwrap();
    assert!(!selector(&[]).matches(&other));
}

#[test]
fn selector_constraints_must_all_hold() {
    let sel = selector(&[("branch", "main".into()), ("Env", "prod".into())]);
    assert!(sel.matches(&signal(&[("BRANCH", "main".into()), ("env", "prod".into())])));
    assert!(!sel.matches(&signal(&[("branch", "main".into()), ("env", "dev".into())])));
}

#[test]
fn selector_missing_parameter_does_not_match() {
    let sel = selector(&[("branch", "main".into())]);
    assert!(!sel.matches(&signal(&[])));
}

#[test]
fn selector_compares_string_forms() {
    let sel = selector(&[("attempt", Value::from(3i64))]);
    assert!(sel.matches(&signal(&[("attempt", "3".into())])));
}

#[test]
fn rule_defaults_to_enabled() {
    let json = r#"{
        "name": "r",
        "signal": {"sensor": "s"},
        "action": {"id": "a"}
    }"#;
    let rule: RuleDefinition = serde_json::from_str(json).unwrap();
    assert!(rule.enabled);
    assert!(rule.conditions.is_empty());
    assert!(rule.action.parameters.is_empty());
}

fn notify_rule(conditions: Vec<ConditionDefinition>) -> RuleDefinition {
    RuleDefinition {
        name: "notify-on-build".to_string(),
        description: String::new(),
        enabled: true,
        signal: selector(&[]),
        conditions,
        action: ActionRuleDefinition {
            id: ActionId::new("notify"),
            parameters: [(
                "msg".to_string(),
                "Project {{signal.project}} built ok".to_string(),
            )]
            .into_iter()
            .collect(),
        },
    }
}

#[test]
fn build_job_resolves_templates() {
    let rule = notify_rule(vec![ConditionDefinition::new("status", "equals", "success")]);
    let sig = signal(&[("status", "success".into()), ("project", "demo".into())]);
    let job = rule
        .build_job(&sig, &PredicateRegistry::default())
        .unwrap()
        .unwrap();
    assert_eq!(job.action().as_str(), "notify");
    assert_eq!(
        job.parameter("msg"),
        Some(&Value::from("Project demo built ok"))
    );
}

#[test]
fn build_job_stops_on_failed_condition() {
    let rule = notify_rule(vec![
        ConditionDefinition::new("status", "equals", "failed"),
        ConditionDefinition::new("status", "no-such-kind", "x"),
    ]);
    let sig = signal(&[("status", "success".into()), ("project", "demo".into())]);
    // the unknown kind is never reached
    assert_eq!(rule.build_job(&sig, &PredicateRegistry::default()), Ok(None));
}

#[test]
fn build_job_skips_disabled_rule() {
    let mut rule = notify_rule(vec![]);
    rule.enabled = false;
    let sig = signal(&[("project", "demo".into())]);
    assert_eq!(rule.build_job(&sig, &PredicateRegistry::default()), Ok(None));
}

#[test]
fn build_job_reports_missing_template_parameter() {
    let rule = notify_rule(vec![]);
    let err = rule
        .build_job(&signal(&[]), &PredicateRegistry::default())
        .unwrap_err();
    assert_eq!(
        err,
        RuleError::Template(TemplateError::MissingParameter("project".to_string()))
    );
}

#[test]
fn build_job_reports_unknown_predicate() {
    let rule = notify_rule(vec![ConditionDefinition::new("status", "matches", "x")]);
    let sig = signal(&[("status", "x".into()), ("project", "demo".into())]);
    let err = rule
        .build_job(&sig, &PredicateRegistry::default())
        .unwrap_err();
    assert!(matches!(err, RuleError::UnknownPredicate(_)));
}
