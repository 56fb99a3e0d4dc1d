// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule file TOML parsing

use crate::RuleDefinition;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during rule file parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("duplicate rule name: {0}")]
    DuplicateRule(String),
}

/// Parse the `[[rule]]` tables of a rule file, in file order
pub fn parse_rules(content: &str) -> Result<Vec<RuleDefinition>, ParseError> {
    let raw: toml::Value = toml::from_str(content)?;
    let table = raw
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat("root must be a table".to_string()))?;

    let Some(entries) = table.get("rule") else {
        return Ok(Vec::new());
    };
    let entries = entries.as_array().ok_or_else(|| {
        ParseError::InvalidFormat("rule must be an array of tables ([[rule]])".to_string())
    })?;

    let mut names = HashSet::new();
    let mut rules = Vec::with_capacity(entries.len());
    for (index, value) in entries.iter().enumerate() {
        let rule = parse_rule(index, value)?;
        if !names.insert(rule.name.clone()) {
            return Err(ParseError::DuplicateRule(rule.name));
        }
        rules.push(rule);
    }
    Ok(rules)
}

fn parse_rule(index: usize, value: &toml::Value) -> Result<RuleDefinition, ParseError> {
    let rule: RuleDefinition = value.clone().try_into().map_err(|e: toml::de::Error| {
        ParseError::InvalidFormat(format!("rule[{}]: {}", index, e))
    })?;

    if rule.name.trim().is_empty() {
        return Err(ParseError::MissingField(format!("rule[{}].name", index)));
    }
    if rule.signal.sensor.is_empty() {
        return Err(ParseError::MissingField(format!(
            "rule.{}.signal.sensor",
            rule.name
        )));
    }
    if rule.action.id.is_empty() {
        return Err(ParseError::MissingField(format!("rule.{}.action.id", rule.name)));
    }
    for (i, condition) in rule.conditions.iter().enumerate() {
        if condition.parameter.is_empty() {
            return Err(ParseError::MissingField(format!(
                "rule.{}.condition[{}].parameter",
                rule.name, i
            )));
        }
        if condition.kind.is_empty() {
            return Err(ParseError::MissingField(format!(
                "rule.{}.condition[{}].kind",
                rule.name, i
            )));
        }
    }
    Ok(rule)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
