// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Rule definitions, parsing and the live rule set

mod condition;
mod directory;
mod parser;
mod rule;
mod rule_set;
mod template;

pub use condition::{
    ConditionDefinition, Predicate, PredicateRegistry, UnknownPredicate, ENDS_WITH, EQUALS,
    STARTS_WITH,
};
pub use directory::{RescanReport, RuleDirectory};
pub use parser::{parse_rules, ParseError};
pub use rule::{ActionRuleDefinition, RuleDefinition, RuleError, SignalSelector};
pub use rule_set::RuleSet;
pub use template::{interpolate, resolve_all, TemplateError};
