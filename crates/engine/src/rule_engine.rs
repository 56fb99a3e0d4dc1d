// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Matches signals against the live rule set

use sj_core::{Job, Signal, Traced};
use sj_rules::{PredicateRegistry, RuleSet};
use std::sync::Arc;

pub struct RuleEngine {
    rules: Arc<RuleSet>,
    predicates: PredicateRegistry,
}

impl RuleEngine {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self::with_predicates(rules, PredicateRegistry::default())
    }

    pub fn with_predicates(rules: Arc<RuleSet>, predicates: PredicateRegistry) -> Self {
        Self { rules, predicates }
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// One job per matching rule, in rule order
    ///
    /// A rule that cannot be evaluated (unknown condition kind, template
    /// naming a parameter the signal lacks) is logged and skipped; the other
    /// rules are unaffected.
    pub fn match_and_build_jobs(&self, signal: &Signal) -> Vec<Job> {
        let snapshot = self.rules.snapshot();
        let mut jobs = Vec::new();
        for rule in snapshot.iter() {
            match rule.build_job(signal, &self.predicates) {
                Ok(Some(job)) => {
                    tracing::debug!(rule = %rule.name, action = %job.action(), "rule matched");
                    jobs.push(job);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        rule = %rule.name,
                        signal = ?signal.fields(),
                        error = %e,
                        "skipping rule"
                    );
                }
            }
        }
        jobs
    }
}

#[cfg(test)]
#[path = "rule_engine_tests.rs"]
mod tests;
