// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal parameter interpolation for action templates

use regex::Regex;
use sj_core::Parameters;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

// Regex pattern for {{signal.name}} - this is a constant valid pattern
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static SIGNAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*signal\.([A-Za-z0-9_.\-]+)\s*\}\}")
        .expect("constant regex pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template references missing signal parameter: {0}")]
    MissingParameter(String),
}

/// Replace every `{{signal.<name>}}` with the string form of that signal
/// parameter. Lookup is case-insensitive; a missing parameter fails the
/// whole template.
pub fn interpolate(template: &str, params: &Parameters) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in SIGNAL_PATTERN.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = params
            .get(name.as_str())
            .ok_or_else(|| TemplateError::MissingParameter(name.as_str().to_string()))?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(&value.to_string());
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Resolve a whole map of templates
pub fn resolve_all(
    templates: &BTreeMap<String, String>,
    params: &Parameters,
) -> Result<Parameters, TemplateError> {
    let mut resolved = Parameters::new();
    for (name, template) in templates {
        resolved.insert(name, interpolate(template, params)?);
    }
    Ok(resolved)
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
