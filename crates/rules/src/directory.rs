// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule directory scanning
//!
//! Rule files are discovered under a root directory. Each rescan compares
//! content fingerprints against the previous scan and applies additions,
//! changes and removals to a [`RuleSet`].

use crate::parser::{parse_rules, ParseError};
use crate::RuleSet;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// What a rescan changed
#[derive(Debug, Default)]
pub struct RescanReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    /// Files that failed to parse; their previous rules stay active
    pub failed: Vec<(String, ParseError)>,
}

impl RescanReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.updated.is_empty()
            && self.removed.is_empty()
            && self.failed.is_empty()
    }
}

type Fingerprint = [u8; 32];

/// Tracks `*.toml` rule files below a root directory
pub struct RuleDirectory {
    root: PathBuf,
    /// Content of each file whose rules are in the set
    loaded: HashMap<String, Fingerprint>,
    /// Content that failed to parse, so it is reported once
    rejected: HashMap<String, Fingerprint>,
}

impl RuleDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            loaded: HashMap::new(),
            rejected: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the directory and apply differences to `rules`
    ///
    /// A missing root is treated as an empty directory.
    pub fn rescan(&mut self, rules: &RuleSet) -> io::Result<RescanReport> {
        let mut report = RescanReport::default();
        let files = match collect_rule_files(&self.root) {
            Ok(files) => files,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };

        let mut seen = HashSet::with_capacity(files.len());
        for path in files {
            let key = self.key_for(&path);
            let content = std::fs::read_to_string(&path)?;
            let fingerprint: Fingerprint = Sha256::digest(content.as_bytes()).into();
            seen.insert(key.clone());

            if self.loaded.get(&key) == Some(&fingerprint) {
                self.rejected.remove(&key);
                continue;
            }
            if self.rejected.get(&key) == Some(&fingerprint) {
                continue;
            }

            match parse_rules(&content) {
                Ok(parsed) => {
                    tracing::info!(file = %key, rules = parsed.len(), "loaded rule file");
                    rules.upsert_file(key.clone(), parsed);
                    self.rejected.remove(&key);
                    if self.loaded.insert(key.clone(), fingerprint).is_some() {
                        report.updated.push(key);
                    } else {
                        report.added.push(key);
                    }
                }
                Err(e) => {
                    tracing::warn!(file = %key, error = %e, "rule file rejected, keeping previous rules");
                    self.rejected.insert(key.clone(), fingerprint);
                    report.failed.push((key, e));
                }
            }
        }

        self.rejected.retain(|key, _| seen.contains(key));
        let gone: Vec<String> = self
            .loaded
            .keys()
            .filter(|key| !seen.contains(*key))
            .cloned()
            .collect();
        for key in gone {
            self.loaded.remove(&key);
            rules.remove_file(&key);
            tracing::info!(file = %key, "rule file removed");
            report.removed.push(key);
        }

        Ok(report)
    }

    fn key_for(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

fn collect_rule_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
