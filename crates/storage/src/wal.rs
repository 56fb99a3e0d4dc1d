// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage

use crate::Operation;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt WAL entry at line {line}")]
    Corrupt { line: usize },
}

/// A single persisted operation with its sequence number
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub op: Operation,
}

/// Write-ahead log for durable operation storage
pub struct Wal {
    file: File,
    sequence: u64,
}

impl Wal {
    /// Open or create a WAL at the given path, returning the entries already
    /// in it
    ///
    /// A torn final line (a crash mid-append) is truncated away. Corruption
    /// anywhere else is an error.
    pub fn open(path: &Path) -> Result<(Self, Vec<WalEntry>), WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let (entries, valid_len) = read_entries(path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        if file.metadata()?.len() > valid_len {
            tracing::warn!(path = %path.display(), valid_len, "truncating torn WAL tail");
            file.set_len(valid_len)?;
        }

        let sequence = entries.last().map(|e| e.seq).unwrap_or(0);
        Ok((Self { file, sequence }, entries))
    }

    /// Append an operation to the log. Returns once the entry is synced.
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        let entry = WalEntry {
            seq: self.sequence + 1,
            op: op.clone(),
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_all()?;
        self.sequence = entry.seq;
        Ok(self.sequence)
    }

    /// Get the current sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Replace the log at `path` with `ops`, keeping `sequence` as the
    /// current sequence number so record ids are never reused
    ///
    /// The new log is written to a sibling file and renamed over the old one,
    /// so a crash leaves either the old log or the new one.
    pub fn rewrite(path: &Path, sequence: u64, ops: &[Operation]) -> Result<Self, WalError> {
        let tmp = path.with_extension("compact");
        {
            let mut file = File::create(&tmp)?;
            for op in ops {
                let entry = WalEntry {
                    seq: sequence,
                    op: op.clone(),
                };
                writeln!(file, "{}", serde_json::to_string(&entry)?)?;
            }
            file.sync_all()?;
        }
        std::fs::rename(&tmp, path)?;

        let file = OpenOptions::new().append(true).read(true).open(path)?;
        Ok(Self { file, sequence })
    }

    /// Replay all operations from the log without opening it for writing
    pub fn replay(path: &Path) -> Result<Vec<WalEntry>, WalError> {
        read_entries(path).map(|(entries, _)| entries)
    }
}

/// Read entries and the byte length of the valid prefix
fn read_entries(path: &Path) -> Result<(Vec<WalEntry>, u64), WalError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((Vec::new(), 0)),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut entries = Vec::new();
    let mut valid_len: u64 = 0;
    let mut line = String::new();
    let mut line_no = 0;
    let mut torn: Option<usize> = None;

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        if let Some(bad) = torn {
            // Only the final line may be damaged
            return Err(WalError::Corrupt { line: bad });
        }
        let complete = line.ends_with('\n');
        let text = line.trim_end();
        if text.is_empty() {
            valid_len += read as u64;
            continue;
        }
        match serde_json::from_str::<WalEntry>(text) {
            Ok(entry) if complete => {
                entries.push(entry);
                valid_len += read as u64;
            }
            _ => torn = Some(line_no),
        }
    }

    Ok((entries, valid_len))
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
