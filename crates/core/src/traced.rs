// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing infrastructure for messages flowing through the pipeline

/// Trait for values that should be traced
///
/// Provides consistent naming and structured fields for logging.
pub trait Traced {
    /// Name for log spans (e.g., "signal", "job")
    fn name(&self) -> &'static str;

    /// Key-value pairs for structured logging
    fn fields(&self) -> Vec<(&'static str, String)>;
}
