// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action handler implementations

mod log;
mod shell;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use log::{LogAction, LOG_ACTION_ID};
pub use shell::{env_var_name, ShellAction};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAction, FakeBehavior};
