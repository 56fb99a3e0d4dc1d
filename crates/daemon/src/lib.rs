// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Signal Jobs daemon library: wire protocol, command client and paths
//! shared by `sjd` and the `sj` CLI

pub mod client;
pub mod config;
pub mod protocol;

pub use client::{
    invoke, CallOptions, CommandClient, CommandError, CommandTransport, DaemonStatus, UnixTransport,
};
pub use config::{ActionSettings, Config, ConfigError, RulesSettings, Settings};
pub use protocol::{AppInfo, ProtocolError, Query, Request, Response};
