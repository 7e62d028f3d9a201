// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the time server: settings, access control, statistics,
//! the observer interface and the lifecycle state.

mod access_control;
mod builder;
mod config;
mod metrics;
mod observer;
mod state;

pub use self::access_control::{AccessResult, AccessRules, is_allowed};
pub use self::builder::UtcServerBuilder;
pub use self::config::{
    DEFAULT_BACKLOG, DEFAULT_IO_TIMEOUT, DEFAULT_LISTEN_ADDRESS, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_WORKER_THREADS, ServerConfig,
};
pub use self::metrics::{ServerStats, StatsSnapshot};
pub use self::observer::{Observer, TracingObserver};
pub use self::state::ServerState;

pub(crate) use self::state::StateCell;

#[cfg(test)]
pub(crate) use self::observer::testing;
