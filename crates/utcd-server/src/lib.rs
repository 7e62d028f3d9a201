// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Threaded Time Protocol (RFC 868) server with static access control.
//!
//! A [`server::UtcServer`] owns a TCP listener, one accept thread and a fixed
//! pool of worker threads. Each accepted client is checked against allow and
//! deny lists, sent the current time as a 4-byte big-endian timestamp, and
//! disconnected.
//!
//! Logging goes through an [`server_common::Observer`] handed to the server;
//! the default [`server_common::TracingObserver`] forwards to `tracing`.

#![warn(missing_docs)]

// Re-export protocol types from utc_proto for convenience.
pub use utc_proto::{protocol, unix_time};

/// Setup and per-connection error types.
pub mod error;

/// Shared server types: settings, access control, statistics, observer.
pub mod server_common;

/// A single client connection and its length-correct I/O.
pub mod connection;

/// Worker pool over the bounded connection queue.
mod dispatcher;

/// The time server and its start/stop lifecycle.
pub mod server;
