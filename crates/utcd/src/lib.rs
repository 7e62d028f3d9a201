// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The `simple-utcd` daemon: configuration file, command line, logging setup
//! and the signal-driven run loop around [`utc_server`].

#![warn(missing_docs)]

/// Command-line interface.
pub mod cli;

/// TOML configuration file.
pub mod config;

/// Server run loop with signal handling and statistics reporting.
pub mod daemon;

/// Daemon error types.
pub mod error;

/// Global `tracing` subscriber setup.
pub mod logging;
