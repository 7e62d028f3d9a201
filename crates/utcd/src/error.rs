// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Daemon error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use utc_server::error::UtcServerError;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML for the configuration schema.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file could not be written.
    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A value is out of range or malformed.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted key, e.g. `network.backlog`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Top-level daemon errors, reported by `main` before a non-zero exit.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The log file could not be opened.
    #[error("failed to open log file {}: {source}", path.display())]
    LogFile {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The syslog sink could not be opened.
    #[error("failed to open syslog: {0}")]
    Syslog(&'static str),

    /// A global tracing subscriber was already installed.
    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    /// The time server failed to start.
    #[error(transparent)]
    Server(#[from] UtcServerError),

    /// The signal-handling runtime failed.
    #[error("runtime error: {0}")]
    Runtime(#[from] io::Error),
}
