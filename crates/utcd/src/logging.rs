// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Global `tracing` subscriber setup.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingSettings;
use crate::error::DaemonError;

/// Install the global subscriber described by `settings`.
///
/// `RUST_LOG` overrides `log_level` when set. Console output goes to stderr;
/// file output is appended without ANSI colors. The syslog sink leaves
/// timestamps to the syslog daemon.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), DaemonError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(&settings.log_level)));

    let console = settings
        .console
        .then(|| fmt::layer().with_writer(std::io::stderr));

    let file = match &settings.log_file {
        Some(path) => {
            let open_err = |source: std::io::Error| DaemonError::LogFile {
                path: path.clone(),
                source,
            };
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(open_err)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(open_err)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    let syslog = if settings.enable_syslog {
        Some(
            fmt::layer()
                .with_ansi(false)
                .without_time()
                .with_writer(syslog_writer()?),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .with(syslog)
        .try_init()?;
    Ok(())
}

/// Open the process-wide syslog connection as `simple-utcd` on `LOG_DAEMON`.
///
/// Only one connection may be open at a time.
#[cfg(unix)]
pub fn syslog_writer() -> Result<syslog_tracing::Syslog, DaemonError> {
    use syslog_tracing::{Facility, Options, Syslog};

    Syslog::new(
        c"simple-utcd",
        Options::LOG_PID | Options::LOG_CONS,
        Facility::Daemon,
    )
    .ok_or(DaemonError::Syslog("a syslog connection is already open"))
}

/// Syslog is unavailable off unix.
#[cfg(not(unix))]
pub fn syslog_writer() -> Result<fn() -> std::io::Sink, DaemonError> {
    Err(DaemonError::Syslog("syslog is only available on unix"))
}

/// Normalize a configured level (`"INFO"`, `"Warn"`) into a filter directive.
pub fn level_directive(level: &str) -> String {
    level.trim().to_ascii_lowercase()
}
