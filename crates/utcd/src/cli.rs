// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::DaemonConfig;
use crate::error::ConfigError;

/// Configuration file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "config/simple-utcd.toml";

/// Time Protocol (RFC 868) daemon.
///
/// Serves the current time as a 4-byte timestamp to every TCP client.
#[derive(Parser, Debug)]
#[command(name = "simple-utcd", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override `network.listen_address`
    #[arg(short, long, global = true)]
    pub listen: Option<String>,

    /// Override `network.listen_port`
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Override `performance.worker_threads`
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Override `logging.log_level`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute (default: start)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Daemon subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the time server until SIGINT or SIGTERM
    Start,

    /// Load and validate the configuration, then exit
    Validate,

    /// Write a configuration file with default values
    InitConfig {
        /// Where to write the file
        path: PathBuf,
    },
}

impl Cli {
    /// The subcommand, defaulting to `start`.
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Start)
    }

    /// Load the configuration file, or the defaults when no file applies,
    /// then apply command-line overrides.
    ///
    /// An explicit `--config` must exist; [`DEFAULT_CONFIG_PATH`] is optional.
    pub fn load_config(&self) -> Result<DaemonConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                DaemonConfig::load(DEFAULT_CONFIG_PATH)?
            }
            None => DaemonConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Apply command-line values over `config`.
    pub fn apply_overrides(&self, config: &mut DaemonConfig) {
        if let Some(listen) = &self.listen {
            config.network.listen_address = listen.clone();
        }
        if let Some(port) = self.port {
            config.network.listen_port = port;
        }
        if let Some(workers) = self.workers {
            config.performance.worker_threads = workers;
        }
        if let Some(level) = &self.log_level {
            config.logging.log_level = level.clone();
        }
    }
}
