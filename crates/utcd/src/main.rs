// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! `simple-utcd` entry point.
//!
//! ```bash
//! simple-utcd init-config /etc/simple-utcd/simple-utcd.toml
//! simple-utcd --config /etc/simple-utcd/simple-utcd.toml validate
//! simple-utcd --config /etc/simple-utcd/simple-utcd.toml start
//! simple-utcd --listen 127.0.0.1 --port 3737 --workers 2
//! ```

use std::process::ExitCode;

use clap::Parser;
use simple_utcd::cli::{Cli, Command};
use simple_utcd::config::DaemonConfig;
use simple_utcd::daemon;
use simple_utcd::error::DaemonError;
use simple_utcd::logging::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("simple-utcd: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), DaemonError> {
    match cli.selected_command() {
        Command::InitConfig { path } => {
            let mut config = DaemonConfig::default();
            cli.apply_overrides(&mut config);
            config.validate()?;
            config.save(&path)?;
            println!("wrote configuration to {}", path.display());
            Ok(())
        }
        Command::Validate => {
            let config = cli.load_config()?;
            config.validate()?;
            println!(
                "configuration is valid: {}:{} with {} workers",
                config.network.listen_address,
                config.network.listen_port,
                config.performance.worker_threads
            );
            Ok(())
        }
        Command::Start => {
            let config = cli.load_config()?;
            config.validate()?;
            init_logging(&config.logging)?;
            daemon::run(&config)
        }
    }
}
