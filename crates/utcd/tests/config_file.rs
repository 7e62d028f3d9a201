// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Configuration file load, save and validation against real files.

mod common;

use std::io::Read;
use std::net::TcpStream;

use clap::Parser;
use common::write_config;
use simple_utcd::cli::Cli;
use simple_utcd::config::DaemonConfig;
use simple_utcd::error::ConfigError;
use utc_server::server::UtcServer;

const SAMPLE: &str = r#"
[network]
listen_address = "127.0.0.1"
listen_port = 0
enable_ipv6 = false
timeout_ms = 250

[server]
stratum = 1
reference_id = "GPS"
reference_clock = "gpsd"

[logging]
log_level = "DEBUG"
console = false

[security]
restrict_queries = true
allowed_clients = ["127.0.0.1", "::1"]
denied_clients = ["192.0.2.10"]

[performance]
worker_threads = 2
enable_statistics = false
"#;

#[test]
fn test_load_sample_file() {
    let (_dir, path) = write_config(SAMPLE);
    let config = DaemonConfig::load(&path).unwrap();
    config.validate().unwrap();

    assert_eq!(config.network.listen_address, "127.0.0.1");
    assert_eq!(config.network.timeout_ms, 250);
    assert_eq!(config.server.reference_clock, "gpsd");
    assert!(!config.logging.console);
    assert_eq!(config.security.allowed_clients.len(), 2);
    assert_eq!(config.performance.worker_threads, 2);
    // Unset keys keep their defaults.
    assert_eq!(config.network.max_connections, 1000);
    assert_eq!(config.network.backlog, 128);
    assert_eq!(config.performance.stats_interval, 60);
}

#[test]
fn test_save_then_load_preserves_values() {
    let (dir, path) = write_config(SAMPLE);
    let mut config = DaemonConfig::load(&path).unwrap();
    config.logging.log_file = Some(dir.path().join("logs").join("utcd.log"));

    let saved = dir.path().join("nested").join("copy.toml");
    config.save(&saved).unwrap();
    assert_eq!(DaemonConfig::load(&saved).unwrap(), config);
}

#[test]
fn test_save_defaults_omits_unset_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("defaults.toml");
    DaemonConfig::default().save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("[network]"));
    assert!(!text.contains("log_file"));
    assert_eq!(DaemonConfig::load(&path).unwrap(), DaemonConfig::default());
}

#[test]
fn test_malformed_file_is_parse_error() {
    let (_dir, path) = write_config("[network\nlisten_port = 37");
    assert!(matches!(
        DaemonConfig::load(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_invalid_values_fail_validation() {
    let (_dir, path) = write_config("[performance]\nworker_threads = 0\n");
    let config = DaemonConfig::load(&path).unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid {
            field: "performance.worker_threads",
            ..
        })
    ));
}

#[test]
fn test_cli_overrides_file_values() {
    let (_dir, path) = write_config(SAMPLE);
    let cli = Cli::try_parse_from([
        "simple-utcd",
        "--config",
        path.to_str().unwrap(),
        "--workers",
        "3",
        "validate",
    ])
    .unwrap();
    let config = cli.load_config().unwrap();
    assert_eq!(config.performance.worker_threads, 3);
    assert_eq!(config.server.reference_id, "GPS");
}

#[test]
fn test_file_config_drives_server() {
    let (_dir, path) = write_config(SAMPLE);
    let config = DaemonConfig::load(&path).unwrap();
    let server = UtcServer::builder()
        .config(config.to_server_config())
        .build();
    let addr = server.start().unwrap();

    let mut buf = Vec::new();
    TcpStream::connect(addr)
        .unwrap()
        .read_to_end(&mut buf)
        .unwrap();
    assert_eq!(buf.len(), 4);

    server.stop();
    assert_eq!(server.packets_sent(), 1);
}
