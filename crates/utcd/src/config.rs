// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Daemon configuration file.
//!
//! The file is TOML with five sections. Every key is optional and falls back
//! to the built-in default:
//!
//! ```toml
//! [network]
//! listen_address = "0.0.0.0"
//! listen_port = 37
//! enable_ipv6 = true
//! max_connections = 1000
//! backlog = 128
//! timeout_ms = 1000
//!
//! [server]
//! stratum = 2
//! reference_id = "UTC"
//! reference_clock = "UTC"
//!
//! [logging]
//! log_file = "/var/log/simple-utcd/simple-utcd.log"
//! log_level = "info"
//! console = true
//! enable_syslog = false
//!
//! [security]
//! restrict_queries = false
//! allowed_clients = []
//! denied_clients = []
//!
//! [performance]
//! worker_threads = 4
//! enable_statistics = true
//! stats_interval = 60
//! ```

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use utc_server::server_common::{
    DEFAULT_BACKLOG, DEFAULT_LISTEN_ADDRESS, DEFAULT_MAX_CONNECTIONS, DEFAULT_WORKER_THREADS,
    ServerConfig,
};

use crate::error::ConfigError;

/// Upper bound on `performance.worker_threads`.
pub const MAX_WORKER_THREADS: usize = 1024;

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Listener settings.
    pub network: NetworkSettings,
    /// Advertised server identity.
    pub server: ServerSettings,
    /// Log destinations and level.
    pub logging: LoggingSettings,
    /// Client access lists.
    pub security: SecuritySettings,
    /// Worker pool and statistics reporting.
    pub performance: PerformanceSettings,
}

/// `[network]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Address to bind.
    pub listen_address: String,
    /// Port to bind.
    pub listen_port: u16,
    /// On an IPv6 listen address, also accept IPv4 clients.
    pub enable_ipv6: bool,
    /// Bound of the accepted-connection queue.
    pub max_connections: usize,
    /// `listen(2)` backlog.
    pub backlog: u32,
    /// Per-connection read/write timeout in milliseconds; 0 disables it.
    pub timeout_ms: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        NetworkSettings {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            listen_port: utc_proto::protocol::PORT,
            enable_ipv6: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            backlog: DEFAULT_BACKLOG,
            timeout_ms: 1000,
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Advertised stratum (1-15).
    pub stratum: u8,
    /// Advertised reference identifier.
    pub reference_id: String,
    /// Name of the clock the host is disciplined by. Informational.
    pub reference_clock: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            stratum: 2,
            reference_id: "UTC".to_string(),
            reference_clock: "UTC".to_string(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Append logs to this file as well. Unset means no file output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Level filter: `trace`, `debug`, `info`, `warn`, `error` or `off`.
    /// `RUST_LOG` takes precedence when set.
    pub log_level: String,
    /// Write logs to stderr.
    pub console: bool,
    /// Send logs to the local syslog daemon (`LOG_DAEMON`). Unix only.
    pub enable_syslog: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            log_file: None,
            log_level: "info".to_string(),
            console: true,
            enable_syslog: false,
        }
    }
}

/// `[security]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Serve only `allowed_clients` when that list is non-empty.
    pub restrict_queries: bool,
    /// Client IP addresses served under `restrict_queries`.
    pub allowed_clients: Vec<String>,
    /// Client IP addresses never served.
    pub denied_clients: Vec<String>,
}

/// `[performance]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    /// Number of worker threads.
    pub worker_threads: usize,
    /// Log a statistics snapshot periodically.
    pub enable_statistics: bool,
    /// Seconds between statistics snapshots.
    pub stats_interval: u64,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        PerformanceSettings {
            worker_threads: DEFAULT_WORKER_THREADS,
            enable_statistics: true,
            stats_interval: 60,
        }
    }
}

impl FromStr for DaemonConfig {
    type Err = toml::de::Error;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        toml::from_str(content)
    }
}

impl DaemonConfig {
    /// Read and parse a configuration file. Does not validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse().map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut content = String::from("# simple-utcd configuration\n\n");
        content.push_str(&self.to_toml()?);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, content).map_err(write_err)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let net = &self.network;
        if net.listen_address.trim().is_empty() {
            return Err(invalid("network.listen_address", "must not be empty"));
        }
        if net.max_connections == 0 {
            return Err(invalid("network.max_connections", "must be at least 1"));
        }
        if net.backlog == 0 {
            return Err(invalid("network.backlog", "must be at least 1"));
        }

        if !(1..=15).contains(&self.server.stratum) {
            return Err(invalid(
                "server.stratum",
                format!("{} is outside 1-15", self.server.stratum),
            ));
        }
        if self.server.reference_id.trim().is_empty() {
            return Err(invalid("server.reference_id", "must not be empty"));
        }

        if LevelFilter::from_str(&self.logging.log_level).is_err() {
            return Err(invalid(
                "logging.log_level",
                format!("unknown level '{}'", self.logging.log_level),
            ));
        }
        #[cfg(not(unix))]
        if self.logging.enable_syslog {
            return Err(invalid("logging.enable_syslog", "syslog is only available on unix"));
        }

        for (field, list) in [
            ("security.allowed_clients", &self.security.allowed_clients),
            ("security.denied_clients", &self.security.denied_clients),
        ] {
            if let Some(bad) = list.iter().find(|c| c.parse::<IpAddr>().is_err()) {
                return Err(invalid(field, format!("'{bad}' is not an IP address")));
            }
        }

        let perf = &self.performance;
        if !(1..=MAX_WORKER_THREADS).contains(&perf.worker_threads) {
            return Err(invalid(
                "performance.worker_threads",
                format!("{} is outside 1-{MAX_WORKER_THREADS}", perf.worker_threads),
            ));
        }
        if perf.enable_statistics && perf.stats_interval == 0 {
            return Err(invalid("performance.stats_interval", "must be at least 1"));
        }
        Ok(())
    }

    /// Settings for the time server.
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            listen_address: self.network.listen_address.clone(),
            listen_port: self.network.listen_port,
            dual_stack: self.network.enable_ipv6,
            backlog: self.network.backlog,
            max_connections: self.network.max_connections,
            worker_threads: self.performance.worker_threads,
            restrict_queries: self.security.restrict_queries,
            allowed_clients: self.security.allowed_clients.clone(),
            denied_clients: self.security.denied_clients.clone(),
            stratum: self.server.stratum,
            reference_id: self.server.reference_id.clone(),
            io_timeout: (self.network.timeout_ms > 0)
                .then(|| Duration::from_millis(self.network.timeout_ms)),
        }
    }

    /// Interval between statistics snapshots, if enabled.
    pub fn stats_interval(&self) -> Option<Duration> {
        (self.performance.enable_statistics && self.performance.stats_interval > 0)
            .then(|| Duration::from_secs(self.performance.stats_interval))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DaemonConfig::default();
        config.validate().unwrap();
        assert_eq!(config.network.listen_port, 37);
        assert_eq!(config.stats_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: DaemonConfig = "".parse().unwrap();
        assert_eq!(config, DaemonConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let config: DaemonConfig = r#"
            [network]
            listen_port = 3737

            [security]
            restrict_queries = true
            allowed_clients = ["10.0.0.1"]
        "#
        .parse()
        .unwrap();
        assert_eq!(config.network.listen_port, 3737);
        assert_eq!(config.network.listen_address, "0.0.0.0");
        assert!(config.security.restrict_queries);
        assert_eq!(config.performance.worker_threads, 4);
    }

    #[test]
    fn test_syslog_is_opt_in() {
        assert!(!DaemonConfig::default().logging.enable_syslog);
        let config: DaemonConfig = "[logging]\nenable_syslog = true".parse().unwrap();
        assert!(config.logging.enable_syslog);
        assert!(config.logging.console);
        #[cfg(unix)]
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let result: Result<DaemonConfig, _> = "[network]\nlisten_port = \"x\"".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_to_server_config() {
        let mut config = DaemonConfig::default();
        config.network.listen_address = "::".to_string();
        config.network.enable_ipv6 = false;
        config.network.timeout_ms = 0;
        config.security.denied_clients = vec!["192.0.2.7".to_string()];
        config.performance.worker_threads = 8;

        let server = config.to_server_config();
        assert_eq!(server.listen_address, "::");
        assert!(!server.dual_stack);
        assert_eq!(server.io_timeout, None);
        assert_eq!(server.worker_threads, 8);
        assert!(!server.access_rules().is_allowed("192.0.2.7"));
    }

    #[test]
    fn test_timeout_maps_to_duration() {
        let config = DaemonConfig::default();
        assert_eq!(
            config.to_server_config().io_timeout,
            Some(Duration::from_millis(1000))
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases: Vec<(&str, Box<dyn Fn(&mut DaemonConfig)>)> = vec![
            (
                "network.listen_address",
                Box::new(|c: &mut DaemonConfig| c.network.listen_address = " ".to_string()),
            ),
            (
                "network.max_connections",
                Box::new(|c: &mut DaemonConfig| c.network.max_connections = 0),
            ),
            ("network.backlog", Box::new(|c: &mut DaemonConfig| c.network.backlog = 0)),
            ("server.stratum", Box::new(|c: &mut DaemonConfig| c.server.stratum = 16)),
            (
                "server.reference_id",
                Box::new(|c: &mut DaemonConfig| c.server.reference_id = String::new()),
            ),
            (
                "logging.log_level",
                Box::new(|c: &mut DaemonConfig| c.logging.log_level = "loud".to_string()),
            ),
            (
                "security.allowed_clients",
                Box::new(|c: &mut DaemonConfig| c.security.allowed_clients = vec!["host.example".to_string()]),
            ),
            (
                "performance.worker_threads",
                Box::new(|c: &mut DaemonConfig| c.performance.worker_threads = 0),
            ),
            (
                "performance.stats_interval",
                Box::new(|c: &mut DaemonConfig| c.performance.stats_interval = 0),
            ),
        ];
        for (expected, mutate) in cases {
            let mut config = DaemonConfig::default();
            mutate(&mut config);
            match config.validate() {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        let mut config = DaemonConfig::default();
        config.logging.log_level = "INFO".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_statistics_disabled() {
        let mut config = DaemonConfig::default();
        config.performance.enable_statistics = false;
        config.performance.stats_interval = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.stats_interval(), None);
    }
}
