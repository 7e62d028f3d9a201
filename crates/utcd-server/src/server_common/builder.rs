// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Fluent builder for [`UtcServer`](crate::server::UtcServer).

use std::sync::Arc;
use std::time::Duration;

use super::{Observer, ServerConfig, ServerStats, TracingObserver};
use crate::server::UtcServer;

/// Builder for configuring and creating a [`UtcServer`].
///
/// Starts from [`ServerConfig::default()`]; every setter overrides one field.
/// Building never touches the network, binding happens in
/// [`UtcServer::start()`].
///
/// # Examples
///
/// ```
/// use utc_server::server::UtcServer;
///
/// let server = UtcServer::builder()
///     .listen("127.0.0.1")
///     .port(0)
///     .worker_threads(2)
///     .restrict_queries(true)
///     .allow("127.0.0.1")
///     .build();
/// assert!(!server.is_running());
/// assert_eq!(server.config().worker_threads, 2);
/// ```
#[must_use]
pub struct UtcServerBuilder {
    config: ServerConfig,
    observer: Option<Arc<dyn Observer>>,
    stats: Option<Arc<ServerStats>>,
}

impl UtcServerBuilder {
    pub(crate) fn new() -> Self {
        UtcServerBuilder {
            config: ServerConfig::default(),
            observer: None,
            stats: None,
        }
    }

    /// Start from an existing settings object instead of the defaults.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the listen address (default: `"0.0.0.0"`).
    pub fn listen(mut self, address: impl Into<String>) -> Self {
        self.config.listen_address = address.into();
        self
    }

    /// Set the listen port (default: 37). Use 0 for an ephemeral port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.listen_port = port;
        self
    }

    /// Accept IPv4 clients on an IPv6 listen address (default: `true`).
    ///
    /// Ignored for IPv4 listen addresses.
    pub fn dual_stack(mut self, enabled: bool) -> Self {
        self.config.dual_stack = enabled;
        self
    }

    /// Set the `listen(2)` backlog (default: 128).
    pub fn backlog(mut self, backlog: u32) -> Self {
        self.config.backlog = backlog;
        self
    }

    /// Set the bound of the accepted-connection queue (default: 1000).
    pub fn max_connections(mut self, max: usize) -> Self {
        self.config.max_connections = max;
        self
    }

    /// Set the number of worker threads (default: 4).
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Enforce the allow list when it is non-empty.
    pub fn restrict_queries(mut self, enabled: bool) -> Self {
        self.config.restrict_queries = enabled;
        self
    }

    /// Add a client address to the allow list.
    pub fn allow(mut self, client: impl Into<String>) -> Self {
        self.config.allowed_clients.push(client.into());
        self
    }

    /// Add a client address to the deny list. Denied clients are closed
    /// without a reply.
    pub fn deny(mut self, client: impl Into<String>) -> Self {
        self.config.denied_clients.push(client.into());
        self
    }

    /// Set the advertised stratum.
    pub fn stratum(mut self, stratum: u8) -> Self {
        self.config.stratum = stratum;
        self
    }

    /// Set the advertised reference identifier.
    pub fn reference_id(mut self, id: impl Into<String>) -> Self {
        self.config.reference_id = id.into();
        self
    }

    /// Set the per-connection read/write timeout. `None` disables it.
    pub fn io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.io_timeout = timeout;
        self
    }

    /// Send observations to `observer` instead of [`TracingObserver`].
    pub fn observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Attach a shared statistics instance.
    ///
    /// Pass the same `Arc<ServerStats>` to a reporter to read snapshots via
    /// [`ServerStats::snapshot()`].
    pub fn stats(mut self, stats: Arc<ServerStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Build the server in the `Stopped` state.
    pub fn build(self) -> UtcServer {
        let observer = self
            .observer
            .unwrap_or_else(|| Arc::new(TracingObserver) as Arc<dyn Observer>);
        let stats = self.stats.unwrap_or_default();
        UtcServer::with_stats(self.config, observer, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_config() {
        let server = UtcServerBuilder::new().build();
        assert_eq!(server.config(), &ServerConfig::default());
    }

    #[test]
    fn test_builder_setters() {
        let server = UtcServerBuilder::new()
            .listen("::1")
            .port(3737)
            .dual_stack(false)
            .backlog(16)
            .max_connections(8)
            .worker_threads(3)
            .restrict_queries(true)
            .allow("::1")
            .deny("10.0.0.1")
            .stratum(1)
            .reference_id("GPS")
            .io_timeout(None)
            .build();
        let cfg = server.config();
        assert_eq!(cfg.listen_address, "::1");
        assert_eq!(cfg.listen_port, 3737);
        assert!(!cfg.dual_stack);
        assert_eq!(cfg.backlog, 16);
        assert_eq!(cfg.max_connections, 8);
        assert_eq!(cfg.worker_threads, 3);
        assert!(cfg.restrict_queries);
        assert_eq!(cfg.allowed_clients, vec!["::1".to_string()]);
        assert_eq!(cfg.denied_clients, vec!["10.0.0.1".to_string()]);
        assert_eq!(cfg.stratum, 1);
        assert_eq!(cfg.reference_id, "GPS");
        assert_eq!(cfg.io_timeout, None);
    }

    #[test]
    fn test_builder_shares_stats() {
        let stats = Arc::new(ServerStats::new());
        let server = UtcServerBuilder::new().stats(stats.clone()).build();
        assert!(Arc::ptr_eq(server.stats(), &stats));
    }
}
