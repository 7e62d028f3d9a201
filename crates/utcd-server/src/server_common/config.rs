// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Server settings.
//!
//! [`ServerConfig`] is the fully populated settings object a
//! [`UtcServer`](crate::server::UtcServer) is built from. It is plain data:
//! file parsing lives in the daemon, and the fluent
//! [`UtcServerBuilder`](crate::server::UtcServerBuilder) is the usual way to
//! fill it in code.
//!
//! # Examples
//!
//! ```
//! use utc_server::server_common::ServerConfig;
//!
//! let config = ServerConfig {
//!     listen_address: "127.0.0.1".to_string(),
//!     listen_port: 0,
//!     restrict_queries: true,
//!     allowed_clients: vec!["127.0.0.1".to_string()],
//!     ..ServerConfig::default()
//! };
//! assert!(config.access_rules().is_allowed("127.0.0.1"));
//! assert!(!config.access_rules().is_allowed("10.0.0.1"));
//! ```

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

use super::AccessRules;
use crate::error::UtcServerError;

/// Default listen address (all IPv4 interfaces).
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
/// Default pending-connection backlog passed to `listen(2)`.
pub const DEFAULT_BACKLOG: u32 = 128;
/// Default bound of the accepted-connection queue.
pub const DEFAULT_MAX_CONNECTIONS: usize = 1000;
/// Default number of worker threads.
pub const DEFAULT_WORKER_THREADS: usize = 4;
/// Default per-connection send/receive timeout.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_millis(1000);

/// Settings consumed by the time server.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Address to bind: an IP literal (`"0.0.0.0"`, `"::"`, `"[::1]"`) or a
    /// resolvable host name.
    pub listen_address: String,
    /// TCP port to bind (37 by default, 0 for an ephemeral port).
    pub listen_port: u16,
    /// For IPv6 listen addresses, also accept IPv4 clients.
    pub dual_stack: bool,
    /// Pending-connection backlog for `listen(2)`.
    pub backlog: u32,
    /// Capacity of the queue between the accept loop and the workers. When
    /// full, the accept loop blocks until a worker frees a slot.
    pub max_connections: usize,
    /// Number of worker threads serving connections.
    pub worker_threads: usize,
    /// Enforce `allowed_clients` when it is non-empty.
    pub restrict_queries: bool,
    /// Client addresses served when `restrict_queries` is on.
    pub allowed_clients: Vec<String>,
    /// Client addresses never served.
    pub denied_clients: Vec<String>,
    /// Advertised stratum. Reported only; the Time Protocol has no field for it.
    pub stratum: u8,
    /// Advertised reference identifier. Reported only.
    pub reference_id: String,
    /// Read/write timeout applied to accepted sockets. `None` blocks forever
    /// on a stalled peer.
    pub io_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            listen_port: utc_proto::protocol::PORT,
            dual_stack: true,
            backlog: DEFAULT_BACKLOG,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            worker_threads: DEFAULT_WORKER_THREADS,
            restrict_queries: false,
            allowed_clients: Vec::new(),
            denied_clients: Vec::new(),
            stratum: 2,
            reference_id: "UTC".to_string(),
            io_timeout: Some(DEFAULT_IO_TIMEOUT),
        }
    }
}

impl ServerConfig {
    /// Build the access rules these settings describe.
    pub fn access_rules(&self) -> AccessRules {
        AccessRules::new(
            self.restrict_queries,
            self.allowed_clients.iter().cloned(),
            self.denied_clients.iter().cloned(),
        )
    }

    /// Resolve `listen_address:listen_port` to the first socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, UtcServerError> {
        let host = self
            .listen_address
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.listen_port));
        }
        let invalid = |detail: String| UtcServerError::InvalidListenAddress {
            address: self.listen_address.clone(),
            detail,
        };
        if host.is_empty() {
            return Err(invalid("empty address".to_string()));
        }
        (host, self.listen_port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("no addresses resolved".to_string()))
    }
}
