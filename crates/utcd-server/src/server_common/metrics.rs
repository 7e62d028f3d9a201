// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Lock-free server statistics using atomic counters.
//!
//! All counters use relaxed ordering. The counters are independent: a
//! snapshot read while connections are being served is an approximation, not
//! a transactionally coherent view across fields.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide server statistics, updated atomically by the accept loop and
/// every worker.
///
/// The server creates one automatically; pass your own through
/// [`UtcServerBuilder::stats()`](crate::server::UtcServerBuilder::stats) to
/// share it with a reporter thread.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use utc_server::server::UtcServer;
/// use utc_server::server_common::ServerStats;
///
/// let stats = Arc::new(ServerStats::new());
/// let server = UtcServer::builder()
///     .listen("127.0.0.1")
///     .port(3737)
///     .stats(stats.clone())
///     .build();
/// server.start().unwrap();
///
/// let snap = stats.snapshot();
/// println!("served: {}", snap.packets_sent);
/// ```
#[derive(Debug, Default)]
pub struct ServerStats {
    /// Connections accepted and not yet closed by a worker.
    pub active_connections: AtomicU64,
    /// Connections accepted since the stats were created.
    pub total_connections: AtomicU64,
    /// Time packets fully written to clients.
    pub packets_sent: AtomicU64,
    /// Time packets fully read from clients.
    pub packets_received: AtomicU64,
    /// Bytes written across all connections.
    pub bytes_sent: AtomicU64,
    /// Bytes read across all connections.
    pub bytes_received: AtomicU64,
    /// Connections closed by access control without a packet.
    pub connections_denied: AtomicU64,
    /// Connections whose service ended on an I/O failure.
    pub io_errors: AtomicU64,
}

impl ServerStats {
    /// Create a new statistics instance with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            active_connections: self.active_connections.load(Ordering::Relaxed),
            total_connections: self.total_connections.load(Ordering::Relaxed),
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            packets_received: self.packets_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            connections_denied: self.connections_denied.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn connection_finished(&self) {
        // Saturate so a stray extra call cannot wrap the gauge.
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    #[inline]
    pub(crate) fn record_sent(&self, bytes: usize) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_received(&self, bytes: usize) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_denied(&self) {
        self.connections_denied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_io_errors(&self) {
        self.io_errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of server statistics (non-atomic, copyable).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StatsSnapshot {
    /// Connections accepted and not yet closed.
    pub active_connections: u64,
    /// Connections accepted in total.
    pub total_connections: u64,
    /// Time packets sent.
    pub packets_sent: u64,
    /// Time packets received.
    pub packets_received: u64,
    /// Bytes sent.
    pub bytes_sent: u64,
    /// Bytes received.
    pub bytes_received: u64,
    /// Connections refused by access control.
    pub connections_denied: u64,
    /// Connections ended by an I/O failure.
    pub io_errors: u64,
}
