// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Run the time server until a shutdown signal arrives.
//!
//! The server itself is thread-based. A current-thread `tokio` runtime waits
//! for SIGINT/SIGTERM and, when statistics are enabled, logs a snapshot on a
//! fixed interval.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use utc_proto::unix_time;
use utc_server::server::UtcServer;
use utc_server::server_common::{ServerStats, StatsSnapshot};

use crate::config::DaemonConfig;
use crate::error::DaemonError;

/// Start the server described by `config` and block until a shutdown signal.
///
/// The configuration should already be validated.
pub fn run(config: &DaemonConfig) -> Result<(), DaemonError> {
    let stats = Arc::new(ServerStats::new());
    let server = UtcServer::builder()
        .config(config.to_server_config())
        .stats(stats.clone())
        .build();

    let addr = server.start()?;
    info!(
        %addr,
        workers = config.performance.worker_threads,
        stratum = config.server.stratum,
        reference_id = %config.server.reference_id,
        reference_clock = %config.server.reference_clock,
        "simple-utcd started at {}",
        unix_time::format(unix_time::now_secs())
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let signal = runtime.block_on(wait_for_shutdown(&stats, config.stats_interval()));

    match &signal {
        Ok(name) => info!(signal = *name, "shutting down"),
        Err(e) => tracing::error!(error = %e, "signal handling failed, shutting down"),
    }
    server.stop();
    log_stats(&stats.snapshot());
    signal.map(|_| ()).map_err(DaemonError::from)
}

/// Resolve on the first shutdown signal, logging statistics meanwhile.
async fn wait_for_shutdown(
    stats: &ServerStats,
    interval: Option<Duration>,
) -> io::Result<&'static str> {
    let signal = shutdown_signal();
    tokio::pin!(signal);

    let Some(period) = interval else {
        return signal.await;
    };
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    loop {
        tokio::select! {
            res = &mut signal => return res,
            _ = ticker.tick() => log_stats(&stats.snapshot()),
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "Ctrl-C")
}

/// Log one statistics snapshot as structured fields.
pub fn log_stats(snap: &StatsSnapshot) {
    info!(
        active = snap.active_connections,
        total = snap.total_connections,
        packets_sent = snap.packets_sent,
        packets_received = snap.packets_received,
        bytes_sent = snap.bytes_sent,
        denied = snap.connections_denied,
        io_errors = snap.io_errors,
        "server statistics"
    );
}
