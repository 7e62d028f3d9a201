// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Write-only observer for server and connection events.
//!
//! The server never logs through an ambient global. Every [`UtcServer`] and
//! [`Connection`] holds an `Arc<dyn Observer>` handed to it at construction.
//! [`TracingObserver`] is the default and forwards to `tracing`.
//!
//! [`UtcServer`]: crate::server::UtcServer
//! [`Connection`]: crate::connection::Connection

use tracing::{debug, error, info, warn};

/// Sink for human-readable server observations.
///
/// Implementations must be cheap and must not block for long: they are called
/// from the accept loop and from worker threads while a connection is open.
pub trait Observer: Send + Sync {
    /// Per-packet detail.
    fn debug(&self, message: &str);
    /// Lifecycle events (connection accepted or closed, server started).
    fn info(&self, message: &str);
    /// Policy outcomes such as access denied.
    fn warn(&self, message: &str);
    /// I/O failures.
    fn error(&self, message: &str);
}

/// Observer that forwards every message to the `tracing` macros under the
/// `utc_server` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn debug(&self, message: &str) {
        debug!(target: "utc_server", "{message}");
    }

    fn info(&self, message: &str) {
        info!(target: "utc_server", "{message}");
    }

    fn warn(&self, message: &str) {
        warn!(target: "utc_server", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "utc_server", "{message}");
    }
}
