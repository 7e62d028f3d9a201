// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types for the time server.
//!
//! Two families with different blast radius:
//!
//! - [`UtcServerError`]: setup failures returned by
//!   [`UtcServer::start()`](crate::server::UtcServer::start). Nothing is left
//!   running when one is returned.
//! - [`ConnectionError`]: failures local to a single client connection. They
//!   are logged and counted, and the server keeps serving.
//!
//! Both convert into [`std::io::Error`] for callers that prefer `io::Result`:
//!
//! ```no_run
//! use utc_server::error::UtcServerError;
//! use utc_server::server::UtcServer;
//!
//! # fn example() -> std::io::Result<()> {
//! let server = UtcServer::builder().listen("127.0.0.1").port(37).build();
//! if let Err(e) = server.start() {
//!     if matches!(e, UtcServerError::Bind { .. }) {
//!         eprintln!("port in use or not permitted: {e}");
//!     }
//!     return Err(e.into());
//! }
//! # Ok(())
//! # }
//! ```

use std::io;

use thiserror::Error;

pub use utc_proto::error::DecodeError;

use crate::server_common::ServerState;

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum UtcServerError {
    /// The listen address could not be parsed or resolved.
    #[error("invalid listen address '{address}': {detail}")]
    InvalidListenAddress {
        /// The configured address.
        address: String,
        /// Why it was rejected.
        detail: String,
    },

    /// Creating, binding or listening on the socket failed.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// The resolved address.
        address: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// `start()` was called while the server was not stopped.
    #[error("server is already {0}")]
    AlreadyStarted(ServerState),

    /// A worker or accept thread could not be spawned.
    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        /// Which thread failed.
        role: &'static str,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// Errors local to one client connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The connection was already closed or failed earlier.
    #[error("connection is not open")]
    NotConnected,

    /// The peer closed its end before a full packet was read.
    #[error("connection closed by peer")]
    PeerClosed,

    /// The socket accepted zero bytes; nothing more can be written.
    #[error("socket accepted no bytes ({written} of {total} written)")]
    WriteZero {
        /// Bytes written before the stall.
        written: usize,
        /// Bytes in the full packet.
        total: usize,
    },

    /// A packet was read but failed to decode or validate.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Socket send/receive failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<UtcServerError> for io::Error {
    fn from(err: UtcServerError) -> io::Error {
        let kind = match &err {
            UtcServerError::InvalidListenAddress { .. } => io::ErrorKind::InvalidInput,
            UtcServerError::Bind { source, .. } | UtcServerError::Spawn { source, .. } => {
                source.kind()
            }
            UtcServerError::AlreadyStarted(_) => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

impl From<ConnectionError> for io::Error {
    fn from(err: ConnectionError) -> io::Error {
        match err {
            // Preserve the original io::Error directly.
            ConnectionError::Io(e) => e,
            ConnectionError::Decode(e) => e.into(),
            ConnectionError::NotConnected => io::Error::new(io::ErrorKind::NotConnected, err),
            ConnectionError::PeerClosed => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            ConnectionError::WriteZero { .. } => io::Error::new(io::ErrorKind::WriteZero, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let e = UtcServerError::InvalidListenAddress {
            address: "bad".to_string(),
            detail: "empty address".to_string(),
        };
        assert_eq!(e.to_string(), "invalid listen address 'bad': empty address");

        let e = UtcServerError::AlreadyStarted(ServerState::Running);
        assert_eq!(e.to_string(), "server is already running");
    }

    #[test]
    fn test_bind_error_keeps_kind_and_source() {
        let e = UtcServerError::Bind {
            address: "127.0.0.1:37".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(std::error::Error::source(&e).is_some());
        let io_err: io::Error = e.into();
        assert_eq!(io_err.kind(), io::ErrorKind::AddrInUse);
    }

    #[test]
    fn test_connection_error_to_io_kind() {
        let cases: Vec<(ConnectionError, io::ErrorKind)> = vec![
            (ConnectionError::NotConnected, io::ErrorKind::NotConnected),
            (ConnectionError::PeerClosed, io::ErrorKind::UnexpectedEof),
            (
                ConnectionError::WriteZero {
                    written: 1,
                    total: 4,
                },
                io::ErrorKind::WriteZero,
            ),
            (
                ConnectionError::Decode(DecodeError::Invalid {
                    timestamp: 9,
                    limit: 1,
                }),
                io::ErrorKind::InvalidData,
            ),
        ];
        for (conn_err, expected_kind) in cases {
            let io_err: io::Error = conn_err.into();
            assert_eq!(io_err.kind(), expected_kind);
        }
    }

    #[test]
    fn test_io_error_passthrough() {
        let orig = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let io_err: io::Error = ConnectionError::from(orig).into();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(io_err.to_string(), "reset");
    }

    #[test]
    fn test_write_zero_display() {
        let e = ConnectionError::WriteZero {
            written: 2,
            total: 4,
        };
        assert_eq!(e.to_string(), "socket accepted no bytes (2 of 4 written)");
    }
}
