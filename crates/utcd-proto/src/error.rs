// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types for Time Protocol packet decoding.
//!
//! [`DecodeError`] carries no heap data. It implements [`std::error::Error`]
//! and converts into [`std::io::Error`] so it can flow through socket code
//! that returns `io::Result`.

use core::fmt;

/// Errors that can occur while decoding or serializing a time packet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The buffer holds fewer bytes than a packet needs.
    TooShort {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },
    /// The decoded timestamp lies beyond the accepted future tolerance.
    Invalid {
        /// The timestamp carried by the packet.
        timestamp: u32,
        /// The latest timestamp that would have been accepted.
        limit: u64,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TooShort { needed, available } => {
                write!(
                    f,
                    "time packet too short: needed {} bytes, got {}",
                    needed, available
                )
            }
            DecodeError::Invalid { timestamp, limit } => {
                write!(
                    f,
                    "timestamp {} is beyond the accepted limit {}",
                    timestamp, limit
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for std::io::Error {
    fn from(err: DecodeError) -> std::io::Error {
        let kind = match &err {
            DecodeError::TooShort { .. } => std::io::ErrorKind::UnexpectedEof,
            DecodeError::Invalid { .. } => std::io::ErrorKind::InvalidData,
        };
        std::io::Error::new(kind, err)
    }
}
