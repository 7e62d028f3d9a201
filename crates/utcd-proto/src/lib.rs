// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Time Protocol (RFC 868) packet types and codec.
//!
//! The Time Protocol answers every TCP connection with a single 32-bit,
//! network-endian count of seconds and then closes. This crate provides the
//! [`protocol::TimePacket`] value type, its slice and stream codecs, timestamp
//! validation, and the human-readable time helpers in [`unix_time`].
//!
//! All timestamps are seconds since the Unix epoch (1970-01-01 00:00:00 UTC).

#![warn(missing_docs)]

/// Error types for packet decoding and validation.
pub mod error;

/// Time Protocol packet type, constants and codec traits.
pub mod protocol;

/// Current-time, formatting and parsing helpers for 32-bit Unix timestamps.
pub mod unix_time;
