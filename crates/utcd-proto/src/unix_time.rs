// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Unix time helpers for 32-bit Time Protocol timestamps.
//!
//! Formatting and parsing use `YYYY-MM-DD HH:MM:SS UTC` and are always in
//! UTC, never local time.
//!
//! [`parse`] returns `None` for anything it cannot read, which keeps
//! "unparsable" distinct from the perfectly valid timestamp `0`. Callers that
//! still need the historical contract of a zero sentinel can use
//! [`parse_or_zero`], but must then treat `0` as ambiguous.

use chrono::{DateTime, NaiveDateTime};
use std::time;

/// `strftime` pattern used for formatting, without the zone suffix.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Suffix appended by [`format`] and accepted by [`parse`].
const UTC_SUFFIX: &str = " UTC";

/// Current system time as whole seconds since the Unix epoch.
///
/// Clocks set before 1970 yield `0`; clocks past 2106-02-07 saturate at
/// `u32::MAX`.
pub fn now_secs() -> u32 {
    match time::SystemTime::now().duration_since(time::UNIX_EPOCH) {
        Ok(duration) => u32::try_from(duration.as_secs()).unwrap_or(u32::MAX),
        Err(_) => 0,
    }
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// ```
/// assert_eq!(utc_proto::unix_time::format(86_400), "1970-01-02 00:00:00 UTC");
/// ```
pub fn format(timestamp: u32) -> String {
    match DateTime::from_timestamp(i64::from(timestamp), 0) {
        Some(dt) => format!("{}{}", dt.format(TIME_FORMAT), UTC_SUFFIX),
        None => "Invalid timestamp".to_string(),
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS`, optionally followed by `" UTC"`.
///
/// Returns `None` when the text does not match or the instant does not fit
/// in an unsigned 32-bit Unix timestamp.
///
/// ```
/// use utc_proto::unix_time::parse;
///
/// assert_eq!(parse("1970-01-01 00:00:00 UTC"), Some(0));
/// assert_eq!(parse("not a date"), None);
/// ```
pub fn parse(text: &str) -> Option<u32> {
    let text = text.strip_suffix(UTC_SUFFIX).unwrap_or(text);
    let naive = NaiveDateTime::parse_from_str(text, TIME_FORMAT).ok()?;
    u32::try_from(naive.and_utc().timestamp()).ok()
}

/// Legacy form of [`parse`]: `0` on failure.
///
/// A return of `0` is ambiguous between the epoch and a parse failure; do not
/// forward it as a protocol value without checking.
pub fn parse_or_zero(text: &str) -> u32 {
    parse(text).unwrap_or(0)
}
