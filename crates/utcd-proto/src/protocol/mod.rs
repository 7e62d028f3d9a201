//! Types and constants for the Time Protocol (RFC 868).
//!
//! A server answers every connection with exactly one [`TimePacket`]: four
//! octets holding a big-endian, unsigned 32-bit count of seconds. The free
//! functions [`encode`], [`decode`] and [`validate`] are the codec used by the
//! server; the [`FromBytes`]/[`ToBytes`] and [`ReadBytes`]/[`WriteBytes`]
//! traits expose the same format over slices and `std::io` streams.

/// Well-known Time Protocol port.
pub const PORT: u16 = 37;

/// How far into the future (in seconds) a decoded timestamp may lie.
pub const TOLERANCE_SECS: u32 = 3600;

/// Serialize a timestamp into its 4-byte network-endian wire form.
///
/// Byte 0 carries the most significant octet. This never fails.
///
/// ```
/// assert_eq!(utc_proto::protocol::encode(0x0102_0304), [1, 2, 3, 4]);
/// ```
pub fn encode(timestamp: u32) -> [u8; TimePacket::PACKED_SIZE_BYTES] {
    be_u32_to_bytes(timestamp)
}

/// Decode a packet from `buf` and validate it against the system clock.
///
/// Fails with [`DecodeError::TooShort`] when fewer than four bytes are given,
/// and with [`DecodeError::Invalid`] when the timestamp is more than
/// [`TOLERANCE_SECS`] ahead of now. Extra trailing bytes are ignored.
pub fn decode(buf: &[u8]) -> Result<TimePacket, DecodeError> {
    decode_at(buf, crate::unix_time::now_secs())
}

/// Decode and validate a packet against an explicit `now`.
pub fn decode_at(buf: &[u8], now: u32) -> Result<TimePacket, DecodeError> {
    let (packet, _) = TimePacket::from_bytes(buf)?;
    if !validate(packet.timestamp, now) {
        return Err(DecodeError::Invalid {
            timestamp: packet.timestamp,
            limit: tolerance_limit(now),
        });
    }
    Ok(packet)
}

/// Check that `timestamp` is no later than `now + TOLERANCE_SECS`.
///
/// There is no lower bound: any representable value up to the limit is
/// accepted, including zero.
pub fn validate(timestamp: u32, now: u32) -> bool {
    u64::from(timestamp) <= tolerance_limit(now)
}

// Widened so the limit does not wrap near u32::MAX.
fn tolerance_limit(now: u32) -> u64 {
    u64::from(now) + u64::from(TOLERANCE_SECS)
}

pub(crate) fn be_u32_to_bytes(u: u32) -> [u8; 4] {
    [
        (u >> 24 & 0xff) as u8,
        (u >> 16 & 0xff) as u8,
        (u >> 8 & 0xff) as u8,
        (u & 0xff) as u8,
    ]
}

mod bytes;
mod io;
mod traits;
mod types;

pub use self::traits::*;
pub use self::types::*;

use crate::error::DecodeError;
