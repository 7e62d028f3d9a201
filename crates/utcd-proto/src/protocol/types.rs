use core::fmt;

use super::{ConstPackedSizeBytes, be_u32_to_bytes};
use crate::unix_time;

/// **Time Protocol packet** - the whole server response: one 32-bit unsigned
/// count of seconds since 1970-01-01 00:00:00 UTC, sent in network byte order.
///
/// ### Layout
///
/// ```ignore
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Seconds                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimePacket {
    /// Seconds since the Unix epoch.
    pub timestamp: u32,
}

impl TimePacket {
    /// Create a packet carrying `timestamp`.
    pub const fn new(timestamp: u32) -> Self {
        TimePacket { timestamp }
    }

    /// Create a packet carrying the current system time.
    pub fn now() -> Self {
        TimePacket::new(unix_time::now_secs())
    }

    /// The packet's wire bytes.
    pub fn to_wire(&self) -> [u8; Self::PACKED_SIZE_BYTES] {
        be_u32_to_bytes(self.timestamp)
    }

    /// Whether the timestamp passes [`validate`](super::validate) against the
    /// current system time.
    pub fn is_valid(&self) -> bool {
        super::validate(self.timestamp, unix_time::now_secs())
    }
}

impl ConstPackedSizeBytes for TimePacket {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl From<u32> for TimePacket {
    fn from(timestamp: u32) -> Self {
        TimePacket::new(timestamp)
    }
}

impl From<TimePacket> for u32 {
    fn from(packet: TimePacket) -> Self {
        packet.timestamp
    }
}

impl fmt::Display for TimePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimePacket{{timestamp={}, time={}, valid={}}}",
            self.timestamp,
            unix_time::format(self.timestamp),
            self.is_valid()
        )
    }
}
