use crate::error::DecodeError;

use super::{ConstPackedSizeBytes, FromBytes, TimePacket, ToBytes};

impl FromBytes for TimePacket {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), DecodeError> {
        if buf.len() < Self::PACKED_SIZE_BYTES {
            return Err(DecodeError::TooShort {
                needed: Self::PACKED_SIZE_BYTES,
                available: buf.len(),
            });
        }
        let timestamp = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        Ok((TimePacket { timestamp }, Self::PACKED_SIZE_BYTES))
    }
}

impl ToBytes for TimePacket {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, DecodeError> {
        if buf.len() < Self::PACKED_SIZE_BYTES {
            return Err(DecodeError::TooShort {
                needed: Self::PACKED_SIZE_BYTES,
                available: buf.len(),
            });
        }
        buf[..Self::PACKED_SIZE_BYTES].copy_from_slice(&self.to_wire());
        Ok(Self::PACKED_SIZE_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_consumes_four() {
        let (packet, consumed) = TimePacket::from_bytes(&[0, 0, 1, 0, 0xAA]).unwrap();
        assert_eq!(packet.timestamp, 256);
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_from_bytes_no_validation() {
        // Slice parsing does not look at the clock.
        let (packet, _) = TimePacket::from_bytes(&[0xFF; 4]).unwrap();
        assert_eq!(packet.timestamp, u32::MAX);
    }

    #[test]
    fn test_to_bytes_short_buffer() {
        let mut buf = [0u8; 3];
        assert_eq!(
            TimePacket::new(1).to_bytes(&mut buf),
            Err(DecodeError::TooShort {
                needed: 4,
                available: 3,
            })
        );
    }

    #[test]
    fn test_to_bytes_writes_prefix_only() {
        let mut buf = [0xEEu8; 6];
        let written = TimePacket::new(0x0A0B_0C0D).to_bytes(&mut buf).unwrap();
        assert_eq!(written, 4);
        assert_eq!(buf, [0x0A, 0x0B, 0x0C, 0x0D, 0xEE, 0xEE]);
    }
}
