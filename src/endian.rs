//! Endianness selector and the 4-byte integer codec every on-disk field is built from.

/// Byte order used to encode every 4-byte integer field in a tag-cache database.
///
/// Fixed once per database and shared by all ten files (see [`crate::tagcache::decoder`]
/// for the cross-file consistency check).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Encode a signed 32-bit integer to 4 bytes under this endianness.
    pub fn encode_i32(self, n: i32) -> [u8; 4] {
        match self {
            Endian::Big => n.to_be_bytes(),
            Endian::Little => n.to_le_bytes(),
        }
    }

    /// Decode a signed 32-bit integer from exactly 4 bytes under this endianness.
    ///
    /// Callers must supply exactly 4 bytes; a shorter slice is a programming error.
    pub fn decode_i32(self, bytes: &[u8]) -> i32 {
        let arr: [u8; 4] = bytes[..4]
            .try_into()
            .expect("decode_i32 requires at least 4 bytes");
        match self {
            Endian::Big => i32::from_be_bytes(arr),
            Endian::Little => i32::from_le_bytes(arr),
        }
    }

    /// The leading magic byte this endianness produces for [`crate::tagcache::header::MAGIC`],
    /// used as the on-disk endianness probe.
    pub fn probe_byte(self) -> u8 {
        self.encode_i32(super::tagcache::header::MAGIC)[0]
    }

    /// Recover the endianness from a file's leading magic byte.
    ///
    /// Returns `None` if the byte matches neither the big- nor little-endian encoding
    /// of the magic constant.
    pub fn from_probe_byte(byte: u8) -> Option<Self> {
        if byte == Endian::Big.probe_byte() {
            Some(Endian::Big)
        } else if byte == Endian::Little.probe_byte() {
            Some(Endian::Little)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_little_endian() {
        let bytes = Endian::Little.encode_i32(0x5443480F);
        assert_eq!(bytes, [0x0F, 0x48, 0x43, 0x54]);
        assert_eq!(Endian::Little.decode_i32(&bytes), 0x5443480F);
    }

    #[test]
    fn round_trips_big_endian() {
        let bytes = Endian::Big.encode_i32(0x5443480F);
        assert_eq!(bytes, [0x54, 0x43, 0x48, 0x0F]);
        assert_eq!(Endian::Big.decode_i32(&bytes), 0x5443480F);
    }

    #[test]
    fn probe_byte_round_trips() {
        assert_eq!(Endian::from_probe_byte(Endian::Little.probe_byte()), Some(Endian::Little));
        assert_eq!(Endian::from_probe_byte(Endian::Big.probe_byte()), Some(Endian::Big));
        assert_eq!(Endian::from_probe_byte(0xAB), None);
    }

    #[test]
    fn negative_numbers_round_trip() {
        for &e in &[Endian::Little, Endian::Big] {
            let bytes = e.encode_i32(-1);
            assert_eq!(bytes, [0xFF; 4]);
            assert_eq!(e.decode_i32(&bytes), -1);
        }
    }
}
