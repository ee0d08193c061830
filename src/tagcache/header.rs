//! The 12-byte `FileHeader` shared by all ten files, and the 24-byte `IndexHeader`
//! extension carried only by the master index.

use crate::endian::Endian;
use crate::error::{Result, TagCacheError};

/// Constant `0x5443480F`; its leading byte on disk doubles as the endianness probe.
pub const MAGIC: i32 = 0x5443480F;

/// `{ magic, size, entries }`, 12 bytes, present at the start of every tag-cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: i32,
    /// Length in bytes of the payload following this header.
    pub size: i32,
    /// Number of records (TagRecords, or IndexRows for the index file).
    pub entries: i32,
}

impl FileHeader {
    pub const LEN: usize = 12;

    pub fn new(size: i32, entries: i32) -> Self {
        Self {
            magic: MAGIC,
            size,
            entries,
        }
    }

    pub fn parse(bytes: &[u8], endian: Endian, file: &str) -> Result<Self> {
        if bytes.len() < Self::LEN {
            return Err(TagCacheError::MalformedHeader {
                file: file.to_string(),
                len: bytes.len(),
                needed: Self::LEN,
            });
        }
        let magic = endian.decode_i32(&bytes[0..4]);
        if magic != MAGIC {
            return Err(TagCacheError::BadMagic {
                file: file.to_string(),
                byte: bytes[0],
            });
        }
        Ok(Self {
            magic,
            size: endian.decode_i32(&bytes[4..8]),
            entries: endian.decode_i32(&bytes[8..12]),
        })
    }

    pub fn encode(&self, endian: Endian) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..4].copy_from_slice(&endian.encode_i32(self.magic));
        out[4..8].copy_from_slice(&endian.encode_i32(self.size));
        out[8..12].copy_from_slice(&endian.encode_i32(self.entries));
        out
    }
}

/// `FileHeader` extended by `{ serial, commitId, dirty }`, 24 bytes, the master
/// index's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub file: FileHeader,
    pub serial: i32,
    pub commit_id: i32,
    pub dirty: i32,
}

impl IndexHeader {
    pub const LEN: usize = 24;

    /// A fresh index header: `serial = 0`, `commitId = 1`, `dirty = 0`.
    pub fn fresh(entries: i32, size: i32) -> Self {
        Self {
            file: FileHeader::new(size, entries),
            serial: 0,
            commit_id: 1,
            dirty: 0,
        }
    }

    pub fn parse(bytes: &[u8], endian: Endian, file: &str) -> Result<Self> {
        if bytes.len() < Self::LEN {
            return Err(TagCacheError::MalformedHeader {
                file: file.to_string(),
                len: bytes.len(),
                needed: Self::LEN,
            });
        }
        let header = FileHeader::parse(bytes, endian, file)?;
        Ok(Self {
            file: header,
            serial: endian.decode_i32(&bytes[12..16]),
            commit_id: endian.decode_i32(&bytes[16..20]),
            dirty: endian.decode_i32(&bytes[20..24]),
        })
    }

    pub fn encode(&self, endian: Endian) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..12].copy_from_slice(&self.file.encode(endian));
        out[12..16].copy_from_slice(&endian.encode_i32(self.serial));
        out[16..20].copy_from_slice(&endian.encode_i32(self.commit_id));
        out[20..24].copy_from_slice(&endian.encode_i32(self.dirty));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_header_round_trips() {
        let h = FileHeader::new(123, 4);
        for &e in &[Endian::Little, Endian::Big] {
            let bytes = h.encode(e);
            let parsed = FileHeader::parse(&bytes, e, "test").unwrap();
            assert_eq!(parsed, h);
        }
    }

    #[test]
    fn file_header_rejects_short_input() {
        let err = FileHeader::parse(&[0u8; 4], Endian::Little, "database_0.tcd").unwrap_err();
        assert!(matches!(err, TagCacheError::MalformedHeader { .. }));
    }

    #[test]
    fn file_header_rejects_bad_magic() {
        let bytes = [0u8; 12];
        let err = FileHeader::parse(&bytes, Endian::Little, "database_0.tcd").unwrap_err();
        assert!(matches!(err, TagCacheError::BadMagic { .. }));
    }

    #[test]
    fn index_header_round_trips() {
        let h = IndexHeader::fresh(5, 460);
        for &e in &[Endian::Little, Endian::Big] {
            let bytes = h.encode(e);
            let parsed = IndexHeader::parse(&bytes, e, "database_idx.tcd").unwrap();
            assert_eq!(parsed, h);
        }
    }
}
