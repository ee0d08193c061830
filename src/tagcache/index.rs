//! `IndexRow`: the 92-byte fixed-width master-index record.

use crate::endian::Endian;
use crate::error::{Result, TagCacheError};
use crate::tagkind::NUM_STRING_KINDS;

/// 23 four-byte fields per row.
pub const NUM_FIELDS: usize = 23;
/// `23 * 4`.
pub const ROW_LEN: usize = NUM_FIELDS * 4;

/// Flag bitfield occupying the row's last 4-byte field.
///
/// Bit layout (LSB first): 0 deleted, 1 dirCache, 2 dirtyNum, 3 trkNumGen,
/// 4 resurrected. The upper 16 bits are an opaque "high" field preserved verbatim
/// across round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub deleted: bool,
    pub dir_cache: bool,
    pub dirty_num: bool,
    pub trk_num_gen: bool,
    pub resurrected: bool,
    pub high: u16,
}

impl Flags {
    pub fn from_i32(v: i32) -> Self {
        let bits = v as u32;
        Flags {
            deleted: bits & 0x1 != 0,
            dir_cache: bits & 0x2 != 0,
            dirty_num: bits & 0x4 != 0,
            trk_num_gen: bits & 0x8 != 0,
            resurrected: bits & 0x10 != 0,
            high: (bits >> 16) as u16,
        }
    }

    pub fn to_i32(self) -> i32 {
        let mut bits: u32 = (self.high as u32) << 16;
        if self.deleted {
            bits |= 0x1;
        }
        if self.dir_cache {
            bits |= 0x2;
        }
        if self.dirty_num {
            bits |= 0x4;
        }
        if self.trk_num_gen {
            bits |= 0x8;
        }
        if self.resurrected {
            bits |= 0x10;
        }
        bits as i32
    }
}

/// A single 92-byte master-index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRow {
    /// Byte offset into each of the nine string-tag files, indexed by `TagKind`
    /// ordinal (0 = Artist .. 8 = Grouping).
    pub offsets: [i32; NUM_STRING_KINDS],
    pub year: i32,
    pub disc: i32,
    pub track: i32,
    pub bitrate: i32,
    pub length_ms: i32,
    pub play_count: i32,
    pub rating: i32,
    pub play_time: i32,
    pub last_played: i32,
    pub commit_id: i32,
    pub mtime: i32,
    pub last_elapsed: i32,
    pub last_offset: i32,
    pub flags: Flags,
}

impl Default for IndexRow {
    fn default() -> Self {
        IndexRow {
            offsets: [0; NUM_STRING_KINDS],
            year: 0,
            disc: 0,
            track: 0,
            bitrate: 0,
            length_ms: 0,
            play_count: 0,
            rating: 0,
            play_time: 0,
            last_played: 0,
            commit_id: 0,
            mtime: 0,
            last_elapsed: 0,
            last_offset: 0,
            flags: Flags::default(),
        }
    }
}

impl IndexRow {
    /// Decode a 92-byte row. `bytes` must be exactly `ROW_LEN` long.
    pub fn decode(bytes: &[u8], endian: Endian) -> Self {
        debug_assert_eq!(bytes.len(), ROW_LEN);
        let field = |i: usize| endian.decode_i32(&bytes[i * 4..i * 4 + 4]);

        let mut offsets = [0i32; NUM_STRING_KINDS];
        for (i, slot) in offsets.iter_mut().enumerate() {
            *slot = field(i);
        }

        IndexRow {
            offsets,
            year: field(9),
            disc: field(10),
            track: field(11),
            bitrate: field(12),
            length_ms: field(13),
            play_count: field(14),
            rating: field(15),
            play_time: field(16),
            last_played: field(17),
            commit_id: field(18),
            mtime: field(19),
            last_elapsed: field(20),
            last_offset: field(21),
            flags: Flags::from_i32(field(22)),
        }
    }

    /// Encode into the canonical 92-byte row layout.
    pub fn encode(&self, endian: Endian) -> [u8; ROW_LEN] {
        let mut out = [0u8; ROW_LEN];
        let mut put = |i: usize, v: i32| out[i * 4..i * 4 + 4].copy_from_slice(&endian.encode_i32(v));

        for (i, &offset) in self.offsets.iter().enumerate() {
            put(i, offset);
        }
        put(9, self.year);
        put(10, self.disc);
        put(11, self.track);
        put(12, self.bitrate);
        put(13, self.length_ms);
        put(14, self.play_count);
        put(15, self.rating);
        put(16, self.play_time);
        put(17, self.last_played);
        put(18, self.commit_id);
        put(19, self.mtime);
        put(20, self.last_elapsed);
        put(21, self.last_offset);
        put(22, self.flags.to_i32());
        out
    }
}

/// Read row `i` from the index file's payload (rows start at byte 24).
pub fn row_at(bytes: &[u8], i: usize, endian: Endian, file: &str) -> Result<IndexRow> {
    let start = super::header::IndexHeader::LEN + i * ROW_LEN;
    let end = start + ROW_LEN;
    if end > bytes.len() {
        return Err(TagCacheError::BadOffset {
            file: file.to_string(),
            offset: start as i32,
            len: bytes.len(),
        });
    }
    Ok(IndexRow::decode(&bytes[start..end], endian))
}

/// Iterate every row declared by the header's `entries` count.
pub fn rows(bytes: &[u8], entries: i32, endian: Endian, file: &str) -> Result<Vec<IndexRow>> {
    (0..entries as usize)
        .map(|i| row_at(bytes, i, endian, file))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_round_trips() {
        let row = IndexRow {
            offsets: [12, 20, 28, 36, 44, 52, 60, 68, 76],
            year: 2000,
            disc: 1,
            track: 1,
            bitrate: 128,
            length_ms: 1000,
            play_count: 0,
            rating: 0,
            play_time: 0,
            last_played: 0,
            commit_id: 1,
            mtime: 0,
            last_elapsed: 0,
            last_offset: 0,
            flags: Flags {
                deleted: true,
                dir_cache: false,
                dirty_num: true,
                trk_num_gen: false,
                resurrected: true,
                high: 0xBEEF,
            },
        };
        for &e in &[Endian::Little, Endian::Big] {
            let bytes = row.encode(e);
            assert_eq!(bytes.len(), ROW_LEN);
            let decoded = IndexRow::decode(&bytes, e);
            assert_eq!(decoded, row);
        }
    }

    #[test]
    fn flags_preserve_high_bits_and_named_bits() {
        let flags = Flags {
            deleted: false,
            dir_cache: true,
            dirty_num: false,
            trk_num_gen: true,
            resurrected: false,
            high: 0x1234,
        };
        let v = flags.to_i32();
        assert_eq!(Flags::from_i32(v), flags);
    }
}
