//! `TagRecord`: the variable-length unit of a string-tag file's payload.

use crate::endian::Endian;
use crate::error::{Result, TagCacheError};
use crate::tagkind::TagKind;

/// Sentinel `idxId` for deduplicated kinds (everything but Title/Filename).
pub const NO_OWNER: i32 = -1; // 0xFFFFFFFF as i32

/// One decoded `{ dataLength, idxId, data, 0x00, padding }` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    /// Byte offset of this record's `dataLength` field within its tag file.
    pub offset: i32,
    pub data_length: i32,
    pub idx_id: i32,
    pub data: String,
}

/// Padding bytes needed so `(n + 1 + padding)` is a multiple of 8, 0 for `Filename`.
pub fn padding_len(kind: TagKind, data_len: usize) -> usize {
    if !kind.is_padded() {
        return 0;
    }
    let rem = (data_len + 1) % 8;
    if rem == 0 {
        0
    } else {
        8 - rem
    }
}

/// Total on-disk length of the record's 8-byte prefix plus its payload.
fn record_total_len(data_len: usize, padding: usize) -> usize {
    8 + data_len + 1 + padding
}

impl TagRecord {
    /// Encode this record's `{ dataLength, idxId, data, 0x00, padding }` bytes.
    pub fn encode(kind: TagKind, data: &str, idx_id: i32, endian: Endian) -> Vec<u8> {
        let padding = padding_len(kind, data.len());
        let data_length = (data.len() + 1 + padding) as i32;

        let mut out = Vec::with_capacity(record_total_len(data.len(), padding));
        out.extend_from_slice(&endian.encode_i32(data_length));
        out.extend_from_slice(&endian.encode_i32(idx_id));
        out.extend_from_slice(data.as_bytes());
        out.push(0x00);
        out.extend(std::iter::repeat(b'X').take(padding));
        out
    }

    /// Decode the record starting at `offset` in `bytes`, bounds-checked.
    ///
    /// Returns the record and the offset immediately following it.
    pub fn decode(bytes: &[u8], offset: i32, endian: Endian, file: &str) -> Result<(Self, i32)> {
        let start = offset as usize;
        if offset < super::header::FileHeader::LEN as i32 || start + 8 > bytes.len() {
            return Err(TagCacheError::BadOffset {
                file: file.to_string(),
                offset,
                len: bytes.len(),
            });
        }

        let data_length = endian.decode_i32(&bytes[start..start + 4]);
        let idx_id = endian.decode_i32(&bytes[start + 4..start + 8]);

        let payload_start = start + 8;
        let payload_end = payload_start + data_length.max(0) as usize;
        if data_length < 0 || payload_end > bytes.len() {
            return Err(TagCacheError::BadOffset {
                file: file.to_string(),
                offset,
                len: bytes.len(),
            });
        }

        let payload = &bytes[payload_start..payload_end];
        let nul_pos = payload.iter().position(|&b| b == 0x00).ok_or_else(|| {
            TagCacheError::StringNotNullTerminated {
                file: file.to_string(),
                offset,
            }
        })?;
        let data = String::from_utf8_lossy(&payload[..nul_pos]).into_owned();

        Ok((
            TagRecord {
                offset,
                data_length,
                idx_id,
                data,
            },
            offset + 8 + data_length,
        ))
    }
}

/// Walk a tag file's payload from byte 12, decoding every record in storage order.
pub fn scan_records(bytes: &[u8], endian: Endian, file: &str) -> Result<Vec<TagRecord>> {
    let mut records = Vec::new();
    let mut offset = super::header::FileHeader::LEN as i32;
    while (offset as usize) < bytes.len() {
        let (record, next) = TagRecord::decode(bytes, offset, endian, file)?;
        records.push(record);
        offset = next;
    }
    Ok(records)
}

/// Random-access read of the record starting at `offset`.
pub fn record_at(bytes: &[u8], offset: i32, endian: Endian, file: &str) -> Result<TagRecord> {
    TagRecord::decode(bytes, offset, endian, file).map(|(record, _)| record)
}

/// Linear scan for a record whose `data` equals `s`.
pub fn find_by_string(
    bytes: &[u8],
    endian: Endian,
    s: &str,
    file: &str,
) -> Result<Option<TagRecord>> {
    for record in scan_records(bytes, endian, file)? {
        if record.data == s {
            return Ok(Some(record));
        }
    }
    Ok(None)
}

/// Append a new record to `buffer` and rewrite the header's `size`/`entries`.
///
/// For deduplicated kinds, first scans for an existing record with identical
/// `data` and returns its offset unchanged rather than appending (enforcing I5).
/// Returns the offset of the (possibly pre-existing) record.
pub fn append_record(
    buffer: &mut Vec<u8>,
    kind: TagKind,
    data: &str,
    idx_id: i32,
    endian: Endian,
    file: &str,
) -> Result<i32> {
    if kind.is_deduplicated() {
        if let Some(existing) = find_by_string(buffer, endian, data, file)? {
            return Ok(existing.offset);
        }
    }

    let offset = buffer.len() as i32;
    let encoded = TagRecord::encode(kind, data, idx_id, endian);
    buffer.extend_from_slice(&encoded);

    let header = super::header::FileHeader::parse(buffer, endian, file)?;
    let new_header = super::header::FileHeader {
        magic: header.magic,
        size: header.size + encoded.len() as i32,
        entries: header.entries + 1,
    };
    buffer[0..super::header::FileHeader::LEN].copy_from_slice(&new_header.encode(endian));

    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_aligns_to_eight_bytes() {
        // "A" -> n=1, n+1=2, pad to 8 => padding 6, dataLength 8
        assert_eq!(padding_len(TagKind::Artist, 1), 6);
        // "1234567" -> n=7, n+1=8 already aligned => padding 0
        assert_eq!(padding_len(TagKind::Artist, 7), 0);
        // filename is never padded
        assert_eq!(padding_len(TagKind::Filename, 1), 0);
    }

    #[test]
    fn encode_decode_round_trips() {
        for &e in &[Endian::Little, Endian::Big] {
            let mut buf = vec![0u8; 12];
            let encoded = TagRecord::encode(TagKind::Artist, "Daft Punk", -1, e);
            buf.extend_from_slice(&encoded);
            let (record, next) = TagRecord::decode(&buf, 12, e, "database_0.tcd").unwrap();
            assert_eq!(record.data, "Daft Punk");
            assert_eq!(record.idx_id, -1);
            assert_eq!(next as usize, buf.len());
        }
    }

    #[test]
    fn filename_records_have_no_padding() {
        let encoded = TagRecord::encode(TagKind::Filename, "/a.mp3", 0, Endian::Little);
        // 4 (len) + 4 (idx) + 6 (data) + 1 (nul) = 15, no padding
        assert_eq!(encoded.len(), 15);
    }

    #[test]
    fn bad_offset_is_reported() {
        let buf = vec![0u8; 20];
        let err = TagRecord::decode(&buf, 100, Endian::Little, "database_0.tcd").unwrap_err();
        assert!(matches!(err, TagCacheError::BadOffset { .. }));
    }

    #[test]
    fn append_deduplicates_non_title_filename_kinds() {
        let mut buf = super::super::header::FileHeader::new(0, 0)
            .encode(Endian::Little)
            .to_vec();
        let first = append_record(&mut buf, TagKind::Artist, "A", -1, Endian::Little, "f").unwrap();
        let second = append_record(&mut buf, TagKind::Artist, "A", -1, Endian::Little, "f").unwrap();
        assert_eq!(first, second);
        let header =
            super::super::header::FileHeader::parse(&buf, Endian::Little, "f").unwrap();
        assert_eq!(header.entries, 1);
    }

    #[test]
    fn append_title_never_deduplicates() {
        let mut buf = super::super::header::FileHeader::new(0, 0)
            .encode(Endian::Little)
            .to_vec();
        let first = append_record(&mut buf, TagKind::Title, "x", 0, Endian::Little, "f").unwrap();
        let second = append_record(&mut buf, TagKind::Title, "x", 1, Endian::Little, "f").unwrap();
        assert_ne!(first, second);
        let header =
            super::super::header::FileHeader::parse(&buf, Endian::Little, "f").unwrap();
        assert_eq!(header.entries, 2);
    }
}
