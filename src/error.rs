//! Typed failure modes for the tag-cache codec.

use crate::tagkind::TagKind;
use thiserror::Error;

/// Everything that can go wrong reading, writing, or editing a tag-cache database.
///
/// Core codec operations return this directly rather than an opaque boxed error, so
/// callers can match on e.g. [`TagCacheError::EndianMismatch`] vs
/// [`TagCacheError::DanglingOffset`] the way `sortTags`/`sortIndex` callers are
/// expected to.
#[derive(Debug, Error)]
pub enum TagCacheError {
    #[error("{file} is too short for a valid header ({len} bytes, need at least {needed})")]
    MalformedHeader {
        file: String,
        len: usize,
        needed: usize,
    },

    #[error("{file} magic byte does not match the tag-cache magic (got 0x{byte:02X})")]
    BadMagic { file: String, byte: u8 },

    #[error("database files disagree on endianness: {first_file} implies {first:?}, {other_file} implies {other:?}")]
    EndianMismatch {
        first_file: String,
        first: crate::endian::Endian,
        other_file: String,
        other: crate::endian::Endian,
    },

    #[error("offset {offset} in {file} is outside the file's payload (len {len})")]
    BadOffset {
        file: String,
        offset: i32,
        len: usize,
    },

    #[error("record at offset {offset} in {file} has no NUL terminator within its declared length")]
    StringNotNullTerminated { file: String, offset: i32 },

    #[error("index row {row} references offset {offset} in {kind:?}, which no longer exists after the edit")]
    DanglingOffset {
        kind: TagKind,
        row: usize,
        offset: i32,
    },

    #[error("database directory {dir} is missing: {missing:?}")]
    MissingDatabase { dir: String, missing: Vec<String> },

    #[error("external tag extraction failed: {0}")]
    TagExtractionFailure(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TagCacheError>;
