//! rbtagcache - a byte-exact codec for Rockbox tag-cache databases
//!
//! Builds, decodes, and mutates the nine string-tag files plus the master
//! index that make up a Rockbox `.rockbox/database_*.tcd` directory.

pub mod endian;
pub mod error;
pub mod model;
pub mod render;
pub mod tagcache;
pub mod tagkind;

pub use endian::Endian;
pub use error::{Result, TagCacheError};
pub use model::{RawTrack, Track, TrackSource};
pub use tagcache::{Database, DecodedDatabase};
pub use tagkind::TagKind;
