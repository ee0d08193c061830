//! Read-only decoding: resolve a loaded [`Database`]'s index rows into their
//! string tag values, keeping a raw offset view alongside for diagnostics.

use super::database::Database;
use super::index::IndexRow;
use crate::error::Result;
use crate::tagkind::{TagKind, NUM_STRING_KINDS, STRING_KINDS};
use std::collections::HashMap;
use std::path::Path;

/// One index row with its nine tag offsets resolved to strings.
#[derive(Debug, Clone)]
pub struct DecodedRow {
    /// Resolved tag string per kind, indexed by `TagKind::ordinal()`. An offset
    /// this row references but that no tag file actually has a record at resolves
    /// to a diagnostic placeholder rather than failing the whole decode.
    pub tags: [String; NUM_STRING_KINDS],
    /// The raw offsets backing `tags`, kept for the tabular dumper's offsets view.
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
    pub flags: super::index::Flags,
}

/// A fully decoded database: every index row with its tags resolved.
#[derive(Debug, Clone)]
pub struct DecodedDatabase {
    pub endian: crate::endian::Endian,
    pub index_header: super::header::IndexHeader,
    pub rows: Vec<DecodedRow>,
}

fn placeholder(offset: i32) -> String {
    format!("<unresolved offset 0x{:08X}>", offset)
}

fn offset_map(bytes: &[u8], endian: crate::endian::Endian, file: &str) -> Result<HashMap<i32, String>> {
    let mut map = HashMap::new();
    for record in super::record::scan_records(bytes, endian, file)? {
        map.insert(record.offset, record.data);
    }
    Ok(map)
}

fn resolve_row(row: &IndexRow, maps: &HashMap<TagKind, HashMap<i32, String>>) -> DecodedRow {
    let mut tags: [String; NUM_STRING_KINDS] = Default::default();
    for kind in STRING_KINDS {
        let offset = row.offsets[kind.ordinal() as usize];
        let resolved = maps[&kind]
            .get(&offset)
            .cloned()
            .unwrap_or_else(|| placeholder(offset));
        tags[kind.ordinal() as usize] = resolved;
    }

    DecodedRow {
        tags,
        offsets: row.offsets,
        year: row.year,
        disc: row.disc,
        track: row.track,
        bitrate: row.bitrate,
        length_ms: row.length_ms,
        play_count: row.play_count,
        rating: row.rating,
        play_time: row.play_time,
        last_played: row.last_played,
        commit_id: row.commit_id,
        mtime: row.mtime,
        last_elapsed: row.last_elapsed,
        last_offset: row.last_offset,
        flags: row.flags,
    }
}

/// Load every file in `dir` and resolve all index rows (§4.4/§6).
pub fn decode(dir: &Path) -> Result<DecodedDatabase> {
    let db = Database::load(dir)?;
    decode_database(&db)
}

/// Resolve an already-loaded [`Database`]'s index rows without touching disk.
pub fn decode_database(db: &Database) -> Result<DecodedDatabase> {
    let mut maps = HashMap::new();
    for kind in STRING_KINDS {
        maps.insert(
            kind,
            offset_map(db.tag_file(kind), db.endian, kind.filename())?,
        );
    }

    let index_header = db.index_header()?;
    let rows = super::index::rows(
        db.index_bytes(),
        index_header.file.entries,
        db.endian,
        TagKind::Index.filename(),
    )?;

    let decoded_rows = rows.iter().map(|row| resolve_row(row, &maps)).collect();

    log::info!(
        "Decoded {} index rows ({:?} endian)",
        index_header.file.entries,
        db.endian
    );

    Ok(DecodedDatabase {
        endian: db.endian,
        index_header,
        rows: decoded_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endian::Endian;
    use crate::model::{RawTrack, Track};

    #[test]
    fn generated_database_decodes_to_matching_tags() {
        let tracks: Vec<Track> = vec![
            RawTrack {
                artist: Some("Daft Punk".to_string()),
                title: Some("One More Time".to_string()),
                ..Default::default()
            }
            .into(),
        ];
        let db = Database::generate(Endian::Little, &tracks);
        let decoded = decode_database(&db).unwrap();
        assert_eq!(decoded.rows.len(), 1);
        assert_eq!(decoded.rows[0].tags[TagKind::Artist.ordinal() as usize], "Daft Punk");
        assert_eq!(decoded.rows[0].tags[TagKind::Title.ordinal() as usize], "One More Time");
        assert_eq!(decoded.rows[0].tags[TagKind::Genre.ordinal() as usize], crate::model::UNTAGGED);
    }

    #[test]
    fn unresolved_offset_produces_placeholder_not_error() {
        let tracks: Vec<Track> = vec![RawTrack::default().into()];
        let db = Database::generate(Endian::Little, &tracks);
        let mut maps = HashMap::new();
        for kind in STRING_KINDS {
            maps.insert(kind, HashMap::new());
        }
        let row = super::super::index::rows(db.index_bytes(), 1, db.endian, "idx").unwrap()[0];
        let decoded = resolve_row(&row, &maps);
        assert!(decoded.tags[0].starts_with("<unresolved offset"));
    }
}
