//! The dumper's tabular and plaintext renderers (§6 "tabular dump").
//!
//! Both operate purely on already-decoded data — they never touch disk or
//! re-derive anything the decoder didn't already compute.

use crate::error::Result;
use crate::tagcache::database::Database;
use crate::tagcache::decoder::DecodedDatabase;
use crate::tagcache::record::scan_records;
use crate::tagkind::TagKind;
use std::fmt::Write as _;

/// Render one tag file's records as a table: offset, data length, idxId, data,
/// and the padding byte count actually present.
pub fn render_tag_file(kind: TagKind, db: &Database) -> Result<String> {
    let records = scan_records(db.tag_file(kind), db.endian, kind.filename())?;

    let mut out = String::new();
    let _ = writeln!(out, "{} ({} records)", kind.display_name(), records.len());
    let _ = writeln!(out, "{:<10} {:<12} {:<10} {:<8} data", "offset", "data_length", "idx_id", "padding");
    for record in &records {
        let content_len = record.data.len() + 1;
        let padding = (record.data_length as usize).saturating_sub(content_len);
        let _ = writeln!(
            out,
            "0x{:08X} {:<12} {:<10} {:<8} {:?}",
            record.offset, record.data_length, record.idx_id, padding, record.data
        );
    }
    Ok(out)
}

/// Render every index row as a table: row number, nine resolved tag strings,
/// thirteen numeric fields, the flags word in hex, and its five named bits.
pub fn render_index(decoded: &DecodedDatabase) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "index header: entries={} serial={} commitId={} dirty={}",
        decoded.index_header.file.entries, decoded.index_header.serial, decoded.index_header.commit_id, decoded.index_header.dirty
    );
    for (i, row) in decoded.rows.iter().enumerate() {
        let _ = writeln!(out, "--- row {i} ---");
        let _ = writeln!(
            out,
            "  artist={:?} album={:?} genre={:?} title={:?} filename={:?}",
            row.tags[0], row.tags[1], row.tags[2], row.tags[3], row.tags[4]
        );
        let _ = writeln!(
            out,
            "  composer={:?} comment={:?} albumArtist={:?} grouping={:?}",
            row.tags[5], row.tags[6], row.tags[7], row.tags[8]
        );
        let _ = writeln!(
            out,
            "  year={} disc={} track={} bitrate={} lengthMs={} playCount={} rating={}",
            row.year, row.disc, row.track, row.bitrate, row.length_ms, row.play_count, row.rating
        );
        let _ = writeln!(
            out,
            "  playTime={} lastPlayed={} commitId={} mtime={} lastElapsed={} lastOffset={}",
            row.play_time, row.last_played, row.commit_id, row.mtime, row.last_elapsed, row.last_offset
        );
        let _ = writeln!(
            out,
            "  flags=0x{:08X} deleted={} dirCache={} dirtyNum={} trkNumGen={} resurrected={}",
            row.flags.to_i32(),
            row.flags.deleted,
            row.flags.dir_cache,
            row.flags.dirty_num,
            row.flags.resurrected,
            row.flags.trk_num_gen,
        );
    }
    out
}

/// Render every index row as one line of pipe-separated resolved tag strings,
/// for quick eyeballing without the full tabular layout.
pub fn render_plaintext(decoded: &DecodedDatabase) -> String {
    let mut out = String::new();
    for row in &decoded.rows {
        let _ = writeln!(out, "{}", row.tags.join(" | "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endian::Endian;
    use crate::model::{RawTrack, Track};
    use crate::tagcache::decoder::decode_database;

    #[test]
    fn render_tag_file_lists_every_record() {
        let tracks: Vec<Track> = vec![RawTrack {
            artist: Some("Daft Punk".to_string()),
            ..Default::default()
        }
        .into()];
        let db = Database::generate(Endian::Little, &tracks);
        let table = render_tag_file(TagKind::Artist, &db).unwrap();
        assert!(table.contains("Daft Punk"));
    }

    #[test]
    fn render_index_includes_resolved_tags() {
        let tracks: Vec<Track> = vec![RawTrack {
            artist: Some("Daft Punk".to_string()),
            title: Some("One More Time".to_string()),
            ..Default::default()
        }
        .into()];
        let db = Database::generate(Endian::Little, &tracks);
        let decoded = decode_database(&db).unwrap();
        let table = render_index(&decoded);
        assert!(table.contains("Daft Punk"));
        assert!(table.contains("One More Time"));
    }

    #[test]
    fn render_plaintext_is_one_line_per_row() {
        let tracks: Vec<Track> = vec![RawTrack::default().into(), RawTrack::default().into()];
        let db = Database::generate(Endian::Little, &tracks);
        let decoded = decode_database(&db).unwrap();
        let text = render_plaintext(&decoded);
        assert_eq!(text.lines().count(), 2);
    }
}
