//! The three mutating operations (§4.7): append one or more tracks, re-sort a
//! tag file's records, and re-sort the index's row order.
//!
//! Each operation builds its replacement buffers in full before touching `db`,
//! so a failure midway (a dangling offset, a bad header) leaves the database
//! exactly as it was.

use super::database::Database;
use super::header::{FileHeader, IndexHeader};
use super::index::IndexRow;
use super::record::{self, TagRecord};
use crate::error::{Result, TagCacheError};
use crate::model::{field_for_kind, TrackSource};
use crate::tagkind::{TagKind, STRING_KINDS};
use std::cmp::Ordering;
use std::collections::HashMap;

fn rewrite_index_header(db: &mut Database, entries_delta: i32, size_delta: i32, commit_delta: i32) -> Result<()> {
    let current = db.index_header()?;
    let new_header = IndexHeader {
        file: FileHeader {
            magic: current.file.magic,
            size: current.file.size + size_delta,
            entries: current.file.entries + entries_delta,
        },
        serial: current.serial,
        commit_id: current.commit_id + commit_delta,
        dirty: current.dirty,
    };
    db.index_bytes_mut()[0..IndexHeader::LEN].copy_from_slice(&new_header.encode(db.endian));
    Ok(())
}

/// Append one track's tag data and a new index row (AppendTrack).
///
/// Unlike [`append_tracks`], a lone `append_track` does NOT advance `commitId` —
/// the original only bumps `commitId` in the batch entry point.
pub fn append_track<T: TrackSource>(db: &mut Database, track: &T) -> Result<()> {
    let new_rows = build_rows(db, std::slice::from_ref(track))?;
    write_rows(db, &new_rows, 0)?;
    log::info!("Appended 1 track to the database");
    Ok(())
}

/// Append N tracks in one batch: `entries` grows by N, and `commitId` advances by
/// exactly 1 regardless of N (AppendTracks).
pub fn append_tracks<T: TrackSource>(db: &mut Database, tracks: &[T]) -> Result<()> {
    if tracks.is_empty() {
        return Ok(());
    }
    let new_rows = build_rows(db, tracks)?;
    write_rows(db, &new_rows, 1)?;
    log::info!("Appended {} track(s) to the database", tracks.len());
    Ok(())
}

/// Encode each track's tag records (appending into the tag files in place) and
/// build the matching index rows, without touching the index file or header.
fn build_rows<T: TrackSource>(db: &mut Database, tracks: &[T]) -> Result<Vec<IndexRow>> {
    let endian = db.endian;
    let start_row = db.index_header()?.file.entries;

    let mut new_rows = Vec::with_capacity(tracks.len());
    for (i, track) in tracks.iter().enumerate() {
        let row_ordinal = start_row + i as i32;
        let mut row = IndexRow::default();
        for kind in STRING_KINDS {
            let value = field_for_kind(track, kind);
            let idx_id = if kind.is_deduplicated() { record::NO_OWNER } else { row_ordinal };
            let buffer = db.tag_file_mut(kind);
            let offset = record::append_record(buffer, kind, value, idx_id, endian, kind.filename())?;
            row.offsets[kind.ordinal() as usize] = offset;
        }
        row.year = track.year();
        row.disc = track.disc();
        row.track = track.track();
        row.bitrate = track.bitrate();
        row.length_ms = track.length_ms();
        row.mtime = track.mtime();
        new_rows.push(row);
    }
    Ok(new_rows)
}

/// Append encoded rows to the index file and rewrite its header once.
fn write_rows(db: &mut Database, new_rows: &[IndexRow], commit_delta: i32) -> Result<()> {
    let endian = db.endian;
    let index = db.index_bytes_mut();
    for row in new_rows {
        index.extend_from_slice(&row.encode(endian));
    }

    let added_len = new_rows.len() as i32 * super::index::ROW_LEN as i32;
    rewrite_index_header(db, new_rows.len() as i32, added_len, commit_delta)
}

/// Re-sort `kind`'s tag file by `cmp`, remapping every index row's offset into
/// that file (DefaultSortTags sorts by lower-case data; callers may supply any
/// comparator consistent with their own ordering needs).
///
/// Returns `DanglingOffset` if some row references an offset this tag file has
/// no record at, rather than silently leaving it pointed at garbage.
pub fn sort_tags(db: &mut Database, kind: TagKind, cmp: impl Fn(&TagRecord, &TagRecord) -> Ordering) -> Result<()> {
    resort_tag_file(db, kind, cmp)?;
    rewrite_index_header(db, 0, 0, 1)?;
    Ok(())
}

/// Core of [`sort_tags`], without the commit-id bump — shared with the internal
/// Filename re-sort that [`sort_index`] performs as its last step.
fn resort_tag_file(db: &mut Database, kind: TagKind, cmp: impl Fn(&TagRecord, &TagRecord) -> Ordering) -> Result<()> {
    let endian = db.endian;
    let old_records = record::scan_records(db.tag_file(kind), endian, kind.filename())?;

    let mut order: Vec<usize> = (0..old_records.len()).collect();
    order.sort_by(|&i, &j| cmp(&old_records[i], &old_records[j]));

    let mut old_to_new: HashMap<i32, i32> = HashMap::with_capacity(old_records.len());
    let mut buffer = FileHeader::new(0, old_records.len() as i32).encode(endian).to_vec();
    for &old_idx in &order {
        let record = &old_records[old_idx];
        let new_offset = buffer.len() as i32;
        old_to_new.insert(record.offset, new_offset);
        buffer.extend_from_slice(&TagRecord::encode(kind, &record.data, record.idx_id, endian));
    }
    let payload_len = (buffer.len() - FileHeader::LEN) as i32;
    let header = FileHeader::new(payload_len, old_records.len() as i32);
    buffer[0..FileHeader::LEN].copy_from_slice(&header.encode(endian));

    let index_header = db.index_header()?;
    let rows = super::index::rows(db.index_bytes(), index_header.file.entries, endian, TagKind::Index.filename())?;
    let mut new_index = db.index_bytes()[0..IndexHeader::LEN].to_vec();
    for (i, mut row) in rows.into_iter().enumerate() {
        let old_offset = row.offsets[kind.ordinal() as usize];
        let new_offset = *old_to_new
            .get(&old_offset)
            .ok_or(TagCacheError::DanglingOffset { kind, row: i, offset: old_offset })?;
        row.offsets[kind.ordinal() as usize] = new_offset;
        new_index.extend_from_slice(&row.encode(endian));
    }

    *db.tag_file_mut(kind) = buffer;
    *db.index_bytes_mut() = new_index;

    log::info!("Re-sorted {} records in {}", old_records.len(), kind.filename());
    Ok(())
}

/// The lower-case-data comparator DefaultSortTags uses.
pub fn default_tag_order(a: &TagRecord, b: &TagRecord) -> Ordering {
    a.data.to_lowercase().cmp(&b.data.to_lowercase())
}

/// Re-sort the index's row order by `cmp`, patching Title/Filename records'
/// `idxId` back-references to the new row ordinals, then re-sorting the
/// Filename file itself by ascending `idxId` so it again tracks row order
/// (mirrors the original's post-sort Filename pass).
pub fn sort_index(db: &mut Database, cmp: impl Fn(&IndexRow, &IndexRow) -> Ordering) -> Result<()> {
    let endian = db.endian;
    let index_header = db.index_header()?;
    let rows = super::index::rows(db.index_bytes(), index_header.file.entries, endian, TagKind::Index.filename())?;

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&i, &j| cmp(&rows[i], &rows[j]));

    // old row index -> new row index
    let mut old_to_new_row = vec![0i32; rows.len()];
    for (new_idx, &old_idx) in order.iter().enumerate() {
        old_to_new_row[old_idx] = new_idx as i32;
    }

    for kind in [TagKind::Title, TagKind::Filename] {
        let buffer = db.tag_file_mut(kind);
        let records = record::scan_records(&*buffer, endian, kind.filename())?;
        let mut patched = FileHeader::new(0, records.len() as i32).encode(endian).to_vec();
        for record in &records {
            let new_idx_id = old_to_new_row[record.idx_id as usize];
            patched.extend_from_slice(&TagRecord::encode(kind, &record.data, new_idx_id, endian));
        }
        let payload_len = (patched.len() - FileHeader::LEN) as i32;
        let header = FileHeader::new(payload_len, records.len() as i32);
        patched[0..FileHeader::LEN].copy_from_slice(&header.encode(endian));
        *buffer = patched;
    }

    let mut new_index = db.index_bytes()[0..IndexHeader::LEN].to_vec();
    for &old_idx in &order {
        new_index.extend_from_slice(&rows[old_idx].encode(endian));
    }
    *db.index_bytes_mut() = new_index;
    resort_tag_file(db, TagKind::Filename, |a, b| a.idx_id.cmp(&b.idx_id))?;
    rewrite_index_header(db, 0, 0, 1)?;

    log::info!("Re-sorted {} index rows", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endian::Endian;
    use crate::model::{RawTrack, Track};

    fn track(artist: &str, title: &str) -> Track {
        RawTrack {
            artist: Some(artist.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
        .into()
    }

    #[test]
    fn append_track_grows_entries_but_does_not_bump_commit() {
        let mut db = Database::generate(Endian::Little, &[track("A", "One")]);
        let before = db.index_header().unwrap();
        append_track(&mut db, &track("B", "Two")).unwrap();
        let after = db.index_header().unwrap();
        assert_eq!(after.file.entries, before.file.entries + 1);
        assert_eq!(after.commit_id, before.commit_id);
    }

    #[test]
    fn append_tracks_bumps_commit_once_for_the_whole_batch() {
        let mut db = Database::empty(Endian::Little);
        let before = db.index_header().unwrap();
        let batch = vec![track("A", "One"), track("B", "Two"), track("C", "Three")];
        append_tracks(&mut db, &batch).unwrap();
        let after = db.index_header().unwrap();
        assert_eq!(after.file.entries, before.file.entries + 3);
        assert_eq!(after.commit_id, before.commit_id + 1);
    }

    #[test]
    fn sort_tags_preserves_row_resolution() {
        let mut db = Database::generate(Endian::Little, &[track("Zeta", "z"), track("Alpha", "a")]);
        let before = super::super::decoder::decode_database(&db).unwrap();
        sort_tags(&mut db, TagKind::Artist, default_tag_order).unwrap();
        let after = super::super::decoder::decode_database(&db).unwrap();
        let artist_idx = TagKind::Artist.ordinal() as usize;
        let mut before_artists: Vec<_> = before.rows.iter().map(|r| r.tags[artist_idx].clone()).collect();
        let mut after_artists: Vec<_> = after.rows.iter().map(|r| r.tags[artist_idx].clone()).collect();
        before_artists.sort();
        after_artists.sort();
        assert_eq!(before_artists, after_artists);
    }

    #[test]
    fn sort_index_preserves_row_content_in_new_order() {
        let mut tracks = vec![track("Zeta", "z"), track("Alpha", "a")];
        tracks[0].year = 1999;
        tracks[1].year = 2001;
        let mut db = Database::generate(Endian::Little, &tracks);

        sort_index(&mut db, |a, b| b.year.cmp(&a.year)).unwrap();

        let decoded = super::super::decoder::decode_database(&db).unwrap();
        assert_eq!(decoded.rows.len(), 2);
        assert_eq!(decoded.rows[0].year, 2001);
        assert_eq!(decoded.rows[1].year, 1999);
    }
}
