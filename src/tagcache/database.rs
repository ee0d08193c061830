//! The in-memory `Database`: raw byte buffers for the nine tag files plus the
//! index, the generator that assembles them from scratch, and directory I/O.

use super::header::{FileHeader, IndexHeader};
use super::record::TagRecord;
use crate::endian::Endian;
use crate::error::{Result, TagCacheError};
use crate::model::{field_for_kind, TrackSource};
use crate::tagkind::{TagKind, STRING_KINDS};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A tag-cache database: ten byte buffers (nine string-tag files plus the index)
/// sharing one endianness.
///
/// Exists in two states per the lifecycle: empty (freshly constructed, header-only
/// files) and populated (after [`Database::generate`], [`Database::load`], or at
/// least one append). Mutations in [`super::mutate`] work by copy-on-write: on
/// failure the prior buffers are left untouched.
#[derive(Debug, Clone)]
pub struct Database {
    pub endian: Endian,
    tag_files: HashMap<TagKind, Vec<u8>>,
    index: Vec<u8>,
}

impl Database {
    /// A freshly constructed database: header-only files, no records.
    pub fn empty(endian: Endian) -> Self {
        let mut tag_files = HashMap::new();
        for kind in STRING_KINDS {
            tag_files.insert(kind, FileHeader::new(0, 0).encode(endian).to_vec());
        }
        let index = IndexHeader::fresh(0, FileHeader::LEN as i32).encode(endian).to_vec();
        Database {
            endian,
            tag_files,
            index,
        }
    }

    pub fn tag_file(&self, kind: TagKind) -> &[u8] {
        &self.tag_files[&kind]
    }

    pub fn tag_file_mut(&mut self, kind: TagKind) -> &mut Vec<u8> {
        self.tag_files.get_mut(&kind).expect("all string kinds are always present")
    }

    pub fn index_bytes(&self) -> &[u8] {
        &self.index
    }

    pub fn index_bytes_mut(&mut self) -> &mut Vec<u8> {
        &mut self.index
    }

    pub fn index_header(&self) -> Result<IndexHeader> {
        IndexHeader::parse(&self.index, self.endian, TagKind::Index.filename())
    }

    /// Build a fresh database from a sequence of tracks (§4.5: sort, intern, assign
    /// offsets, emit).
    pub fn generate<T: TrackSource>(endian: Endian, tracks: &[T]) -> Self {
        let mut order: Vec<usize> = (0..tracks.len()).collect();
        order.sort_by(|&i, &j| compare_tracks(&tracks[i], &tracks[j]));

        log::info!("Assembling tag-cache database from {} tracks", tracks.len());

        // Per-kind pending records in insertion order, plus a dedup map for the
        // seven kinds that intern by content.
        let mut pending: HashMap<TagKind, Vec<(i32, String)>> = HashMap::new();
        let mut dedup: HashMap<TagKind, HashMap<String, usize>> = HashMap::new();
        for kind in STRING_KINDS {
            pending.insert(kind, Vec::new());
            dedup.insert(kind, HashMap::new());
        }

        // For each sorted row, the pending-list index each kind's record lives at.
        let mut row_record_index: Vec<[usize; 9]> = Vec::with_capacity(order.len());

        for (row_ordinal, &track_idx) in order.iter().enumerate() {
            let track = &tracks[track_idx];
            let mut indices = [0usize; 9];
            for kind in STRING_KINDS {
                let value = field_for_kind(track, kind);
                let list = pending.get_mut(&kind).unwrap();
                let idx = if kind.is_deduplicated() {
                    let map = dedup.get_mut(&kind).unwrap();
                    if let Some(&existing) = map.get(value) {
                        existing
                    } else {
                        list.push((-1, value.to_string()));
                        let new_idx = list.len() - 1;
                        map.insert(value.to_string(), new_idx);
                        new_idx
                    }
                } else {
                    list.push((row_ordinal as i32, value.to_string()));
                    list.len() - 1
                };
                indices[kind.ordinal() as usize] = idx;
            }
            row_record_index.push(indices);
        }

        // Sort each kind's records by lower-case data (step 3), keeping a map from
        // each kind's original pending-index to its post-sort offset.
        let mut offsets_by_kind: HashMap<TagKind, Vec<i32>> = HashMap::new();
        let mut tag_files = HashMap::new();
        for kind in STRING_KINDS {
            let mut entries: Vec<(usize, i32, String)> = pending
                .remove(&kind)
                .unwrap()
                .into_iter()
                .enumerate()
                .map(|(original, (idx_id, data))| (original, idx_id, data))
                .collect();
            entries.sort_by(|a, b| a.2.to_lowercase().cmp(&b.2.to_lowercase()));

            let mut offsets = vec![0i32; entries.len()];
            let mut buffer = Vec::new();
            let mut offset = FileHeader::LEN as i32;
            for (original, idx_id, data) in &entries {
                offsets[*original] = offset;
                let encoded = TagRecord::encode(kind, data, *idx_id, endian);
                offset += encoded.len() as i32;
                buffer.extend_from_slice(&encoded);
            }

            let payload_len = buffer.len() as i32;
            let mut file_bytes = FileHeader::new(payload_len, entries.len() as i32)
                .encode(endian)
                .to_vec();
            file_bytes.extend_from_slice(&buffer);

            tag_files.insert(kind, file_bytes);
            offsets_by_kind.insert(kind, offsets);
        }

        // Back-fill index rows and emit the index file.
        let mut index_payload = Vec::with_capacity(row_record_index.len() * super::index::ROW_LEN);
        for (row_ordinal, &track_idx) in order.iter().enumerate() {
            let track = &tracks[track_idx];
            let mut row = super::index::IndexRow::default();
            for kind in STRING_KINDS {
                let record_idx = row_record_index[row_ordinal][kind.ordinal() as usize];
                row.offsets[kind.ordinal() as usize] = offsets_by_kind[&kind][record_idx];
            }
            row.year = track.year();
            row.disc = track.disc();
            row.track = track.track();
            row.bitrate = track.bitrate();
            row.length_ms = track.length_ms();
            row.mtime = track.mtime();
            index_payload.extend_from_slice(&row.encode(endian));
        }

        let entries = order.len() as i32;
        let size = entries * super::index::ROW_LEN as i32 + FileHeader::LEN as i32;
        let mut index = IndexHeader::fresh(entries, size).encode(endian).to_vec();
        index.extend_from_slice(&index_payload);

        log::info!(
            "Assembled database: {} rows, {} bytes of index payload",
            entries,
            index_payload.len()
        );

        Database {
            endian,
            tag_files,
            index,
        }
    }

    /// Load all ten files from `dir`, checking endianness consistency across them.
    pub fn load(dir: &Path) -> Result<Self> {
        let dir_str = dir.display().to_string();

        let mut missing = Vec::new();
        for kind in TagKind::canonical_order() {
            if !dir.join(kind.filename()).is_file() {
                missing.push(kind.filename().to_string());
            }
        }
        if !missing.is_empty() {
            return Err(TagCacheError::MissingDatabase {
                dir: dir_str,
                missing,
            });
        }

        let mut raw: HashMap<TagKind, Vec<u8>> = HashMap::new();
        for kind in TagKind::canonical_order() {
            let path = dir.join(kind.filename());
            let bytes = fs::read(&path)?;
            raw.insert(kind, bytes);
        }

        let mut endian: Option<(Endian, &'static str)> = None;
        for kind in TagKind::canonical_order() {
            let bytes = &raw[&kind];
            if bytes.is_empty() {
                return Err(TagCacheError::MalformedHeader {
                    file: kind.filename().to_string(),
                    len: 0,
                    needed: FileHeader::LEN,
                });
            }
            let this_endian = Endian::from_probe_byte(bytes[0]).ok_or_else(|| TagCacheError::BadMagic {
                file: kind.filename().to_string(),
                byte: bytes[0],
            })?;
            match endian {
                None => endian = Some((this_endian, kind.filename())),
                Some((first, first_file)) if first != this_endian => {
                    return Err(TagCacheError::EndianMismatch {
                        first_file: first_file.to_string(),
                        first,
                        other_file: kind.filename().to_string(),
                        other: this_endian,
                    });
                }
                _ => {}
            }
        }
        let endian = endian.expect("checked non-empty above").0;

        let index = raw.remove(&TagKind::Index).expect("Index always present");
        log::info!("Loaded database from {dir_str} ({:?} endian)", endian);

        Ok(Database {
            endian,
            tag_files: raw,
            index,
        })
    }

    /// Write all ten files to `dir`, creating it if necessary.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        for kind in STRING_KINDS {
            fs::write(dir.join(kind.filename()), self.tag_file(kind))?;
        }
        fs::write(dir.join(TagKind::Index.filename()), &self.index)?;
        log::info!("Wrote database to {}", dir.display());
        Ok(())
    }
}

/// Compound-key comparator for the generator's initial sort (§4.5 step 1):
/// lower-case Artist, Year, lower-case Album, TrackNumber, lower-case Title.
/// `"<Untagged>"` sorts to the front at each string level; matching Untagged
/// compares as "left is less" rather than equal, which is intentionally
/// asymmetric (see the design notes) — mirrored here by checking `less(a, b)`
/// then `less(b, a)` rather than computing a single three-way comparison.
fn compare_tracks<T: TrackSource>(a: &T, b: &T) -> Ordering {
    if track_less(a, b) {
        Ordering::Less
    } else if track_less(b, a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

fn track_less<T: TrackSource>(a: &T, b: &T) -> bool {
    let a_artist = a.artist().to_lowercase();
    if a_artist == crate::model::UNTAGGED {
        return true;
    }
    let b_artist = b.artist().to_lowercase();
    if a_artist == b_artist {
        if a.year() == b.year() {
            let a_album = a.album().to_lowercase();
            if a_album == crate::model::UNTAGGED {
                return true;
            }
            let b_album = b.album().to_lowercase();
            if a_album == b_album {
                if a.track() == b.track() {
                    let a_title = a.title().to_lowercase();
                    if a_title == crate::model::UNTAGGED {
                        return true;
                    }
                    let b_title = b.title().to_lowercase();
                    return a_title < b_title;
                }
                return a.track() < b.track();
            }
            return a_album < b_album;
        }
        return a.year() < b.year();
    }
    a_artist < b_artist
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn empty_database_has_header_only_files() {
        let db = Database::empty(Endian::Little);
        for kind in STRING_KINDS {
            assert_eq!(db.tag_file(kind).len(), FileHeader::LEN);
        }
        assert_eq!(db.index_bytes().len(), IndexHeader::LEN);
    }

    #[test]
    fn single_track_generates_one_record_per_kind() {
        let t = track("A", "T");
        let db = Database::generate(Endian::Little, &[t]);

        for kind in STRING_KINDS {
            let header = FileHeader::parse(db.tag_file(kind), Endian::Little, "f").unwrap();
            assert_eq!(header.entries, 1);
        }
        let idx_header = db.index_header().unwrap();
        assert_eq!(idx_header.file.entries, 1);
        assert_eq!(idx_header.commit_id, 1);
    }

    #[test]
    fn shared_artist_deduplicates() {
        let tracks = vec![track("A", "One"), track("A", "Two")];
        let db = Database::generate(Endian::Little, &tracks);
        let header = FileHeader::parse(db.tag_file(TagKind::Artist), Endian::Little, "f").unwrap();
        assert_eq!(header.entries, 1);
        let title_header = FileHeader::parse(db.tag_file(TagKind::Title), Endian::Little, "f").unwrap();
        assert_eq!(title_header.entries, 2);
    }
}
