//! Track metadata: the generator's input record, and the capability trait an
//! external tag extractor would implement to produce one.

use crate::tagkind::TagKind;
use serde::{Deserialize, Serialize};

/// Sentinel used for any string field the source metadata did not provide.
pub const UNTAGGED: &str = "<Untagged>";

/// The nine strings plus six numeric fields the database assembler needs from a
/// track, abstracted as a narrow trait so the codec never depends on the concrete
/// type an audio-tag extractor happens to use.
pub trait TrackSource {
    fn artist(&self) -> &str;
    fn album(&self) -> &str;
    fn genre(&self) -> &str;
    fn title(&self) -> &str;
    fn filename(&self) -> &str;
    fn composer(&self) -> &str;
    fn comment(&self) -> &str;
    fn album_artist(&self) -> &str;
    fn grouping(&self) -> &str;
    fn year(&self) -> i32;
    fn disc(&self) -> i32;
    fn track(&self) -> i32;
    fn bitrate(&self) -> i32;
    fn length_ms(&self) -> i32;
    /// Unix time in milliseconds, packed into an i32 (wraparound accepted as-is).
    fn mtime(&self) -> i32;
}

/// Read whichever string field of a track corresponds to a given string-tag kind.
pub fn field_for_kind<'a, T: TrackSource>(track: &'a T, kind: TagKind) -> &'a str {
    match kind {
        TagKind::Artist => track.artist(),
        TagKind::Album => track.album(),
        TagKind::Genre => track.genre(),
        TagKind::Title => track.title(),
        TagKind::Filename => track.filename(),
        TagKind::Composer => track.composer(),
        TagKind::Comment => track.comment(),
        TagKind::AlbumArtist => track.album_artist(),
        TagKind::Grouping => track.grouping(),
        TagKind::Index => unreachable!("Index is not a string-tag kind"),
    }
}

/// A normalized track metadata record: every string field defaulted per the
/// metadata interface (`UNTAGGED` sentinel, `AlbumArtist`→Artist, `Grouping`→Title).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub title: String,
    pub filename: String,
    pub composer: String,
    pub comment: String,
    pub album_artist: String,
    pub grouping: String,
    pub year: i32,
    pub disc: i32,
    pub track: i32,
    pub bitrate: i32,
    pub length_ms: i32,
    pub mtime: i32,
}

/// The raw shape an external collaborator (or the JSON interchange file the CLI
/// reads) produces before defaulting is applied — every string is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTrack {
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub title: Option<String>,
    pub filename: Option<String>,
    pub composer: Option<String>,
    pub comment: Option<String>,
    pub album_artist: Option<String>,
    pub grouping: Option<String>,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub disc: i32,
    #[serde(default)]
    pub track: i32,
    #[serde(default)]
    pub bitrate: i32,
    #[serde(default)]
    pub length_ms: i32,
    #[serde(default)]
    pub mtime: i32,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        let artist = raw.artist.unwrap_or_else(|| UNTAGGED.to_string());
        let title = raw.title.unwrap_or_else(|| UNTAGGED.to_string());

        let album_artist = match raw.album_artist {
            Some(s) if s != UNTAGGED && !s.is_empty() => s,
            _ => artist.clone(),
        };
        let grouping = match raw.grouping {
            Some(s) if s != UNTAGGED && !s.is_empty() => s,
            _ => title.clone(),
        };

        Track {
            artist,
            album: raw.album.unwrap_or_else(|| UNTAGGED.to_string()),
            genre: raw.genre.unwrap_or_else(|| UNTAGGED.to_string()),
            title,
            filename: raw.filename.unwrap_or_else(|| UNTAGGED.to_string()),
            composer: raw.composer.unwrap_or_else(|| UNTAGGED.to_string()),
            comment: raw.comment.unwrap_or_else(|| UNTAGGED.to_string()),
            album_artist,
            grouping,
            year: raw.year,
            disc: raw.disc,
            track: raw.track,
            bitrate: raw.bitrate,
            length_ms: raw.length_ms,
            mtime: raw.mtime,
        }
    }
}

impl TrackSource for Track {
    fn artist(&self) -> &str {
        &self.artist
    }
    fn album(&self) -> &str {
        &self.album
    }
    fn genre(&self) -> &str {
        &self.genre
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn filename(&self) -> &str {
        &self.filename
    }
    fn composer(&self) -> &str {
        &self.composer
    }
    fn comment(&self) -> &str {
        &self.comment
    }
    fn album_artist(&self) -> &str {
        &self.album_artist
    }
    fn grouping(&self) -> &str {
        &self.grouping
    }
    fn year(&self) -> i32 {
        self.year
    }
    fn disc(&self) -> i32 {
        self.disc
    }
    fn track(&self) -> i32 {
        self.track
    }
    fn bitrate(&self) -> i32 {
        self.bitrate
    }
    fn length_ms(&self) -> i32 {
        self.length_ms
    }
    fn mtime(&self) -> i32 {
        self.mtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_strings_default_to_untagged() {
        let t: Track = RawTrack::default().into();
        assert_eq!(t.artist, UNTAGGED);
        assert_eq!(t.album, UNTAGGED);
        assert_eq!(t.genre, UNTAGGED);
    }

    #[test]
    fn album_artist_defaults_to_artist() {
        let raw = RawTrack {
            artist: Some("Daft Punk".to_string()),
            ..Default::default()
        };
        let t: Track = raw.into();
        assert_eq!(t.album_artist, "Daft Punk");
    }

    #[test]
    fn grouping_defaults_to_title() {
        let raw = RawTrack {
            title: Some("One More Time".to_string()),
            ..Default::default()
        };
        let t: Track = raw.into();
        assert_eq!(t.grouping, "One More Time");
    }

    #[test]
    fn explicit_album_artist_is_preserved() {
        let raw = RawTrack {
            artist: Some("Daft Punk".to_string()),
            album_artist: Some("Various Artists".to_string()),
            ..Default::default()
        };
        let t: Track = raw.into();
        assert_eq!(t.album_artist, "Various Artists");
    }
}
