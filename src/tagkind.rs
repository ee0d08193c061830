//! The ten tag kinds, their on-disk filenames, and per-kind dedup/padding policy.

/// One of the ten tag-cache database kinds.
///
/// The first nine are "string-tag" kinds, each backed by its own `database_N.tcd`
/// file; [`TagKind::Index`] is the master index (`database_idx.tcd`) and is not a
/// string-tag file at all — it is included here only so that ordinal/filename lookups
/// have a single closed enumeration to range over.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Artist = 0,
    Album = 1,
    Genre = 2,
    Title = 3,
    Filename = 4,
    Composer = 5,
    Comment = 6,
    AlbumArtist = 7,
    Grouping = 8,
    Index = 9,
}

/// Ordinal of the last string-tag kind; there are `NUM_STRING_KINDS` of them, 0..=8.
pub const NUM_STRING_KINDS: usize = 9;

/// The nine string-tag kinds in their fixed ordinal order, matching the column
/// order of [`crate::tagcache::index::IndexRow`]'s offset fields.
pub const STRING_KINDS: [TagKind; NUM_STRING_KINDS] = [
    TagKind::Artist,
    TagKind::Album,
    TagKind::Genre,
    TagKind::Title,
    TagKind::Filename,
    TagKind::Composer,
    TagKind::Comment,
    TagKind::AlbumArtist,
    TagKind::Grouping,
];

impl TagKind {
    /// Stable ordinal, matching the on-disk column order and filename suffix.
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// On-disk filename for this kind.
    pub fn filename(self) -> &'static str {
        match self {
            TagKind::Artist => "database_0.tcd",
            TagKind::Album => "database_1.tcd",
            TagKind::Genre => "database_2.tcd",
            TagKind::Title => "database_3.tcd",
            TagKind::Filename => "database_4.tcd",
            TagKind::Composer => "database_5.tcd",
            TagKind::Comment => "database_6.tcd",
            TagKind::AlbumArtist => "database_7.tcd",
            TagKind::Grouping => "database_8.tcd",
            TagKind::Index => "database_idx.tcd",
        }
    }

    /// Human-readable display name, used by the tabular renderer and CLI.
    pub fn display_name(self) -> &'static str {
        match self {
            TagKind::Artist => "Artist",
            TagKind::Album => "Album",
            TagKind::Genre => "Genre",
            TagKind::Title => "Title",
            TagKind::Filename => "Filename",
            TagKind::Composer => "Composer",
            TagKind::Comment => "Comment",
            TagKind::AlbumArtist => "AlbumArtist",
            TagKind::Grouping => "Grouping",
            TagKind::Index => "Index",
        }
    }

    /// Whether records of this kind are deduplicated by content.
    ///
    /// False only for [`TagKind::Title`] and [`TagKind::Filename`], whose records are
    /// per-track and carry a back-reference to the owning index row instead.
    pub fn is_deduplicated(self) -> bool {
        !matches!(self, TagKind::Title | TagKind::Filename)
    }

    /// Whether records of this kind are padded to an 8-byte boundary.
    ///
    /// False only for [`TagKind::Filename`] (see `TagRecord` in the data model).
    pub fn is_padded(self) -> bool {
        !matches!(self, TagKind::Filename)
    }

    /// Canonical iteration order for load/verify loops: the index first, then the
    /// nine string kinds in ordinal order.
    pub fn canonical_order() -> impl Iterator<Item = TagKind> {
        std::iter::once(TagKind::Index).chain(STRING_KINDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_match_spec() {
        assert_eq!(TagKind::Artist.filename(), "database_0.tcd");
        assert_eq!(TagKind::Grouping.filename(), "database_8.tcd");
        assert_eq!(TagKind::Index.filename(), "database_idx.tcd");
    }

    #[test]
    fn title_and_filename_are_not_deduplicated() {
        assert!(!TagKind::Title.is_deduplicated());
        assert!(!TagKind::Filename.is_deduplicated());
        assert!(TagKind::Artist.is_deduplicated());
    }

    #[test]
    fn only_filename_is_unpadded() {
        for kind in STRING_KINDS {
            assert_eq!(kind.is_padded(), kind != TagKind::Filename);
        }
    }

    #[test]
    fn canonical_order_starts_with_index() {
        let order: Vec<_> = TagKind::canonical_order().collect();
        assert_eq!(order[0], TagKind::Index);
        assert_eq!(order.len(), NUM_STRING_KINDS + 1);
    }
}
