//! Metadata model consumed by the database assembler.
//!
//! Independent of any particular tag-extraction or filesystem-walking collaborator —
//! see [`TrackSource`] for the narrow interface those collaborators are expected to
//! implement.

mod track;

pub use track::{field_for_kind, RawTrack, Track, TrackSource, UNTAGGED};
