//! Tracks: ordered clip containers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::clip::{Clip, ClipId, MediaKind};
use super::timecode::Timecode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track#{}", self.0)
    }
}

/// A track holding clips ordered by start position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    id: TrackId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: MediaKind,
    #[serde(default)]
    clips: Vec<Clip>,
}

impl Track {
    pub fn new(name: Option<String>, kind: MediaKind) -> Self {
        Self {
            id: TrackId::default(),
            name,
            kind,
            clips: Vec::new(),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: TrackId) {
        self.id = id;
    }

    /// Case-insensitive name comparison. Unnamed tracks never match.
    pub fn is_named(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(name))
    }

    /// Display label for logs.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("'{}'", name),
            None => self.id.to_string(),
        }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub(crate) fn clips_mut(&mut self) -> &mut [Clip] {
        &mut self.clips
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn index_of(&self, id: ClipId) -> Option<usize> {
        self.clips.iter().position(|clip| clip.id() == id)
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.id() == id)
    }

    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|clip| clip.id() == id)
    }

    /// First clip whose `[start, end)` contains `position`.
    pub fn clip_at(&self, position: Timecode) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.contains(position))
    }

    /// Insert keeping start order; equal starts keep insertion order.
    pub(crate) fn insert_clip(&mut self, clip: Clip) {
        let index = self.clips.partition_point(|existing| existing.start <= clip.start);
        self.clips.insert(index, clip);
    }

    pub fn remove_clip(&mut self, id: ClipId) -> Option<Clip> {
        let index = self.index_of(id)?;
        Some(self.clips.remove(index))
    }

    /// Restore start order after positions were edited in place.
    pub fn sort_clips(&mut self) {
        self.clips.sort_by_key(|clip| clip.start);
    }

    /// Whether clip order matches start order.
    pub fn is_sorted(&self) -> bool {
        self.clips.windows(2).all(|pair| pair[0].start <= pair[1].start)
    }

    /// Split a clip at `offset` from its start.
    ///
    /// The original clip keeps the left part; the right part becomes a new
    /// clip with `right_id`, inserted directly after it. Returns `None` when
    /// the clip does not exist or the offset is not strictly inside it.
    pub(crate) fn split_clip(&mut self, id: ClipId, offset: Timecode, right_id: ClipId) -> Option<ClipId> {
        let index = self.index_of(id)?;
        let left = &mut self.clips[index];
        if offset <= Timecode::ZERO || offset >= left.length {
            return None;
        }

        let mut right = left.clone();
        right.assign_id(right_id);
        right.start = left.start + offset;
        right.length = left.length - offset;
        right.fade_in = Timecode::ZERO;

        left.length = offset;
        left.fade_out = Timecode::ZERO;

        self.clips.insert(index + 1, right);
        Some(right_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_with(clips: &[(i64, i64)]) -> Track {
        let mut track = Track::new(Some("Main".to_string()), MediaKind::Video);
        for (i, (start, len)) in clips.iter().enumerate() {
            let mut clip = Clip::from_ms(*start, *len);
            clip.assign_id(ClipId(i as u64 + 1));
            track.insert_clip(clip);
        }
        track
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let track = track_with(&[]);
        assert!(track.is_named("main"));
        assert!(track.is_named("MAIN"));
        assert!(!track.is_named("music"));
        assert!(!Track::new(None, MediaKind::Audio).is_named("main"));
    }

    #[test]
    fn insert_keeps_start_order() {
        let track = track_with(&[(2000, 100), (0, 100), (1000, 100)]);
        let starts: Vec<i64> = track.clips().iter().map(|c| c.start.ticks() / 10_000).collect();
        assert_eq!(starts, vec![0, 1000, 2000]);
        assert!(track.is_sorted());
    }

    #[test]
    fn split_moves_fade_out_to_right_part() {
        let mut track = track_with(&[(0, 1000)]);
        track.clip_mut(ClipId(1)).unwrap().fade_out = Timecode::from_ms(100);

        let right = track.split_clip(ClipId(1), Timecode::from_ms(400), ClipId(9)).unwrap();
        assert_eq!(track.len(), 2);

        let left = track.clip(ClipId(1)).unwrap();
        assert_eq!(left.length, Timecode::from_ms(400));
        assert_eq!(left.fade_out, Timecode::ZERO);

        let right = track.clip(right).unwrap();
        assert_eq!(right.start, Timecode::from_ms(400));
        assert_eq!(right.length, Timecode::from_ms(600));
        assert_eq!(right.fade_out, Timecode::from_ms(100));
        assert_eq!(track.index_of(ClipId(9)), Some(1));
    }

    #[test]
    fn split_outside_clip_is_rejected() {
        let mut track = track_with(&[(0, 1000)]);
        assert!(track.split_clip(ClipId(1), Timecode::ZERO, ClipId(9)).is_none());
        assert!(track.split_clip(ClipId(1), Timecode::from_ms(1000), ClipId(9)).is_none());
        assert_eq!(track.len(), 1);
    }
}
