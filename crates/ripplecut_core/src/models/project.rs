//! In-memory project document: tracks plus project-global markers.
//!
//! This is the document model the engine reads and mutates. Host
//! integrations mirror their editor state into a `Project`, run an
//! operation and write the result back (or serialize it as JSON).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::clip::{Clip, ClipId, MediaKind};
use super::marker::{Marker, MarkerId};
use super::timecode::{FrameRate, Timecode};
use super::track::{Track, TrackId};

/// Owns all tracks and all markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub frame_rate: FrameRate,
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    markers: Vec<Marker>,
    #[serde(skip)]
    next_id: u64,
}

impl Project {
    pub fn new(frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            tracks: Vec::new(),
            markers: Vec::new(),
            next_id: 1,
        }
    }

    /// Load a project snapshot from JSON.
    ///
    /// Missing or duplicate ids are reassigned and clips are put back into
    /// start order.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut project: Project = serde_json::from_str(json)?;
        project.normalize_loaded();
        Ok(project)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn normalize_loaded(&mut self) {
        let max_id = self
            .tracks
            .iter()
            .flat_map(|track| {
                std::iter::once(track.id().0).chain(track.clips().iter().map(|clip| clip.id().0))
            })
            .chain(self.markers.iter().map(|marker| marker.id().0))
            .max()
            .unwrap_or(0);
        self.next_id = max_id + 1;

        let mut track_ids = HashSet::new();
        let mut clip_ids = HashSet::new();
        let mut tracks = std::mem::take(&mut self.tracks);
        for track in &mut tracks {
            if track.id().0 == 0 || !track_ids.insert(track.id()) {
                let id = TrackId(self.allocate_id());
                track.assign_id(id);
                track_ids.insert(id);
            }
            for clip in track.clips_mut() {
                if clip.id().0 == 0 || !clip_ids.insert(clip.id()) {
                    let id = ClipId(self.allocate_id());
                    clip.assign_id(id);
                    clip_ids.insert(id);
                }
            }
            track.sort_clips();
        }
        self.tracks = tracks;

        let mut marker_ids = HashSet::new();
        let mut markers = std::mem::take(&mut self.markers);
        for marker in &mut markers {
            if marker.id().0 == 0 || !marker_ids.insert(marker.id()) {
                let id = MarkerId(self.allocate_id());
                marker.assign_id(id);
                marker_ids.insert(id);
            }
        }
        self.markers = markers;
    }

    fn allocate_id(&mut self) -> u64 {
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ------------------------------------------------------------------
    // Tracks
    // ------------------------------------------------------------------

    pub fn add_track(&mut self, name: Option<&str>, kind: MediaKind) -> TrackId {
        let id = TrackId(self.allocate_id());
        let mut track = Track::new(name.map(str::to_string), kind);
        track.assign_id(id);
        self.tracks.push(track);
        id
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id() == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|track| track.id() == id)
    }

    /// First track with the given name (case-insensitive) and, if given, kind.
    pub fn find_track(&self, name: &str, kind: Option<MediaKind>) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|track| track.is_named(name) && kind.map_or(true, |k| track.kind == k))
    }

    // ------------------------------------------------------------------
    // Clips
    // ------------------------------------------------------------------

    /// Add a clip to a track, assigning it a fresh id.
    pub fn add_clip(&mut self, track: TrackId, mut clip: Clip) -> Option<ClipId> {
        if self.track(track).is_none() {
            return None;
        }
        let id = ClipId(self.allocate_id());
        clip.assign_id(id);
        self.track_mut(track)?.insert_clip(clip);
        Some(id)
    }

    /// Find a clip anywhere in the project.
    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.tracks.iter().find_map(|track| track.clip(id))
    }

    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.tracks.iter_mut().find_map(|track| track.clip_mut(id))
    }

    /// Track that currently holds the clip.
    pub fn track_of(&self, id: ClipId) -> Option<TrackId> {
        self.tracks
            .iter()
            .find(|track| track.index_of(id).is_some())
            .map(Track::id)
    }

    /// Split a clip at `offset` from its start; returns the new right-hand clip.
    pub fn split_clip(&mut self, track: TrackId, clip: ClipId, offset: Timecode) -> Option<ClipId> {
        let right_id = ClipId(self.allocate_id());
        self.track_mut(track)?.split_clip(clip, offset, right_id)
    }

    pub fn remove_clip(&mut self, track: TrackId, clip: ClipId) -> Option<Clip> {
        self.track_mut(track)?.remove_clip(clip)
    }

    // ------------------------------------------------------------------
    // Markers
    // ------------------------------------------------------------------

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id() == id)
    }

    pub fn add_marker(&mut self, position: Timecode, label: impl Into<String>) -> MarkerId {
        let id = MarkerId(self.allocate_id());
        let mut marker = Marker::new(position, label);
        marker.assign_id(id);
        self.markers.push(marker);
        id
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> Option<Marker> {
        let index = self.markers.iter().position(|marker| marker.id() == id)?;
        Some(self.markers.remove(index))
    }

    /// Markers with the given label, in position order.
    pub fn markers_labelled(&self, label: &str) -> Vec<&Marker> {
        let mut found: Vec<&Marker> = self
            .markers
            .iter()
            .filter(|marker| marker.label.eq_ignore_ascii_case(label))
            .collect();
        found.sort_by_key(|marker| marker.position);
        found
    }
}
