//! Edit plans.
//!
//! An [`EditPlan`] is computed entirely from original positions before the
//! document is touched. It holds:
//! - reposition records for primary-track clips (in clip index order)
//! - reposition records for auxiliary/grouped clips
//! - marker moves
//!
//! The [`commit`] module applies a plan in the one order that is safe
//! against live-state reads.

pub mod commit;

use serde::{Deserialize, Serialize};

use crate::models::{Clip, ClipId, MarkerId, Timecode, TrackId};

pub use commit::{commit, verify, CommitReport};

/// What happens to a clip's velocity envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnvelopeChange {
    /// Install (or replace) a constant compensation factor.
    Set(f64),
    /// Remove any envelope.
    Remove,
}

/// New playback rate for a clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackChange {
    pub rate: f64,
    pub envelope: EnvelopeChange,
}

/// `{clip, newStart, newLength?, newFadeIn?, newFadeOut?}` plus the
/// original values the plan was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipReposition {
    pub clip: ClipId,
    pub track: TrackId,
    pub original_start: Timecode,
    pub original_length: Timecode,
    pub new_start: Timecode,
    pub new_length: Option<Timecode>,
    pub new_fade_in: Option<Timecode>,
    pub new_fade_out: Option<Timecode>,
    pub playback: Option<PlaybackChange>,
}

impl ClipReposition {
    /// Record that leaves the clip where it is.
    pub fn unchanged(track: TrackId, clip: &Clip) -> Self {
        Self {
            clip: clip.id(),
            track,
            original_start: clip.start,
            original_length: clip.length,
            new_start: clip.start,
            new_length: None,
            new_fade_in: None,
            new_fade_out: None,
            playback: None,
        }
    }

    /// Record moving the clip to `new_start` with its length unchanged.
    pub fn moved(track: TrackId, clip: &Clip, new_start: Timecode) -> Self {
        Self {
            new_start,
            ..Self::unchanged(track, clip)
        }
    }

    /// Length after commit.
    pub fn final_length(&self) -> Timecode {
        self.new_length.unwrap_or(self.original_length)
    }

    /// End after commit.
    pub fn final_end(&self) -> Timecode {
        self.new_start + self.final_length()
    }

    pub fn delta(&self) -> Timecode {
        self.new_start - self.original_start
    }

    /// Whether committing this record would change nothing.
    ///
    /// Fade overrides always count as a change since the plan does not
    /// know the current fade lengths.
    pub fn is_noop(&self) -> bool {
        self.new_start == self.original_start
            && self.new_length.map_or(true, |len| len == self.original_length)
            && self.new_fade_in.is_none()
            && self.new_fade_out.is_none()
            && self.playback.is_none()
    }
}

/// `{marker, newPosition}` with the marker's original state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerMove {
    pub marker: MarkerId,
    pub label: String,
    pub original_position: Timecode,
    pub new_position: Timecode,
}

/// A complete, not yet applied edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditPlan {
    pub primary_track: TrackId,
    /// Primary-track records in ascending clip index order.
    pub primary: Vec<ClipReposition>,
    /// Auxiliary and grouped clips.
    pub auxiliary: Vec<ClipReposition>,
    pub markers: Vec<MarkerMove>,
}

impl EditPlan {
    pub fn new(primary_track: TrackId) -> Self {
        Self {
            primary_track,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.auxiliary.is_empty() && self.markers.is_empty()
    }

    /// Drop records that would not change anything.
    pub fn prune(&mut self) {
        self.primary.retain(|record| !record.is_noop());
        self.auxiliary.retain(|record| !record.is_noop());
        self.markers
            .retain(|mv| mv.new_position != mv.original_position);
    }

    /// Marker moves in descending original position, the apply order.
    pub fn markers_in_apply_order(&self) -> Vec<&MarkerMove> {
        let mut moves: Vec<&MarkerMove> = self.markers.iter().collect();
        moves.sort_by(|a, b| b.original_position.cmp(&a.original_position));
        moves
    }

    pub fn primary_record(&self, clip: ClipId) -> Option<&ClipReposition> {
        self.primary.iter().find(|record| record.clip == clip)
    }

    pub fn auxiliary_record(&self, clip: ClipId) -> Option<&ClipReposition> {
        self.auxiliary.iter().find(|record| record.clip == clip)
    }
}
