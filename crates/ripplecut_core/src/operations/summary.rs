//! Edit summaries returned to the host.

use serde::{Deserialize, Serialize};

use crate::models::{ClipId, Project, Timecode, TrackId};

/// Final state of one primary-track clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipLayout {
    pub clip: ClipId,
    pub start: Timecode,
    pub length: Timecode,
    pub fade_in: Timecode,
    pub fade_out: Timecode,
    pub playback_rate: f64,
    /// Velocity envelope factor, if the clip has one.
    pub velocity: Option<f64>,
}

/// What an operation did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditSummary {
    pub operation: String,
    pub primary_track: String,
    pub primary_clips_changed: usize,
    pub auxiliary_clips_changed: usize,
    pub markers_moved: usize,
    /// Cut lists only.
    pub rows_applied: usize,
    /// Cut lists only: malformed rows, zero timestamps, uncovered timestamps.
    pub rows_skipped: usize,
    pub clips_removed: usize,
    /// Primary track after the edit.
    pub layout: Vec<ClipLayout>,
}

impl EditSummary {
    /// Summary with the current layout of `track`.
    pub fn capture(operation: impl Into<String>, project: &Project, track: TrackId) -> Self {
        let (primary_track, layout) = match project.track(track) {
            Some(track) => (
                track.label(),
                track
                    .clips()
                    .iter()
                    .map(|clip| ClipLayout {
                        clip: clip.id(),
                        start: clip.start,
                        length: clip.length,
                        fade_in: clip.fade_in,
                        fade_out: clip.fade_out,
                        playback_rate: clip.playback_rate,
                        velocity: clip.velocity_envelope().map(|env| env.factor),
                    })
                    .collect(),
            ),
            None => (track.to_string(), Vec::new()),
        };

        Self {
            operation: operation.into(),
            primary_track,
            layout,
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One-line description for logs and notifications.
    pub fn headline(&self) -> String {
        if self.rows_applied > 0 || self.rows_skipped > 0 {
            format!(
                "{}: {} row(s) applied, {} skipped, {} clip(s) removed",
                self.operation, self.rows_applied, self.rows_skipped, self.clips_removed
            )
        } else {
            format!(
                "{}: {} primary clip(s), {} auxiliary clip(s), {} marker(s) moved",
                self.operation,
                self.primary_clips_changed,
                self.auxiliary_clips_changed,
                self.markers_moved
            )
        }
    }
}
