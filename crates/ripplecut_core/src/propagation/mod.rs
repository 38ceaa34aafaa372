//! Auxiliary Propagator.
//!
//! Maps primary-track interval changes onto clips on the other tracks.
//! For a clip starting at `s`, the first adjustment (ascending primary
//! order) whose old interval `[old_start, old_end)` contains `s` decides
//! its new start:
//! - `Flat`: `s + (new_start - old_start)`
//! - `Proportional`: same relative position inside the new interval
//!
//! In group-aware mode the lookup is done for each group's anchor only;
//! every other member then moves by the anchor's absolute offset so the
//! group keeps its internal layout exactly.

use crate::groups::GroupIndex;
use crate::models::{Project, TrackId};
use crate::plan::ClipReposition;
use crate::timing::{find_adjustment, PropagationMode, TimingAdjustment};

/// Propagation settings for one operation.
#[derive(Debug, Clone)]
pub struct AuxiliaryPropagator {
    primary: TrackId,
    excluded: Vec<String>,
    mode: PropagationMode,
    group_aware: bool,
}

impl AuxiliaryPropagator {
    pub fn new(primary: TrackId, excluded: Vec<String>, mode: PropagationMode) -> Self {
        Self {
            primary,
            excluded,
            mode,
            group_aware: false,
        }
    }

    /// Move grouped clips through their anchor.
    pub fn group_aware(mut self, enabled: bool) -> Self {
        self.group_aware = enabled;
        self
    }

    pub fn mode(&self) -> PropagationMode {
        self.mode
    }

    /// Reposition records for every auxiliary clip that moves.
    pub fn propagate(&self, project: &Project, adjustments: &[TimingAdjustment]) -> Vec<ClipReposition> {
        if adjustments.is_empty() {
            return Vec::new();
        }
        let records = if self.group_aware {
            self.propagate_groups(project, adjustments)
        } else {
            self.propagate_clips(project, adjustments)
        };
        tracing::debug!(
            "Propagated {} auxiliary clip(s) ({:?}, group aware: {})",
            records.len(),
            self.mode,
            self.group_aware
        );
        records
    }

    fn is_auxiliary(&self, project: &Project, track: TrackId) -> bool {
        track != self.primary
            && project
                .track(track)
                .is_some_and(|t| !self.excluded.iter().any(|name| t.is_named(name)))
    }

    fn propagate_clips(&self, project: &Project, adjustments: &[TimingAdjustment]) -> Vec<ClipReposition> {
        let mut records = Vec::new();
        for track in project.tracks() {
            if !self.is_auxiliary(project, track.id()) {
                continue;
            }
            for clip in track.clips() {
                let Some(adjustment) = find_adjustment(adjustments, clip.start) else {
                    continue;
                };
                let new_start = adjustment.map(clip.start, self.mode);
                if new_start != clip.start {
                    records.push(ClipReposition::moved(track.id(), clip, new_start));
                }
            }
        }
        records
    }

    fn propagate_groups(&self, project: &Project, adjustments: &[TimingAdjustment]) -> Vec<ClipReposition> {
        let index = GroupIndex::build(project, self.primary, &self.excluded);
        let mut records = Vec::new();

        for group in index.groups() {
            let anchor = group.anchor();
            let Some(adjustment) = find_adjustment(adjustments, anchor.start) else {
                continue;
            };
            let offset = adjustment.map(anchor.start, self.mode) - anchor.start;
            if offset.is_zero() {
                continue;
            }

            for member in group.members() {
                let Some(clip) = project.track(member.track).and_then(|t| t.clip(member.clip)) else {
                    continue;
                };
                records.push(ClipReposition::moved(member.track, clip, clip.start + offset));
            }
        }
        records
    }
}
