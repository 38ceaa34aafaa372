//! Plan Committer.
//!
//! Applies an [`EditPlan`] in a fixed order:
//! 1. verify every record against the live document (nothing mutated yet)
//! 2. marker moves, descending original position (remove, then re-add)
//! 3. primary-track clips, ascending clip index
//! 4. auxiliary and grouped clips
//!
//! Once step 2 starts the commit is not atomic: a failure leaves the
//! mutations applied so far in place.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{ClipReposition, EditPlan, EnvelopeChange};
use crate::models::{MarkerId, Project, TrackId};
use crate::operations::{EditError, EditResult};

/// What a commit changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub primary_clips: usize,
    pub auxiliary_clips: usize,
    pub markers_moved: usize,
    /// `(old, new)` ids of re-created markers.
    pub marker_ids: Vec<(MarkerId, MarkerId)>,
    /// Velocity envelopes that could not be installed (clip lacks support).
    pub envelopes_rejected: usize,
}

/// Check that every record still matches the document.
pub fn verify(project: &Project, plan: &EditPlan) -> EditResult<()> {
    if project.track(plan.primary_track).is_none() {
        return Err(EditError::TrackNotFound(plan.primary_track));
    }

    for record in plan.primary.iter().chain(&plan.auxiliary) {
        let track = project
            .track(record.track)
            .ok_or(EditError::TrackNotFound(record.track))?;
        let clip = track
            .clip(record.clip)
            .ok_or(EditError::ClipNotFound(record.clip))?;
        if clip.start != record.original_start || clip.length != record.original_length {
            return Err(EditError::stale_clip(record.clip, record.original_start, clip.start));
        }
    }

    for mv in &plan.markers {
        let marker = project
            .marker(mv.marker)
            .ok_or(EditError::MarkerNotFound(mv.marker))?;
        if marker.position != mv.original_position {
            return Err(EditError::stale_marker(mv.marker, mv.original_position, marker.position));
        }
    }

    Ok(())
}

/// Verify, then apply the plan.
pub fn commit(project: &mut Project, plan: &EditPlan) -> EditResult<CommitReport> {
    verify(project, plan)?;

    let mut report = CommitReport::default();

    for mv in plan.markers_in_apply_order() {
        project
            .remove_marker(mv.marker)
            .ok_or(EditError::MarkerNotFound(mv.marker))?;
        let new_id = project.add_marker(mv.new_position, mv.label.clone());
        tracing::trace!(
            "Marker '{}' {} -> {}",
            mv.label,
            mv.original_position,
            mv.new_position
        );
        report.marker_ids.push((mv.marker, new_id));
        report.markers_moved += 1;
    }

    let mut touched: BTreeSet<TrackId> = BTreeSet::new();
    touched.insert(plan.primary_track);

    for record in ordered_primary(project, plan) {
        if apply_record(project, record)? {
            report.envelopes_rejected += 1;
        }
        report.primary_clips += 1;
    }

    for record in &plan.auxiliary {
        if apply_record(project, record)? {
            report.envelopes_rejected += 1;
        }
        touched.insert(record.track);
        report.auxiliary_clips += 1;
    }

    for track in touched {
        if let Some(track) = project.track_mut(track) {
            track.sort_clips();
        }
    }

    tracing::debug!(
        "Committed {} primary clip(s), {} auxiliary clip(s), {} marker(s)",
        report.primary_clips,
        report.auxiliary_clips,
        report.markers_moved
    );

    Ok(report)
}

/// Primary records sorted by the clip's current index in its track.
fn ordered_primary<'a>(project: &Project, plan: &'a EditPlan) -> Vec<&'a ClipReposition> {
    let mut records: Vec<(usize, &ClipReposition)> = plan
        .primary
        .iter()
        .map(|record| {
            let index = project
                .track(record.track)
                .and_then(|track| track.index_of(record.clip))
                .unwrap_or(usize::MAX);
            (index, record)
        })
        .collect();
    records.sort_by_key(|(index, _)| *index);
    records.into_iter().map(|(_, record)| record).collect()
}

/// Apply one record. Returns `true` when an envelope had to be dropped.
fn apply_record(project: &mut Project, record: &ClipReposition) -> EditResult<bool> {
    let clip = project
        .track_mut(record.track)
        .ok_or(EditError::TrackNotFound(record.track))?
        .clip_mut(record.clip)
        .ok_or(EditError::ClipNotFound(record.clip))?;

    let mut rejected = false;
    if let Some(playback) = record.playback {
        clip.set_playback_rate(playback.rate, true);
        match playback.envelope {
            EnvelopeChange::Set(factor) => {
                if !clip.set_velocity_envelope(Some(factor)) {
                    tracing::warn!(
                        "{} has no velocity envelope support; compensation {:.3} dropped",
                        record.clip,
                        factor
                    );
                    rejected = true;
                }
            }
            EnvelopeChange::Remove => {
                clip.set_velocity_envelope(None);
            }
        }
    }

    clip.reposition(record.new_start, record.final_length());
    if let Some(fade_in) = record.new_fade_in {
        clip.fade_in = fade_in;
    }
    if let Some(fade_out) = record.new_fade_out {
        clip.fade_out = fade_out;
    }

    Ok(rejected)
}
