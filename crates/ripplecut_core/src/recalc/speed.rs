//! Speed-Rescale with cascade.
//!
//! Selected primary clips get `length / factor`, rounded to a frame
//! without reproducing the old length. The rate actually achieved is
//! composed with the clip's current playback rate and envelope factor,
//! clamped to [`SpeedLimits`], and any remainder goes into a velocity
//! envelope.
//!
//! Every changed interval becomes a [`TimingAdjustment`]. Later primary
//! clips that start inside an earlier adjustment's old interval are
//! repositioned proportionally and produce adjustments of their own, so a
//! chain of overlapping clips ripples before auxiliary tracks are mapped.

use super::{Recalculator, TimelineRules};
use crate::markers::MarkerRemapper;
use crate::models::{Clip, Project, Timecode, TrackId};
use crate::operations::{EditError, EditResult};
use crate::plan::{ClipReposition, EditPlan, EnvelopeChange, PlaybackChange};
use crate::propagation::AuxiliaryPropagator;
use crate::timing::{find_adjustment, round_without_redundancy, PropagationMode, TieBreak, TimingAdjustment};

/// Allowed playback-rate range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimits {
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for SpeedLimits {
    fn default() -> Self {
        Self {
            min_rate: 0.25,
            max_rate: 4.0,
        }
    }
}

impl SpeedLimits {
    /// Limits in either order; the smaller value becomes the minimum.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min_rate: a.min(b),
            max_rate: a.max(b),
        }
    }

    pub fn clamp(&self, rate: f64) -> f64 {
        rate.max(self.min_rate).min(self.max_rate)
    }
}

/// Rescales the selected clips of the primary track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRescale {
    factor: f64,
    limits: SpeedLimits,
}

impl SpeedRescale {
    /// `factor > 1` speeds up (shorter clips), `factor < 1` slows down.
    pub fn new(factor: f64, limits: SpeedLimits) -> EditResult<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(EditError::InvalidSpeedFactor(factor));
        }
        Ok(Self { factor, limits })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// New rate and envelope for a clip whose content now plays `speed`
    /// times faster.
    fn playback_for(&self, clip: &Clip, speed: f64) -> PlaybackChange {
        let desired = clip.playback_rate * clip.velocity_factor() * speed;
        let clamped = self.limits.clamp(desired);

        let envelope = if clamped == desired {
            EnvelopeChange::Remove
        } else if clip.has_velocity_envelope_support() {
            tracing::debug!(
                "{}: rate {:.3} clamped to {:.3}, envelope {:.3}",
                clip.id(),
                desired,
                clamped,
                desired / clamped
            );
            EnvelopeChange::Set(desired / clamped)
        } else {
            tracing::warn!(
                "{}: rate {:.3} clamped to {:.3} without compensation ({} clip)",
                clip.id(),
                desired,
                clamped,
                clip.media
            );
            EnvelopeChange::Remove
        };

        PlaybackChange {
            rate: clamped,
            envelope,
        }
    }
}

impl Recalculator for SpeedRescale {
    fn name(&self) -> &str {
        "Speed rescale"
    }

    fn plan(
        &self,
        project: &Project,
        primary: TrackId,
        rules: &TimelineRules,
        tie: &mut dyn TieBreak,
    ) -> EditResult<EditPlan> {
        let track = project.track(primary).ok_or(EditError::TrackNotFound(primary))?;
        if track.is_empty() {
            return Err(EditError::empty_track(track.label()));
        }

        let rate = project.frame_rate;
        let mut remapper = MarkerRemapper::new(project, rules.transition.clone());
        let mut adjustments: Vec<TimingAdjustment> = Vec::new();
        let mut plan = EditPlan::new(primary);

        for clip in track.clips() {
            let old_length = clip.length;
            let new_start = find_adjustment(&adjustments, clip.start)
                .map(|adjustment| adjustment.map_proportional(clip.start))
                .unwrap_or(clip.start);
            let mut record = ClipReposition::moved(primary, clip, new_start);

            let mut speed = None;
            if clip.selected && old_length > Timecode::ZERO {
                let target = old_length.scale(1.0 / self.factor);
                let new_length = round_without_redundancy(target, old_length, rate, tie);
                if let Some(actual) = old_length.ratio(new_length) {
                    record.new_length = Some(new_length);
                    record.playback = Some(self.playback_for(clip, actual));
                    speed = Some(actual);
                    tracing::debug!(
                        "{}: length {} -> {} (x{:.4})",
                        clip.id(),
                        old_length,
                        new_length,
                        actual
                    );
                }
            }

            let adjustment = TimingAdjustment::new(
                clip.id(),
                clip.start,
                clip.end(),
                record.new_start,
                record.final_end(),
            );
            if !adjustment.is_identity() {
                if let Some(actual) = speed {
                    remapper.remap_scaled_transitions(&adjustment, actual, rate, tie);
                } else {
                    tracing::debug!("{}: cascaded {} -> {}", clip.id(), clip.start, new_start);
                }
                remapper.remap_clip(&adjustment);
                adjustments.push(adjustment);
            }

            plan.primary.push(record);
        }

        let propagator = AuxiliaryPropagator::new(
            primary,
            rules.skipped_tracks(),
            PropagationMode::Proportional,
        )
        .group_aware(true);
        plan.auxiliary = propagator.propagate(project, &adjustments);
        plan.markers = remapper.into_moves();
        plan.prune();
        Ok(plan)
    }
}
