//! Shift-After-Cursor.

use super::{Recalculator, TimelineRules};
use crate::markers::MarkerRemapper;
use crate::models::{Project, Timecode, TrackId};
use crate::operations::{EditError, EditResult};
use crate::plan::{ClipReposition, EditPlan};
use crate::propagation::AuxiliaryPropagator;
use crate::timing::{PropagationMode, TieBreak, TimingAdjustment};

/// Default shift amount (4 seconds).
pub const DEFAULT_SHIFT_MS: i64 = 4000;

/// Moves every primary clip starting at or after `cursor` by `amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftAfterCursor {
    pub cursor: Timecode,
    pub amount: Timecode,
}

impl ShiftAfterCursor {
    pub fn new(cursor: Timecode, amount: Timecode) -> Self {
        Self { cursor, amount }
    }

    /// Shift by the default amount.
    pub fn at(cursor: Timecode) -> Self {
        Self::new(cursor, Timecode::from_ms(DEFAULT_SHIFT_MS))
    }
}

impl Recalculator for ShiftAfterCursor {
    fn name(&self) -> &str {
        "Shift after cursor"
    }

    fn plan(
        &self,
        project: &Project,
        primary: TrackId,
        rules: &TimelineRules,
        _tie: &mut dyn TieBreak,
    ) -> EditResult<EditPlan> {
        let track = project.track(primary).ok_or(EditError::TrackNotFound(primary))?;
        if track.is_empty() {
            return Err(EditError::empty_track(track.label()));
        }

        let mut plan = EditPlan::new(primary);
        if self.amount.is_zero() {
            return Ok(plan);
        }

        let mut remapper = MarkerRemapper::new(project, rules.transition.clone());
        let mut adjustments = Vec::new();

        for clip in track.clips().iter().filter(|clip| clip.start >= self.cursor) {
            let new_start = clip.start + self.amount;
            plan.primary.push(ClipReposition::moved(primary, clip, new_start));
            adjustments.push(TimingAdjustment::shifted(clip.id(), clip.start, clip.length, new_start));
        }

        tracing::debug!(
            "{} clip(s) at or after {} shift by {}",
            adjustments.len(),
            self.cursor,
            self.amount
        );

        for adjustment in &adjustments {
            remapper.remap_clip(adjustment);
        }

        let propagator = AuxiliaryPropagator::new(primary, rules.skipped_tracks(), PropagationMode::Flat)
            .group_aware(rules.group_aware_flat);
        plan.auxiliary = propagator.propagate(project, &adjustments);
        plan.markers = remapper.into_moves();
        plan.prune();
        Ok(plan)
    }
}
