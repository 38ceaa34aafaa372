//! Recalculators.
//!
//! Each recalculator turns a project snapshot into an [`EditPlan`]:
//! - [`CollapseAndFold`] removes gaps and normalises crossfades
//! - [`ShiftAfterCursor`] pushes everything after a cursor forward
//! - [`SpeedRescale`] rescales selected clips and cascades the change
//!
//! Planning only reads the project. The cut-list recalculator
//! ([`CutListApply`]) is the exception: it splits and deletes clips on the
//! live track row by row, since every row depends on the previous edit.

mod collapse;
mod cutlist;
mod shift;
mod speed;

pub use collapse::CollapseAndFold;
pub use cutlist::{CutListApply, CutOutcome};
pub use shift::{ShiftAfterCursor, DEFAULT_SHIFT_MS};
pub use speed::{SpeedLimits, SpeedRescale};

use crate::markers::TransitionRule;
use crate::models::{Project, TrackId};
use crate::operations::EditResult;
use crate::plan::EditPlan;
use crate::timing::TieBreak;

/// Track roles and marker conventions shared by all recalculators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRules {
    /// Name of the primary video track.
    pub primary_track: String,
    /// Tracks never touched by propagation.
    pub excluded_tracks: Vec<String>,
    pub transition: TransitionRule,
    /// Route flat propagation through group anchors too.
    pub group_aware_flat: bool,
}

impl Default for TimelineRules {
    fn default() -> Self {
        Self {
            primary_track: "main".to_string(),
            excluded_tracks: vec!["music".to_string()],
            transition: TransitionRule::default(),
            group_aware_flat: false,
        }
    }
}

impl TimelineRules {
    /// Track names propagation skips: the excluded tracks plus every track
    /// sharing the primary track's name, whatever its media kind.
    pub fn skipped_tracks(&self) -> Vec<String> {
        let mut names = self.excluded_tracks.clone();
        if !names.iter().any(|name| name.eq_ignore_ascii_case(&self.primary_track)) {
            names.push(self.primary_track.clone());
        }
        names
    }
}

/// A plan-producing edit.
pub trait Recalculator {
    /// Name used in logs and summaries.
    fn name(&self) -> &str;

    /// Compute the plan from original positions only.
    fn plan(
        &self,
        project: &Project,
        primary: TrackId,
        rules: &TimelineRules,
        tie: &mut dyn TieBreak,
    ) -> EditResult<EditPlan>;
}
