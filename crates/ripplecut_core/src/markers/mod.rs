//! Marker Remapper.
//!
//! Computes marker moves for clip interval changes. All lookups go against
//! the marker snapshot taken when the remapper was created, never against
//! live positions, and every marker is claimed by at most one mapping
//! (first claim wins).
//!
//! Rules for one `(old_start, old_end) -> (new_start, new_end)` change:
//! - transition markers within `tolerance` at or before `old_end` keep
//!   their offset from the clip end (`new_end - (old_end - position)`)
//! - other markers strictly inside `(old_start, old_end)` shift by
//!   `new_start - old_start`
//!
//! Markers exactly at `old_start` belong to the previous clip's boundary
//! and are left alone here.

use std::collections::HashSet;

use crate::models::{FrameRate, Marker, MarkerId, Project, Timecode};
use crate::plan::MarkerMove;
use crate::timing::{round_to_frame_random, TieBreak, TimingAdjustment};

/// Default tolerance window before a clip end for transition markers.
pub const DEFAULT_TRANSITION_TOLERANCE_MS: i64 = 10;

/// How transition markers are recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRule {
    /// Label of transition markers (compared case-insensitively).
    pub label: String,
    /// Window before a clip end in which a transition marker counts as
    /// marking that boundary.
    pub tolerance: Timecode,
}

impl Default for TransitionRule {
    fn default() -> Self {
        Self {
            label: "v".to_string(),
            tolerance: Timecode::from_ms(DEFAULT_TRANSITION_TOLERANCE_MS),
        }
    }
}

impl TransitionRule {
    pub fn matches(&self, marker: &Marker) -> bool {
        marker.is_transition(&self.label)
    }

    /// Whether `position` lies in `[end - tolerance, end]`.
    pub fn is_near_end(&self, position: Timecode, end: Timecode) -> bool {
        position >= end - self.tolerance && position <= end
    }
}

/// Collects marker moves for one edit.
#[derive(Debug, Clone)]
pub struct MarkerRemapper {
    rule: TransitionRule,
    /// Original markers, ascending position.
    snapshot: Vec<Marker>,
    claimed: HashSet<MarkerId>,
    moves: Vec<MarkerMove>,
}

impl MarkerRemapper {
    pub fn new(project: &Project, rule: TransitionRule) -> Self {
        let mut snapshot = project.markers().to_vec();
        snapshot.sort_by_key(|marker| marker.position);
        Self {
            rule,
            snapshot,
            claimed: HashSet::new(),
            moves: Vec::new(),
        }
    }

    pub fn rule(&self) -> &TransitionRule {
        &self.rule
    }

    pub fn is_claimed(&self, marker: MarkerId) -> bool {
        self.claimed.contains(&marker)
    }

    /// Transition marker marking the boundary at `end`: the one with the
    /// greatest original position inside the tolerance window.
    pub fn transition_at_end(&self, end: Timecode) -> Option<&Marker> {
        self.snapshot
            .iter()
            .filter(|marker| self.rule.matches(marker) && self.rule.is_near_end(marker.position, end))
            .max_by_key(|marker| marker.position)
    }

    /// Remap markers for a clip that moved (and possibly resized).
    ///
    /// Returns the number of markers claimed.
    pub fn remap_clip(&mut self, adjustment: &TimingAdjustment) -> usize {
        if adjustment.is_identity() {
            return 0;
        }

        let delta = adjustment.delta();
        let mut pending = Vec::new();
        for marker in &self.snapshot {
            if self.claimed.contains(&marker.id()) {
                continue;
            }
            let position = marker.position;
            let new_position = if self.rule.matches(marker)
                && self.rule.is_near_end(position, adjustment.old_end)
            {
                adjustment.new_end - (adjustment.old_end - position)
            } else if position > adjustment.old_start && position < adjustment.old_end {
                position + delta
            } else {
                continue;
            };
            pending.push((marker.clone(), new_position));
        }

        let claimed = pending.len();
        for (marker, new_position) in pending {
            self.claim(&marker, new_position);
        }
        claimed
    }

    /// Re-place transition markers inside a rescaled clip.
    ///
    /// A marker at `position` in `[old_start, old_end)` lands at
    /// `new_start + round_random((position - old_start) / speed)`.
    pub fn remap_scaled_transitions(
        &mut self,
        adjustment: &TimingAdjustment,
        speed: f64,
        rate: FrameRate,
        tie: &mut dyn TieBreak,
    ) -> usize {
        if !(speed.is_finite() && speed > 0.0) {
            return 0;
        }

        let targets: Vec<Marker> = self
            .snapshot
            .iter()
            .filter(|marker| {
                !self.claimed.contains(&marker.id())
                    && self.rule.matches(marker)
                    && adjustment.contains_old(marker.position)
            })
            .cloned()
            .collect();

        for marker in &targets {
            let offset = (marker.position - adjustment.old_start).scale(1.0 / speed);
            let new_position = adjustment.new_start + round_to_frame_random(offset, rate, tie);
            self.claim(marker, new_position);
        }
        targets.len()
    }

    fn claim(&mut self, marker: &Marker, new_position: Timecode) {
        self.claimed.insert(marker.id());
        tracing::trace!(
            "Marker '{}' at {} -> {}",
            marker.label,
            marker.position,
            new_position
        );
        self.moves.push(MarkerMove {
            marker: marker.id(),
            label: marker.label.clone(),
            original_position: marker.position,
            new_position,
        });
    }

    pub fn moves(&self) -> &[MarkerMove] {
        &self.moves
    }

    /// Moves that actually change a position, descending original position.
    pub fn into_moves(self) -> Vec<MarkerMove> {
        let mut moves: Vec<MarkerMove> = self
            .moves
            .into_iter()
            .filter(|mv| mv.new_position != mv.original_position)
            .collect();
        moves.sort_by(|a, b| b.original_position.cmp(&a.original_position));
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClipId;
    use crate::timing::FixedTieBreak;

    fn ms(value: i64) -> Timecode {
        Timecode::from_ms(value)
    }

    fn adj(old: (i64, i64), new: (i64, i64)) -> TimingAdjustment {
        TimingAdjustment::new(ClipId(1), ms(old.0), ms(old.1), ms(new.0), ms(new.1))
    }

    fn find(moves: &[MarkerMove], id: MarkerId) -> Option<&MarkerMove> {
        moves.iter().find(|mv| mv.marker == id)
    }

    #[test]
    fn inside_markers_shift_by_delta() {
        let mut project = Project::default();
        let inside = project.add_marker(ms(1500), "chapter");
        let at_start = project.add_marker(ms(1000), "chapter");
        let at_end = project.add_marker(ms(2000), "chapter");

        let mut remapper = MarkerRemapper::new(&project, TransitionRule::default());
        remapper.remap_clip(&adj((1000, 2000), (1200, 2200)));
        let moves = remapper.into_moves();

        assert_eq!(find(&moves, inside).unwrap().new_position, ms(1700));
        assert!(find(&moves, at_start).is_none());
        assert!(find(&moves, at_end).is_none());
    }

    #[test]
    fn first_claim_wins() {
        let mut project = Project::default();
        let marker = project.add_marker(ms(1500), "x");

        let mut remapper = MarkerRemapper::new(&project, TransitionRule::default());
        assert_eq!(remapper.remap_clip(&adj((1000, 2000), (900, 1900))), 1);
        assert_eq!(remapper.remap_clip(&adj((1400, 1600), (0, 200))), 0);
        let moves = remapper.into_moves();
        assert_eq!(moves.len(), 1);
        assert_eq!(find(&moves, marker).unwrap().new_position, ms(1400));
    }

    #[test]
    fn transition_marker_keeps_offset_from_new_end() {
        let mut project = Project::default();
        let marker = project.add_marker(ms(1950), "v");
        let rule = TransitionRule {
            tolerance: ms(50),
            ..TransitionRule::default()
        };

        let mut remapper = MarkerRemapper::new(&project, rule);
        // Shifted by +200ms and shortened: the mark follows the end.
        remapper.remap_clip(&adj((1000, 2000), (1200, 1900)));
        let moves = remapper.into_moves();
        let mv = find(&moves, marker).unwrap();
        assert_eq!(mv.new_position, ms(1850));
        assert_ne!(mv.new_position, ms(1950 + 200));
    }

    #[test]
    fn transition_outside_tolerance_shifts_flat() {
        let mut project = Project::default();
        let marker = project.add_marker(ms(1950), "v");

        let mut remapper = MarkerRemapper::new(&project, TransitionRule::default());
        remapper.remap_clip(&adj((1000, 2000), (1200, 1900)));
        let moves = remapper.into_moves();
        assert_eq!(find(&moves, marker).unwrap().new_position, ms(2150));
    }

    #[test]
    fn transition_at_end_picks_latest_in_window() {
        let mut project = Project::default();
        project.add_marker(ms(992), "v");
        let latest = project.add_marker(ms(996), "V");
        project.add_marker(ms(998), "chapter");
        project.add_marker(ms(980), "v");

        let remapper = MarkerRemapper::new(&project, TransitionRule::default());
        assert_eq!(remapper.transition_at_end(ms(1000)).unwrap().id(), latest);
        assert!(remapper.transition_at_end(ms(2000)).is_none());
    }

    #[test]
    fn scaled_transitions_use_frame_rounding() {
        let mut project = Project::default();
        let marker = project.add_marker(ms(1500), "v");
        project.add_marker(ms(1600), "chapter");

        let mut remapper = MarkerRemapper::new(&project, TransitionRule::default());
        let rate = FrameRate::new(25.0);
        // 2x faster: offset 500 -> 250 -> floor 240, tie-break up -> 280
        let claimed =
            remapper.remap_scaled_transitions(&adj((1000, 2000), (1000, 1500)), 2.0, rate, &mut FixedTieBreak::Up);
        assert_eq!(claimed, 1);
        let moves = remapper.into_moves();
        assert_eq!(find(&moves, marker).unwrap().new_position, ms(1280));
    }

    #[test]
    fn identity_adjustment_claims_nothing() {
        let mut project = Project::default();
        project.add_marker(ms(1500), "x");
        let mut remapper = MarkerRemapper::new(&project, TransitionRule::default());
        assert_eq!(remapper.remap_clip(&adj((1000, 2000), (1000, 2000))), 0);
    }

    #[test]
    fn moves_are_sorted_descending() {
        let mut project = Project::default();
        project.add_marker(ms(1100), "a");
        project.add_marker(ms(1800), "b");
        project.add_marker(ms(1400), "c");

        let mut remapper = MarkerRemapper::new(&project, TransitionRule::default());
        remapper.remap_clip(&adj((1000, 2000), (0, 1000)));
        let labels: Vec<String> = remapper.into_moves().into_iter().map(|mv| mv.label).collect();
        assert_eq!(labels, vec!["b", "c", "a"]);
    }
}
