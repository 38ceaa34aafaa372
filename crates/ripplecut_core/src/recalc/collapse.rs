//! Collapse-and-Fold.
//!
//! Packs the primary track from zero with no gaps. A transition between
//! clip `i-1` and clip `i` is detected from, in order:
//! 1. a transition marker in the tolerance window before the previous
//!    clip's original end (fold = `previous_end - marker`)
//! 2. non-zero fade-out on the previous clip and fade-in on this one
//!    (fold = their average)
//!
//! A detected transition overlaps the clips by the fold length and sets
//! both fades to it.

use super::{Recalculator, TimelineRules};
use crate::markers::MarkerRemapper;
use crate::models::{Clip, Project, Timecode, TrackId};
use crate::operations::{EditError, EditResult};
use crate::plan::{ClipReposition, EditPlan};
use crate::propagation::AuxiliaryPropagator;
use crate::timing::{PropagationMode, TieBreak, TimingAdjustment};

#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseAndFold;

impl CollapseAndFold {
    pub fn new() -> Self {
        Self
    }

    /// Fold length between `previous` and `current`, if they form a transition.
    fn detect_fold(previous: &Clip, current: &Clip, remapper: &MarkerRemapper) -> Option<Timecode> {
        let previous_end = previous.end();
        let from_marker = remapper
            .transition_at_end(previous_end)
            .filter(|marker| marker.position > previous.start)
            .map(|marker| previous_end - marker.position)
            .filter(|fold| *fold > Timecode::ZERO);

        let fold = from_marker.or_else(|| {
            (previous.fade_out > Timecode::ZERO && current.fade_in > Timecode::ZERO).then(|| {
                Timecode::from_ticks((previous.fade_out.ticks() + current.fade_in.ticks()) / 2)
            })
        })?;

        Some(fold.min(previous.length).min(current.length))
    }
}

impl Recalculator for CollapseAndFold {
    fn name(&self) -> &str {
        "Collapse and fold"
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

        let mut remapper = MarkerRemapper::new(project, rules.transition.clone());
        let clips = track.clips();
        let mut records: Vec<ClipReposition> = Vec::with_capacity(clips.len());
        let mut adjustments = Vec::with_capacity(clips.len());

        for (index, clip) in clips.iter().enumerate() {
            let mut record = ClipReposition::unchanged(primary, clip);

            if index == 0 {
                record.new_start = Timecode::ZERO;
            } else {
                let previous = &clips[index - 1];
                let previous_new_end = records[index - 1].final_end();
                match Self::detect_fold(previous, clip, &remapper) {
                    Some(fold) => {
                        tracing::debug!(
                            "Clip {}: transition with previous, fold {}",
                            index,
                            fold
                        );
                        record.new_start = previous_new_end - fold;
                        record.new_fade_in = Some(fold);
                        records[index - 1].new_fade_out = Some(fold);
                    }
                    None => {
                        record.new_start = previous_new_end;
                    }
                }
            }

            tracing::debug!(
                "Clip {}: {} -> {} (length {})",
                index,
                clip.start,
                record.new_start,
                clip.length
            );
            adjustments.push(TimingAdjustment::shifted(
                clip.id(),
                clip.start,
                clip.length,
                record.new_start,
            ));
            records.push(record);
        }

        for adjustment in &adjustments {
            remapper.remap_clip(adjustment);
        }

        let propagator = AuxiliaryPropagator::new(primary, rules.skipped_tracks(), PropagationMode::Flat)
            .group_aware(rules.group_aware_flat);

        let mut plan = EditPlan::new(primary);
        plan.auxiliary = propagator.propagate(project, &adjustments);
        plan.primary = records;
        plan.markers = remapper.into_moves();
        plan.prune();
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FrameRate, MediaKind};
    use crate::timing::FixedTieBreak;

    fn ms(value: i64) -> Timecode {
        Timecode::from_ms(value)
    }

    fn plan_for(project: &Project, main: TrackId) -> EditPlan {
        CollapseAndFold::new()
            .plan(project, main, &TimelineRules::default(), &mut FixedTieBreak::Down)
            .unwrap()
    }

    fn new_start(plan: &EditPlan, project: &Project, main: TrackId, index: usize) -> Timecode {
        let clip = &project.track(main).unwrap().clips()[index];
        plan.primary_record(clip.id())
            .map(|record| record.new_start)
            .unwrap_or(clip.start)
    }

    #[test]
    fn gaps_are_removed() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        project.add_clip(main, Clip::from_ms(500, 1000)).unwrap();
        project.add_clip(main, Clip::from_ms(3000, 400)).unwrap();
        project.add_clip(main, Clip::from_ms(9000, 200)).unwrap();

        let plan = plan_for(&project, main);
        assert_eq!(new_start(&plan, &project, main, 0), ms(0));
        assert_eq!(new_start(&plan, &project, main, 1), ms(1000));
        assert_eq!(new_start(&plan, &project, main, 2), ms(1400));
    }

    #[test]
    fn fades_fold_to_their_average() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        let a = project
            .add_clip(main, Clip::from_ms(0, 2000).with_fades(Timecode::ZERO, ms(500)))
            .unwrap();
        let b = project
            .add_clip(main, Clip::from_ms(5000, 2000).with_fades(ms(300), Timecode::ZERO))
            .unwrap();

        let plan = plan_for(&project, main);
        let first = plan.primary_record(a).unwrap();
        let second = plan.primary_record(b).unwrap();
        assert_eq!(first.new_fade_out, Some(ms(400)));
        assert_eq!(second.new_fade_in, Some(ms(400)));
        assert_eq!(second.new_start, first.final_end() - ms(400));
    }

    #[test]
    fn transition_marker_sets_fold() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        project.add_clip(main, Clip::from_ms(1000, 1000)).unwrap();
        let b = project.add_clip(main, Clip::from_ms(1992, 1000)).unwrap();
        project.add_marker(ms(1992), "v");

        let plan = plan_for(&project, main);
        let second = plan.primary_record(b).unwrap();
        // Previous clip ends at 1000 in the new layout; fold is 8ms.
        assert_eq!(second.new_start, ms(992));
        assert_eq!(second.new_fade_in, Some(ms(8)));

        // The transition marker follows the previous clip's new end.
        let mv = &plan.markers.iter().find(|mv| mv.label == "v").unwrap();
        assert_eq!(mv.new_position, ms(992));
    }

    #[test]
    fn fold_never_exceeds_clip_length() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        project
            .add_clip(main, Clip::from_ms(0, 1000).with_fades(Timecode::ZERO, ms(900)))
            .unwrap();
        let b = project
            .add_clip(main, Clip::from_ms(2000, 200).with_fades(ms(700), Timecode::ZERO))
            .unwrap();

        let plan = plan_for(&project, main);
        assert_eq!(plan.primary_record(b).unwrap().new_fade_in, Some(ms(200)));
    }

    #[test]
    fn auxiliary_clips_follow_flat() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        let titles = project.add_track(Some("titles"), MediaKind::Video);
        let music = project.add_track(Some("music"), MediaKind::Audio);
        project.add_clip(main, Clip::from_ms(1000, 1000)).unwrap();
        let title = project.add_clip(titles, Clip::from_ms(1500, 100)).unwrap();
        project.add_clip(music, Clip::from_ms(1500, 100)).unwrap();

        let plan = plan_for(&project, main);
        assert_eq!(plan.auxiliary.len(), 1);
        assert_eq!(plan.auxiliary_record(title).unwrap().new_start, ms(500));
    }

    #[test]
    fn empty_track_is_rejected() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        let err = CollapseAndFold::new()
            .plan(&project, main, &TimelineRules::default(), &mut FixedTieBreak::Down)
            .unwrap_err();
        assert!(matches!(err, EditError::EmptyTrack { .. }));
    }
}
