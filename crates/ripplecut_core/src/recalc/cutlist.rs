//! Cut/Fast-Forward apply.
//!
//! Rows are applied in order to the live target track. For each row the
//! clip containing the timestamp is split there and the right-hand part
//! is either deleted (`X`) or sped up (`F`). After an `X`, the clip right
//! before the deleted part is deleted too when it starts exactly at the
//! previous row's timestamp: that is the remnant left between two
//! consecutive cuts. The previous timestamp starts at zero.
//!
//! Nothing is propagated to other tracks or markers.

use serde::Serialize;

use crate::cutlist::{CutCommand, CutRow};
use crate::models::{Project, Timecode, TrackId};
use crate::operations::{EditError, EditResult};

/// Counters for one cut-list run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CutOutcome {
    pub applied: usize,
    /// Zero timestamps and timestamps outside every clip.
    pub skipped: usize,
    pub clips_removed: usize,
    pub clips_fast_forwarded: usize,
}

/// Applies parsed cut-list rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutListApply {
    fast_forward_rate: f64,
}

impl Default for CutListApply {
    fn default() -> Self {
        Self {
            fast_forward_rate: 3.0,
        }
    }
}

impl CutListApply {
    pub fn new(fast_forward_rate: f64) -> EditResult<Self> {
        if !fast_forward_rate.is_finite() || fast_forward_rate <= 0.0 {
            return Err(EditError::InvalidSpeedFactor(fast_forward_rate));
        }
        Ok(Self { fast_forward_rate })
    }

    pub fn name(&self) -> &str {
        "Cut list"
    }

    pub fn apply(&self, project: &mut Project, track: TrackId, rows: &[CutRow]) -> EditResult<CutOutcome> {
        let target = project.track(track).ok_or(EditError::TrackNotFound(track))?;
        if target.is_empty() {
            return Err(EditError::empty_track(target.label()));
        }

        let mut outcome = CutOutcome::default();
        let mut previous = Timecode::ZERO;

        for row in rows {
            if row.timestamp_ms == 0.0 {
                outcome.skipped += 1;
                continue;
            }
            let at = Timecode::from_millis_f64(row.timestamp_ms);
            if self.apply_row(project, track, row.command, at, previous, &mut outcome)? {
                outcome.applied += 1;
                previous = at;
            } else {
                tracing::debug!("Line {}: no clip at {}, skipped", row.line, at);
                outcome.skipped += 1;
            }
        }

        if let Some(target) = project.track_mut(track) {
            target.sort_clips();
        }

        tracing::debug!(
            "Cut list: {} applied, {} skipped, {} removed, {} fast-forwarded",
            outcome.applied,
            outcome.skipped,
            outcome.clips_removed,
            outcome.clips_fast_forwarded
        );
        Ok(outcome)
    }

    /// Returns `false` when no clip contains `at`.
    fn apply_row(
        &self,
        project: &mut Project,
        track: TrackId,
        command: CutCommand,
        at: Timecode,
        previous: Timecode,
        outcome: &mut CutOutcome,
    ) -> EditResult<bool> {
        let target = project.track(track).ok_or(EditError::TrackNotFound(track))?;
        let Some(clip) = target.clip_at(at) else {
            return Ok(false);
        };
        let (clip_id, offset) = (clip.id(), at - clip.start);

        let right = if offset > Timecode::ZERO {
            project.split_clip(track, clip_id, offset).unwrap_or(clip_id)
        } else {
            clip_id
        };

        let target = project.track_mut(track).ok_or(EditError::TrackNotFound(track))?;
        match command {
            CutCommand::Cut => {
                let index = target.index_of(right).ok_or(EditError::ClipNotFound(right))?;
                target.remove_clip(right);
                outcome.clips_removed += 1;

                if index > 0 {
                    let remnant = &target.clips()[index - 1];
                    if remnant.start == previous {
                        let remnant_id = remnant.id();
                        tracing::debug!("Removing remnant {} at {}", remnant_id, previous);
                        target.remove_clip(remnant_id);
                        outcome.clips_removed += 1;
                    }
                }
            }
            CutCommand::FastForward => {
                let clip = target.clip_mut(right).ok_or(EditError::ClipNotFound(right))?;
                clip.set_playback_rate(self.fast_forward_rate, true);
                clip.length = clip.length.scale(1.0 / self.fast_forward_rate);
                outcome.clips_fast_forwarded += 1;
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clip, FrameRate, MediaKind};

    fn ms(value: i64) -> Timecode {
        Timecode::from_ms(value)
    }

    fn row(command: CutCommand, timestamp_ms: f64) -> CutRow {
        CutRow {
            line: 1,
            command,
            timestamp_ms,
        }
    }

    fn spans(project: &Project, track: TrackId) -> Vec<(Timecode, Timecode)> {
        project
            .track(track)
            .unwrap()
            .clips()
            .iter()
            .map(|clip| (clip.start, clip.end()))
            .collect()
    }

    fn two_clips() -> (Project, TrackId) {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        project.add_clip(main, Clip::from_ms(0, 1000)).unwrap();
        project.add_clip(main, Clip::from_ms(1000, 1000)).unwrap();
        (project, main)
    }

    #[test]
    fn consecutive_cuts_remove_remnant() {
        let (mut project, main) = two_clips();
        let apply = CutListApply::default();

        let outcome = apply
            .apply(&mut project, main, &[row(CutCommand::Cut, 500.0)])
            .unwrap();
        // [500, 1000) is cut and [0, 500) starts at the previous timestamp (0).
        assert_eq!(outcome.clips_removed, 2);
        assert_eq!(spans(&project, main), vec![(ms(1000), ms(2000))]);
    }

    #[test]
    fn fast_forward_shortens_right_part() {
        let (mut project, main) = two_clips();
        let outcome = CutListApply::default()
            .apply(&mut project, main, &[row(CutCommand::FastForward, 1400.0)])
            .unwrap();
        assert_eq!(outcome.clips_fast_forwarded, 1);

        let track = project.track(main).unwrap();
        assert_eq!(track.len(), 3);
        let sped = &track.clips()[2];
        assert_eq!(sped.start, ms(1400));
        assert_eq!(sped.length, ms(200));
        assert_eq!(sped.playback_rate, 3.0);
        assert_eq!(track.clips()[1].end(), ms(1400));
    }

    #[test]
    fn zero_and_uncovered_timestamps_are_skipped() {
        let (mut project, main) = two_clips();
        let outcome = CutListApply::default()
            .apply(
                &mut project,
                main,
                &[row(CutCommand::Cut, 0.0), row(CutCommand::Cut, 5000.0)],
            )
            .unwrap();
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.applied, 0);
        assert_eq!(project.track(main).unwrap().len(), 2);
    }

    #[test]
    fn cut_at_clip_start_removes_whole_clip() {
        let (mut project, main) = two_clips();
        CutListApply::default()
            .apply(&mut project, main, &[row(CutCommand::Cut, 1000.0)])
            .unwrap();
        // The clip before starts at 0, the initial previous timestamp.
        assert!(project.track(main).unwrap().is_empty());
    }

    #[test]
    fn empty_track_is_rejected() {
        let mut project = Project::new(FrameRate::new(25.0));
        let main = project.add_track(Some("main"), MediaKind::Video);
        let err = CutListApply::default()
            .apply(&mut project, main, &[row(CutCommand::Cut, 10.0)])
            .unwrap_err();
        assert!(matches!(err, EditError::EmptyTrack { .. }));
    }
}
