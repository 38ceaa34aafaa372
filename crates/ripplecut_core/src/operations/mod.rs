//! Edit operations.
//!
//! The [`Editor`] is what a host binds its macros to. Every operation:
//! 1. Selects the primary track (a video track named after
//!    `TimelineRules::primary_track`)
//! 2. Plans the edit from original positions
//! 3. Commits the plan to the project
//! 4. Returns an [`EditSummary`] and logs the final layout
//!
//! Errors abort before any mutation, are returned to the caller and are
//! raised through the edit logger's notification callback.

pub mod errors;
mod summary;

use std::path::Path;
use std::sync::Arc;

pub use errors::{CutListError, CutRowError, EditError, EditResult};
pub use summary::{ClipLayout, EditSummary};

use crate::cutlist::CutList;
use crate::logging::EditLogger;
use crate::models::{MediaKind, Project, Timecode, Track, TrackId};
use crate::plan::commit;
use crate::recalc::{
    CollapseAndFold, CutListApply, Recalculator, ShiftAfterCursor, SpeedLimits, SpeedRescale,
    TimelineRules,
};
use crate::timing::{FixedTieBreak, TieBreak};

/// Engine-facing configuration, usually built from `config::Settings`.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub rules: TimelineRules,
    pub speed_limits: SpeedLimits,
    /// Factor of the large speed-up macro.
    pub large_speed_factor: f64,
    /// Factor of the small speed-up macro.
    pub small_speed_factor: f64,
    pub shift_amount: Timecode,
    /// Preferred cut-list track.
    pub cut_target_track: String,
    pub fast_forward_rate: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            rules: TimelineRules::default(),
            speed_limits: SpeedLimits::default(),
            large_speed_factor: 3.0,
            small_speed_factor: 1.0 / 0.9,
            shift_amount: Timecode::from_ms(crate::recalc::DEFAULT_SHIFT_MS),
            cut_target_track: "yeet".to_string(),
            fast_forward_rate: 3.0,
        }
    }
}

/// The primary track: a video track named `rules.primary_track`.
pub fn select_primary_track(project: &Project, rules: &TimelineRules) -> EditResult<TrackId> {
    project
        .find_track(&rules.primary_track, Some(MediaKind::Video))
        .map(Track::id)
        .ok_or_else(|| EditError::no_primary_track(&rules.primary_track))
}

/// Cut-list target: the named track if present, else the primary track.
pub fn select_cut_target(project: &Project, config: &EditorConfig) -> EditResult<TrackId> {
    match project.find_track(&config.cut_target_track, None) {
        Some(track) => Ok(track.id()),
        None => select_primary_track(project, &config.rules),
    }
}

/// Runs edit operations against a project.
pub struct Editor {
    config: EditorConfig,
    logger: Option<Arc<EditLogger>>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            logger: None,
        }
    }

    /// Report progress, layouts and failures through `logger`.
    pub fn with_logger(mut self, logger: Arc<EditLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn logger(&self) -> Option<&Arc<EditLogger>> {
        self.logger.as_ref()
    }

    /// Pack the primary track and normalise crossfades.
    pub fn collapse_and_fold(&self, project: &mut Project) -> EditResult<EditSummary> {
        self.run(project, &CollapseAndFold::new(), &mut FixedTieBreak::Down)
    }

    /// Push everything starting after `cursor` by the configured amount.
    pub fn shift_after_cursor(&self, project: &mut Project, cursor: Timecode) -> EditResult<EditSummary> {
        let shift = ShiftAfterCursor::new(cursor, self.config.shift_amount);
        self.run(project, &shift, &mut FixedTieBreak::Down)
    }

    /// Speed up the selected primary clips by `factor`.
    pub fn rescale_selected(
        &self,
        project: &mut Project,
        factor: f64,
        tie: &mut dyn TieBreak,
    ) -> EditResult<EditSummary> {
        match SpeedRescale::new(factor, self.config.speed_limits) {
            Ok(rescale) => self.run(project, &rescale, tie),
            Err(e) => self.finish(&format!("Speed x{}", factor), project, None, Err(e)),
        }
    }

    pub fn speed_up_large(&self, project: &mut Project, tie: &mut dyn TieBreak) -> EditResult<EditSummary> {
        self.rescale_selected(project, self.config.large_speed_factor, tie)
    }

    pub fn speed_up_small(&self, project: &mut Project, tie: &mut dyn TieBreak) -> EditResult<EditSummary> {
        self.rescale_selected(project, self.config.small_speed_factor, tie)
    }

    /// Apply a parsed cut list to the cut target track.
    pub fn apply_cut_list(&self, project: &mut Project, list: &CutList) -> EditResult<EditSummary> {
        let name = "Cut list";
        if let Some(logger) = &self.logger {
            logger.phase(name);
        }

        if let Some(logger) = &self.logger {
            for rejected in &list.rejected {
                logger.detail(&format!("Skipped: {}", rejected));
            }
        }

        let result = select_cut_target(project, &self.config).and_then(|track| {
            let outcome = CutListApply::new(self.config.fast_forward_rate)?.apply(project, track, &list.rows)?;
            let mut summary = EditSummary::capture(name, project, track);
            summary.primary_clips_changed = outcome.clips_fast_forwarded;
            summary.rows_applied = outcome.applied;
            summary.rows_skipped = outcome.skipped + list.rejected.len();
            summary.clips_removed = outcome.clips_removed;
            Ok((track, summary))
        });

        match result {
            Ok((track, summary)) => self.finish(name, project, Some(track), Ok(summary)),
            Err(e) => self.finish(name, project, None, Err(e)),
        }
    }

    /// Parse `text` and apply it.
    pub fn apply_cut_list_text(&self, project: &mut Project, text: &str) -> EditResult<EditSummary> {
        match CutList::parse(text) {
            Ok(list) => self.apply_cut_list(project, &list),
            Err(e) => self.finish("Cut list", project, None, Err(e.into())),
        }
    }

    /// Read a cut-list file and apply it.
    pub fn apply_cut_list_file(&self, project: &mut Project, path: impl AsRef<Path>) -> EditResult<EditSummary> {
        match CutList::from_path(path) {
            Ok(list) => self.apply_cut_list(project, &list),
            Err(e) => self.finish("Cut list", project, None, Err(e)),
        }
    }

    /// Plan with `recalc` and commit the plan.
    pub fn run(
        &self,
        project: &mut Project,
        recalc: &dyn Recalculator,
        tie: &mut dyn TieBreak,
    ) -> EditResult<EditSummary> {
        let name = recalc.name().to_string();
        if let Some(logger) = &self.logger {
            logger.phase(&name);
        }

        match self.plan_and_commit(project, recalc, tie) {
            Ok((primary, summary)) => self.finish(&name, project, Some(primary), Ok(summary)),
            Err(e) => self.finish(&name, project, None, Err(e)),
        }
    }

    fn plan_and_commit(
        &self,
        project: &mut Project,
        recalc: &dyn Recalculator,
        tie: &mut dyn TieBreak,
    ) -> EditResult<(TrackId, EditSummary)> {
        let primary = select_primary_track(project, &self.config.rules)?;
        let mut plan = recalc.plan(project, primary, &self.config.rules, tie)?;
        plan.prune();

        tracing::debug!(
            "{}: planned {} primary, {} auxiliary, {} marker record(s)",
            recalc.name(),
            plan.primary.len(),
            plan.auxiliary.len(),
            plan.markers.len()
        );

        let report = commit(project, &plan)?;
        if report.envelopes_rejected > 0 {
            self.warn(&format!(
                "{} clip(s) could not take a velocity envelope",
                report.envelopes_rejected
            ));
        }

        let mut summary = EditSummary::capture(recalc.name(), project, primary);
        summary.primary_clips_changed = report.primary_clips;
        summary.auxiliary_clips_changed = report.auxiliary_clips;
        summary.markers_moved = report.markers_moved;
        Ok((primary, summary))
    }

    fn finish(
        &self,
        name: &str,
        project: &Project,
        track: Option<TrackId>,
        result: EditResult<EditSummary>,
    ) -> EditResult<EditSummary> {
        match &result {
            Ok(summary) => {
                tracing::info!("{}", summary.headline());
                if let Some(logger) = &self.logger {
                    logger.success(&summary.headline());
                    if let Some(track) = track {
                        logger.log_layout(project, track);
                    }
                    logger.log_transition_markers(project, &self.config.rules.transition.label);
                }
            }
            Err(e) => {
                tracing::error!("{} failed: {}", name, e);
                if let Some(logger) = &self.logger {
                    logger.error(&format!("{} failed: {}", name, e));
                    logger.show_tail(name);
                    logger.notify(name, &e.to_string());
                }
            }
        }
        result
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        if let Some(logger) = &self.logger {
            logger.warn(message);
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
