//! Old-interval to new-interval mappings.

use serde::{Deserialize, Serialize};

use crate::models::{ClipId, Timecode};

/// How a point inside an adjusted interval follows the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationMode {
    /// Same absolute shift as the interval start.
    Flat,
    /// Same relative position inside the resized interval.
    Proportional,
}

/// `(old_start, old_end) -> (new_start, new_end)` for one primary clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingAdjustment {
    /// Primary clip this interval belongs to.
    pub clip: ClipId,
    pub old_start: Timecode,
    pub old_end: Timecode,
    pub new_start: Timecode,
    pub new_end: Timecode,
}

impl TimingAdjustment {
    pub fn new(
        clip: ClipId,
        old_start: Timecode,
        old_end: Timecode,
        new_start: Timecode,
        new_end: Timecode,
    ) -> Self {
        Self {
            clip,
            old_start,
            old_end,
            new_start,
            new_end,
        }
    }

    /// Interval moved without changing duration.
    pub fn shifted(clip: ClipId, old_start: Timecode, length: Timecode, new_start: Timecode) -> Self {
        Self::new(clip, old_start, old_start + length, new_start, new_start + length)
    }

    pub fn old_duration(&self) -> Timecode {
        self.old_end - self.old_start
    }

    pub fn new_duration(&self) -> Timecode {
        self.new_end - self.new_start
    }

    /// Shift applied to the interval start.
    pub fn delta(&self) -> Timecode {
        self.new_start - self.old_start
    }

    /// Whether anything moved or resized.
    pub fn is_identity(&self) -> bool {
        self.old_start == self.new_start && self.old_end == self.new_end
    }

    /// Whether `position` lies in the old interval `[old_start, old_end)`.
    pub fn contains_old(&self, position: Timecode) -> bool {
        position >= self.old_start && position < self.old_end
    }

    /// Relative position of `position` inside the old interval.
    ///
    /// `None` for a zero-duration interval.
    pub fn relative_position(&self, position: Timecode) -> Option<f64> {
        (position - self.old_start).ratio(self.old_duration())
    }

    /// Map a point by keeping its relative position.
    ///
    /// A zero-duration old interval maps nothing: the point comes back
    /// unchanged.
    pub fn map_proportional(&self, position: Timecode) -> Timecode {
        match self.relative_position(position) {
            Some(relative) => self.new_start + self.new_duration().scale(relative),
            None => position,
        }
    }

    /// Map a point by the flat start delta.
    pub fn map_flat(&self, position: Timecode) -> Timecode {
        position + self.delta()
    }

    pub fn map(&self, position: Timecode, mode: PropagationMode) -> Timecode {
        match mode {
            PropagationMode::Flat => self.map_flat(position),
            PropagationMode::Proportional => self.map_proportional(position),
        }
    }
}

/// First adjustment (in the given order) whose old interval contains `position`.
pub fn find_adjustment(adjustments: &[TimingAdjustment], position: Timecode) -> Option<&TimingAdjustment> {
    adjustments.iter().find(|adj| adj.contains_old(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: i64) -> Timecode {
        Timecode::from_ms(value)
    }

    fn adj(old: (i64, i64), new: (i64, i64)) -> TimingAdjustment {
        TimingAdjustment::new(ClipId(1), ms(old.0), ms(old.1), ms(new.0), ms(new.1))
    }

    #[test]
    fn proportional_keeps_relative_position() {
        let a = adj((1000, 2000), (1000, 1500));
        assert_eq!(a.map_proportional(ms(1500)), ms(1250));
        assert_eq!(a.map_proportional(ms(1000)), ms(1000));
    }

    #[test]
    fn proportional_invariant_holds_within_one_unit() {
        let a = TimingAdjustment::new(
            ClipId(1),
            Timecode::from_millis_f64(1234.5),
            Timecode::from_millis_f64(4321.1),
            Timecode::from_millis_f64(777.7),
            Timecode::from_millis_f64(1999.9),
        );
        let mut p = a.old_start;
        while p < a.old_end {
            let mapped = a.map_proportional(p);
            let before = (p - a.old_start).as_millis_f64() / a.old_duration().as_millis_f64();
            let after = (mapped - a.new_start).as_millis_f64() / a.new_duration().as_millis_f64();
            let error_ms = (after - before).abs() * a.new_duration().as_millis_f64();
            assert!(error_ms <= 1.0, "point {} drifted {}ms", p, error_ms);
            p += Timecode::from_millis_f64(37.3);
        }
    }

    #[test]
    fn zero_duration_is_noop() {
        let a = adj((500, 500), (800, 900));
        assert_eq!(a.relative_position(ms(500)), None);
        assert_eq!(a.map_proportional(ms(500)), ms(500));
        assert!(!a.contains_old(ms(500)));
    }

    #[test]
    fn flat_uses_start_delta() {
        let a = adj((1000, 2000), (600, 1600));
        assert_eq!(a.delta(), ms(-400));
        assert_eq!(a.map(ms(1700), PropagationMode::Flat), ms(1300));
    }

    #[test]
    fn first_match_wins() {
        let list = vec![adj((0, 1000), (0, 1000)), adj((900, 2000), (500, 1600))];
        let found = find_adjustment(&list, ms(950)).unwrap();
        assert_eq!(found.old_start, ms(0));
        assert_eq!(find_adjustment(&list, ms(2000)), None);
    }
}
