//! Frame rounding.
//!
//! All conversions from free timecodes to frame boundaries go through
//! here, so the lossy step is always explicit.
//!
//! # Modes
//!
//! - **Down**: start of the frame containing the timecode
//! - **Up**: first frame boundary at or after the timecode
//! - **Nearest**: closest boundary, ties round up
//!
//! The random variants take a [`TieBreak`] so callers (and tests) decide
//! where the coin flip comes from.

use rand::Rng;

use crate::models::{FrameRate, Timecode};

/// Direction for [`round_to_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundMode {
    Down,
    Up,
    Nearest,
}

/// Source of the up/down decision when two frame boundaries are equally valid.
pub trait TieBreak {
    /// Return `true` to pick the upper boundary.
    fn prefer_up(&mut self) -> bool;
}

/// Coin flip backed by any `rand` generator.
///
/// Seed it (`StdRng::seed_from_u64`) for reproducible edits.
#[derive(Debug, Clone)]
pub struct RandomTieBreak<R> {
    rng: R,
}

impl<R: Rng> RandomTieBreak<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomTieBreak<rand::rngs::StdRng> {
    /// Deterministic generator from a seed.
    pub fn seeded(seed: u64) -> Self {
        use rand::SeedableRng;
        Self::new(rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        Self::new(rand::rngs::StdRng::from_os_rng())
    }
}

impl<R: Rng> TieBreak for RandomTieBreak<R> {
    fn prefer_up(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}

/// Always the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedTieBreak {
    Down,
    Up,
}

impl TieBreak for FixedTieBreak {
    fn prefer_up(&mut self) -> bool {
        matches!(self, FixedTieBreak::Up)
    }
}

/// Round a timecode to a frame boundary.
///
/// `Down` is the largest boundary at or before `timecode`, `Up` the
/// smallest at or after it.
pub fn round_to_frame(timecode: Timecode, rate: FrameRate, mode: RoundMode) -> Timecode {
    let frames = timecode.frame_count(rate);
    let down = Timecode::from_frames(frames, rate);
    let up = if down == timecode {
        down
    } else {
        Timecode::from_frames(frames + 1, rate)
    };

    match mode {
        RoundMode::Down => down,
        RoundMode::Up => up,
        RoundMode::Nearest => {
            if timecode - down < up - timecode {
                down
            } else {
                up
            }
        }
    }
}

/// Floor to a frame, then add zero or one frame depending on the tie-break.
///
/// Unlike [`RoundMode::Up`], the "up" choice here is always the next frame,
/// even when the timecode already sits on a boundary.
pub fn round_to_frame_random(timecode: Timecode, rate: FrameRate, tie: &mut dyn TieBreak) -> Timecode {
    let frames = timecode.frame_count(rate);
    let extra = if tie.prefer_up() { 1 } else { 0 };
    Timecode::from_frames(frames + extra, rate)
}

/// Round a rescaled length to a frame boundary without reproducing the
/// original length.
///
/// Picks between round-down and round-up of `new_length`:
/// - both equal (already on a frame) → that value
/// - round-down equals `old_length` or zero → round-up
/// - round-up equals `old_length` → round-down
/// - otherwise the tie-break decides
///
/// So `old_length` only comes back when no other boundary is valid.
pub fn round_without_redundancy(
    new_length: Timecode,
    old_length: Timecode,
    rate: FrameRate,
    tie: &mut dyn TieBreak,
) -> Timecode {
    let down = round_to_frame(new_length, rate, RoundMode::Down);
    let up = round_to_frame(new_length, rate, RoundMode::Up);

    if down == up {
        return up;
    }
    if down == old_length || down <= Timecode::ZERO {
        return up;
    }
    if up == old_length {
        return down;
    }
    if tie.prefer_up() {
        up
    } else {
        down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pal() -> FrameRate {
        FrameRate::new(25.0)
    }

    fn ms(value: i64) -> Timecode {
        Timecode::from_ms(value)
    }

    /// Tie-break that counts how often it was consulted.
    struct Counting {
        calls: usize,
        answer: bool,
    }

    impl TieBreak for Counting {
        fn prefer_up(&mut self) -> bool {
            self.calls += 1;
            self.answer
        }
    }

    #[test]
    fn round_modes() {
        let rate = pal(); // 40ms frames
        assert_eq!(round_to_frame(ms(50), rate, RoundMode::Down), ms(40));
        assert_eq!(round_to_frame(ms(50), rate, RoundMode::Up), ms(80));
        assert_eq!(round_to_frame(ms(50), rate, RoundMode::Nearest), ms(40));
        assert_eq!(round_to_frame(ms(70), rate, RoundMode::Nearest), ms(80));
        assert_eq!(round_to_frame(ms(60), rate, RoundMode::Nearest), ms(80));
    }

    #[test]
    fn just_under_boundary_rounds_to_neighbours() {
        let rate = pal();
        let near = Timecode::from_ticks(399_970);
        assert_eq!(round_to_frame(near, rate, RoundMode::Down), Timecode::ZERO);
        assert_eq!(round_to_frame(near, rate, RoundMode::Up), ms(40));
        assert_eq!(round_to_frame(near, rate, RoundMode::Nearest), ms(40));

        let ntsc = FrameRate::new(29.97);
        for frames in 1..120 {
            let tc = Timecode::from_frames(frames, ntsc) - Timecode::from_ticks(3);
            let down = round_to_frame(tc, ntsc, RoundMode::Down);
            let up = round_to_frame(tc, ntsc, RoundMode::Up);
            assert!(down <= tc && tc <= up, "frames {}", frames);
            assert_eq!(up, Timecode::from_frames(frames, ntsc));
        }
    }

    #[test]
    fn on_boundary_is_unchanged() {
        let rate = pal();
        for mode in [RoundMode::Down, RoundMode::Up, RoundMode::Nearest] {
            assert_eq!(round_to_frame(ms(120), rate, mode), ms(120));
        }
    }

    #[test]
    fn random_rounding_adds_at_most_one_frame() {
        let rate = pal();
        assert_eq!(round_to_frame_random(ms(50), rate, &mut FixedTieBreak::Down), ms(40));
        assert_eq!(round_to_frame_random(ms(50), rate, &mut FixedTieBreak::Up), ms(80));
        assert_eq!(round_to_frame_random(ms(40), rate, &mut FixedTieBreak::Up), ms(80));
    }

    #[test]
    fn redundancy_avoids_old_length_on_down() {
        let rate = pal();
        // 1010ms: down = 1000 (old), up = 1040
        let result = round_without_redundancy(ms(1010), ms(1000), rate, &mut FixedTieBreak::Down);
        assert_eq!(result, ms(1040));
    }

    #[test]
    fn redundancy_avoids_old_length_on_up() {
        let rate = pal();
        // 990ms: down = 960, up = 1000 (old)
        let result = round_without_redundancy(ms(990), ms(1000), rate, &mut FixedTieBreak::Up);
        assert_eq!(result, ms(960));
    }

    #[test]
    fn redundancy_never_returns_zero_length() {
        let rate = pal();
        let result = round_without_redundancy(ms(10), ms(40), rate, &mut FixedTieBreak::Down);
        assert_eq!(result, ms(40));
    }

    #[test]
    fn exact_frame_skips_tie_break() {
        let rate = pal();
        let mut tie = Counting { calls: 0, answer: true };
        let result = round_without_redundancy(ms(200), ms(1000), rate, &mut tie);
        assert_eq!(result, ms(200));
        assert_eq!(tie.calls, 0);
    }

    #[test]
    fn tie_break_decides_free_choice() {
        let rate = pal();
        assert_eq!(
            round_without_redundancy(ms(330), ms(1000), rate, &mut FixedTieBreak::Down),
            ms(320)
        );
        assert_eq!(
            round_without_redundancy(ms(330), ms(1000), rate, &mut FixedTieBreak::Up),
            ms(360)
        );
    }

    #[test]
    fn never_returns_old_length_unless_degenerate() {
        let rate = FrameRate::new(29.97);
        let mut tie = RandomTieBreak::seeded(7);
        let old = ms(2002);
        for step in 1..400 {
            let new_length = Timecode::from_millis_f64(step as f64 * 13.7);
            let down = round_to_frame(new_length, rate, RoundMode::Down);
            let up = round_to_frame(new_length, rate, RoundMode::Up);
            let result = round_without_redundancy(new_length, old, rate, &mut tie);
            assert!(result == down || result == up);
            if result == old {
                assert!(down == up || down <= Timecode::ZERO, "step {}", step);
            }
        }
    }

    #[test]
    fn seeded_tie_break_is_reproducible() {
        let mut a = RandomTieBreak::seeded(42);
        let mut b = RandomTieBreak::seeded(42);
        let first: Vec<bool> = (0..32).map(|_| a.prefer_up()).collect();
        let second: Vec<bool> = (0..32).map(|_| b.prefer_up()).collect();
        assert_eq!(first, second);
    }
}
