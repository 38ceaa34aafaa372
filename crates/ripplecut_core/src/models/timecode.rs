//! Fixed-precision timeline positions and frame rates.
//!
//! A [`Timecode`] is a signed count of 100-nanosecond ticks. That gives
//! sub-millisecond precision while keeping addition, subtraction and
//! comparison exact. Conversions to and from floating-point milliseconds
//! round to the nearest tick; conversions to frames are lossy and only
//! happen through [`FrameRate`] (see `timing::rounding` for the explicit
//! rounding modes).

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Ticks per millisecond (100ns resolution).
pub const TICKS_PER_MS: i64 = 10_000;

/// Ticks per second.
pub const TICKS_PER_SECOND: i64 = TICKS_PER_MS * 1000;

/// A signed position or duration on the timeline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timecode(i64);

impl Timecode {
    /// Zero position / empty duration.
    pub const ZERO: Timecode = Timecode(0);

    /// Create from raw 100ns ticks.
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Create from whole milliseconds.
    pub const fn from_ms(ms: i64) -> Self {
        Self(ms * TICKS_PER_MS)
    }

    /// Create from fractional milliseconds, rounded to the nearest tick.
    pub fn from_millis_f64(ms: f64) -> Self {
        Self((ms * TICKS_PER_MS as f64).round() as i64)
    }

    /// Create from fractional seconds, rounded to the nearest tick.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * TICKS_PER_SECOND as f64).round() as i64)
    }

    /// Raw tick count.
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /// Value in fractional milliseconds.
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / TICKS_PER_MS as f64
    }

    /// Value in fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / TICKS_PER_SECOND as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Multiply by a real factor, rounding to the nearest tick.
    pub fn scale(self, factor: f64) -> Self {
        Self((self.0 as f64 * factor).round() as i64)
    }

    /// Ratio `self / other`, or `None` when `other` is zero.
    pub fn ratio(self, other: Timecode) -> Option<f64> {
        if other.0 == 0 {
            None
        } else {
            Some(self.0 as f64 / other.0 as f64)
        }
    }

    /// Number of whole frames contained in this timecode (floor).
    ///
    /// The result is the largest `n` with `from_frames(n) <= self`, so a
    /// value a few ticks under a boundary still counts as the frame before.
    /// Negative values floor towards negative infinity.
    pub fn frame_count(self, rate: FrameRate) -> i64 {
        let mut frames = (self.0 as f64 / rate.ticks_per_frame()).floor() as i64;
        // Boundaries are rounded to whole ticks; settle on the exact one.
        while Self::from_frames(frames, rate) > self {
            frames -= 1;
        }
        while Self::from_frames(frames + 1, rate) <= self {
            frames += 1;
        }
        frames
    }

    /// Start position of the given frame.
    pub fn from_frames(frames: i64, rate: FrameRate) -> Self {
        Self((frames as f64 * rate.ticks_per_frame()).round() as i64)
    }
}

impl Add for Timecode {
    type Output = Timecode;

    fn add(self, rhs: Timecode) -> Timecode {
        Timecode(self.0 + rhs.0)
    }
}

impl AddAssign for Timecode {
    fn add_assign(&mut self, rhs: Timecode) {
        self.0 += rhs.0;
    }
}

impl Sub for Timecode {
    type Output = Timecode;

    fn sub(self, rhs: Timecode) -> Timecode {
        Timecode(self.0 - rhs.0)
    }
}

impl SubAssign for Timecode {
    fn sub_assign(&mut self, rhs: Timecode) {
        self.0 -= rhs.0;
    }
}

impl Neg for Timecode {
    type Output = Timecode;

    fn neg(self) -> Timecode {
        Timecode(-self.0)
    }
}

/// Formats as `HH:MM:SS.mmm`, with a leading `-` for negative values.
impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let total_ms = self.0.unsigned_abs() / TICKS_PER_MS as u64;
        let ms = total_ms % 1000;
        let total_secs = total_ms / 1000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;
        write!(f, "{}{:02}:{:02}:{:02}.{:03}", sign, hours, mins, secs, ms)
    }
}

/// Project frame rate in frames per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRate(f64);

impl FrameRate {
    /// Create a frame rate. Non-positive or non-finite values fall back to 30 fps.
    pub fn new(fps: f64) -> Self {
        if fps.is_finite() && fps > 0.0 {
            Self(fps)
        } else {
            Self(30.0)
        }
    }

    pub fn fps(self) -> f64 {
        self.0
    }

    /// Duration of one frame in ticks (fractional for NTSC rates).
    pub fn ticks_per_frame(self) -> f64 {
        TICKS_PER_SECOND as f64 / self.0
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 / self.0
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self(29.97)
    }
}
