//! Timing arithmetic shared by all recalculators.
//!
//! - Explicit frame rounding with an injectable tie-break
//! - `TimingAdjustment` interval mappings (flat and proportional)

mod adjustment;
mod rounding;

pub use adjustment::{find_adjustment, PropagationMode, TimingAdjustment};
pub use rounding::{
    round_to_frame, round_to_frame_random, round_without_redundancy, FixedTieBreak,
    RandomTieBreak, RoundMode, TieBreak,
};
