//! Document model for the recalculation engine.
//!
//! This module contains the interval types every edit operation works on:
//! - `Timecode` / `FrameRate` fixed-precision arithmetic
//! - Clips with fades, playback rate, selection and grouping
//! - Tracks (ordered clip containers, role inferred from name)
//! - Project-global markers and the owning `Project`

mod clip;
mod marker;
mod project;
mod timecode;
mod track;

pub use clip::{Clip, ClipId, GroupId, MediaKind, VelocityEnvelope};
pub use marker::{Marker, MarkerId};
pub use project::Project;
pub use timecode::{FrameRate, Timecode, TICKS_PER_MS, TICKS_PER_SECOND};
pub use track::{Track, TrackId};
