//! Error types for edit operations.
//!
//! Errors that abort an operation are [`EditError`]. Cut-list rows that
//! cannot be used are [`CutRowError`]; those never abort anything, they
//! are logged and counted as skipped rows.

use std::io;

use thiserror::Error;

use crate::models::{ClipId, MarkerId, Timecode, TrackId};

/// Error that aborts a whole edit operation.
#[derive(Error, Debug)]
pub enum EditError {
    /// No usable primary track.
    #[error("No video track named '{name}' found")]
    NoPrimaryTrack { name: String },

    /// The target track has no clips.
    #[error("Track {track} has no clips")]
    EmptyTrack { track: String },

    /// Speed factor is zero, negative or not finite.
    #[error("Invalid speed factor: {0}")]
    InvalidSpeedFactor(f64),

    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("Marker not found: {0}")]
    MarkerNotFound(MarkerId),

    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// A planned clip no longer matches the position the plan was computed from.
    #[error("{clip} moved since planning: expected start {expected_start}, found {found_start}")]
    StaleClip {
        clip: ClipId,
        expected_start: Timecode,
        found_start: Timecode,
    },

    /// A planned marker no longer sits where the plan expects it.
    #[error("{marker} moved since planning: expected {expected}, found {found}")]
    StaleMarker {
        marker: MarkerId,
        expected: Timecode,
        found: Timecode,
    },

    /// Cut list could not be used at all.
    #[error("Cut list error: {0}")]
    CutList(#[from] CutListError),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl EditError {
    /// Create a missing primary track error.
    pub fn no_primary_track(name: impl Into<String>) -> Self {
        Self::NoPrimaryTrack { name: name.into() }
    }

    /// Create an empty track error.
    pub fn empty_track(track: impl Into<String>) -> Self {
        Self::EmptyTrack {
            track: track.into(),
        }
    }

    /// Create a stale clip error.
    pub fn stale_clip(clip: ClipId, expected_start: Timecode, found_start: Timecode) -> Self {
        Self::StaleClip {
            clip,
            expected_start,
            found_start,
        }
    }

    /// Create a stale marker error.
    pub fn stale_marker(marker: MarkerId, expected: Timecode, found: Timecode) -> Self {
        Self::StaleMarker {
            marker,
            expected,
            found,
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;

/// Cut list unusable as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CutListError {
    #[error("Cut list contains no rows")]
    Empty,
}

/// A single cut-list row that has to be skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CutRowError {
    #[error("line {line}: expected 'command,timestamp'")]
    MissingField { line: usize },

    #[error("line {line}: cannot parse timestamp '{value}'")]
    InvalidTimestamp { line: usize, value: String },

    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
}

impl CutRowError {
    /// 1-based line number of the offending row.
    pub fn line(&self) -> usize {
        match self {
            Self::MissingField { line }
            | Self::InvalidTimestamp { line, .. }
            | Self::UnknownCommand { line, .. } => *line,
        }
    }
}
