//! Project-global position markers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::timecode::Timecode;

/// Identity of a marker inside one project snapshot.
///
/// Markers cannot be moved in place; a move produces a new marker with a
/// new id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker#{}", self.0)
    }
}

/// A labelled point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(default)]
    id: MarkerId,
    pub position: Timecode,
    #[serde(default)]
    pub label: String,
}

impl Marker {
    pub fn new(position: Timecode, label: impl Into<String>) -> Self {
        Self {
            id: MarkerId::default(),
            position,
            label: label.into(),
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: MarkerId) {
        self.id = id;
    }

    /// Whether the label matches the transition label (case-insensitive).
    pub fn is_transition(&self, transition_label: &str) -> bool {
        self.label.eq_ignore_ascii_case(transition_label)
    }
}
