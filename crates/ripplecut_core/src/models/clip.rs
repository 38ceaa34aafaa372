//! Clips (track events) and their playback attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::timecode::Timecode;

/// Stable identity of a clip. Mutating position or length keeps the id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Identifier shared by clips that must move together (possibly across tracks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u64);

/// Kind of media a clip or track carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// Velocity envelope holding a constant speed multiplier on top of the
/// clip's playback rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityEnvelope {
    pub factor: f64,
}

/// A placed interval of content on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    #[serde(default)]
    id: ClipId,
    pub start: Timecode,
    pub length: Timecode,
    #[serde(default)]
    pub fade_in: Timecode,
    #[serde(default)]
    pub fade_out: Timecode,
    #[serde(default = "default_rate")]
    pub playback_rate: f64,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub group: Option<GroupId>,
    #[serde(default)]
    pub media: MediaKind,
    #[serde(default)]
    velocity: Option<VelocityEnvelope>,
}

fn default_rate() -> f64 {
    1.0
}

impl Clip {
    /// Create an unselected, ungrouped video clip at normal speed.
    ///
    /// The id is assigned when the clip is added to a project.
    pub fn new(start: Timecode, length: Timecode) -> Self {
        Self {
            id: ClipId::default(),
            start,
            length,
            fade_in: Timecode::ZERO,
            fade_out: Timecode::ZERO,
            playback_rate: 1.0,
            selected: false,
            group: None,
            media: MediaKind::Video,
            velocity: None,
        }
    }

    /// Convenience constructor from whole milliseconds.
    pub fn from_ms(start_ms: i64, length_ms: i64) -> Self {
        Self::new(Timecode::from_ms(start_ms), Timecode::from_ms(length_ms))
    }

    pub fn with_fades(mut self, fade_in: Timecode, fade_out: Timecode) -> Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }

    pub fn with_playback_rate(mut self, rate: f64) -> Self {
        self.playback_rate = rate;
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_media(mut self, media: MediaKind) -> Self {
        self.media = media;
        self
    }

    pub fn with_velocity(mut self, factor: f64) -> Self {
        self.set_velocity_envelope(Some(factor));
        self
    }

    pub fn id(&self) -> ClipId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: ClipId) {
        self.id = id;
    }

    /// End position (exclusive).
    pub fn end(&self) -> Timecode {
        self.start + self.length
    }

    /// Whether `position` lies in `[start, end)`.
    pub fn contains(&self, position: Timecode) -> bool {
        position >= self.start && position < self.end()
    }

    /// Move and resize the clip in one step.
    pub fn reposition(&mut self, new_start: Timecode, new_length: Timecode) {
        self.start = new_start;
        self.length = new_length;
    }

    /// Change the playback rate.
    ///
    /// With `preserve_length` the clip keeps its length and plays more or
    /// less content; otherwise the length is rescaled so the same content
    /// is covered.
    pub fn set_playback_rate(&mut self, rate: f64, preserve_length: bool) {
        if !preserve_length && rate > 0.0 {
            self.length = self.length.scale(self.playback_rate / rate);
        }
        self.playback_rate = rate;
    }

    /// Only video clips can carry a velocity envelope.
    pub fn has_velocity_envelope_support(&self) -> bool {
        self.media == MediaKind::Video
    }

    pub fn velocity_envelope(&self) -> Option<VelocityEnvelope> {
        self.velocity
    }

    /// Velocity factor currently applied, 1.0 without an envelope.
    pub fn velocity_factor(&self) -> f64 {
        self.velocity.map(|env| env.factor).unwrap_or(1.0)
    }

    /// Rate the viewer perceives: playback rate times envelope factor.
    pub fn effective_rate(&self) -> f64 {
        self.playback_rate * self.velocity_factor()
    }

    /// Set or remove the velocity envelope.
    ///
    /// Returns `false` (and changes nothing) when asked to add an envelope
    /// to a clip without envelope support.
    pub fn set_velocity_envelope(&mut self, factor: Option<f64>) -> bool {
        match factor {
            Some(factor) if self.has_velocity_envelope_support() => {
                self.velocity = Some(VelocityEnvelope { factor });
                true
            }
            Some(_) => false,
            None => {
                self.velocity = None;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let clip = Clip::from_ms(1000, 500);
        assert!(clip.contains(Timecode::from_ms(1000)));
        assert!(clip.contains(Timecode::from_ms(1499)));
        assert!(!clip.contains(Timecode::from_ms(1500)));
        assert!(!clip.contains(Timecode::from_ms(999)));
    }

    #[test]
    fn playback_rate_can_rescale_length() {
        let mut clip = Clip::from_ms(0, 900);
        clip.set_playback_rate(3.0, false);
        assert_eq!(clip.length, Timecode::from_ms(300));

        let mut kept = Clip::from_ms(0, 900);
        kept.set_playback_rate(3.0, true);
        assert_eq!(kept.length, Timecode::from_ms(900));
        assert_eq!(kept.playback_rate, 3.0);
    }

    #[test]
    fn audio_clips_reject_velocity_envelopes() {
        let mut clip = Clip::from_ms(0, 100).with_media(MediaKind::Audio);
        assert!(!clip.set_velocity_envelope(Some(1.5)));
        assert_eq!(clip.velocity_envelope(), None);
        assert!(clip.set_velocity_envelope(None));
    }

    #[test]
    fn effective_rate_includes_envelope() {
        let clip = Clip::from_ms(0, 100).with_playback_rate(2.0).with_velocity(1.5);
        assert_eq!(clip.effective_rate(), 3.0);
    }
}
