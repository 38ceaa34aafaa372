//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};
use crate::markers::TransitionRule;
use crate::models::{FrameRate, Project, Timecode};
use crate::operations::EditorConfig;
use crate::recalc::{SpeedLimits, TimelineRules};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Track roles and marker conventions.
    #[serde(default)]
    pub timeline: TimelineSettings,

    /// Speed rescale limits and presets.
    #[serde(default)]
    pub speed: SpeedSettings,

    /// Shift-after-cursor amount.
    #[serde(default)]
    pub shift: ShiftSettings,

    /// Cut-list target and fast-forward rate.
    #[serde(default)]
    pub cutlist: CutListSettings,

    /// Auxiliary propagation options.
    #[serde(default)]
    pub propagation: PropagationSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Engine rules for every recalculator.
    pub fn timeline_rules(&self) -> TimelineRules {
        TimelineRules {
            primary_track: self.timeline.primary_track.clone(),
            excluded_tracks: self.timeline.excluded_tracks.clone(),
            transition: TransitionRule {
                label: self.timeline.transition_label.clone(),
                tolerance: Timecode::from_millis_f64(self.timeline.transition_tolerance_ms),
            },
            group_aware_flat: self.propagation.group_aware_flat,
        }
    }

    pub fn speed_limits(&self) -> SpeedLimits {
        SpeedLimits::new(self.speed.min_rate, self.speed.max_rate)
    }

    /// Everything the editor needs, resolved from all sections.
    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            rules: self.timeline_rules(),
            speed_limits: self.speed_limits(),
            large_speed_factor: self.speed.large_factor,
            small_speed_factor: self.speed.small_factor,
            shift_amount: Timecode::from_millis_f64(self.shift.amount_ms),
            cut_target_track: self.cutlist.target_track.clone(),
            fast_forward_rate: self.cutlist.fast_forward_rate,
        }
    }

    /// Empty project at the configured frame rate.
    pub fn new_project(&self) -> Project {
        Project::new(self.timeline.frame_rate())
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.logging.level,
            compact: self.logging.compact,
            error_tail: self.logging.error_tail as usize,
            show_timestamps: self.logging.show_timestamps,
        }
    }
}

/// Track roles and transition-marker conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSettings {
    /// Name of the primary video track.
    #[serde(default = "default_primary_track")]
    pub primary_track: String,

    /// Tracks left untouched by propagation.
    #[serde(default = "default_excluded_tracks")]
    pub excluded_tracks: Vec<String>,

    /// Label of transition markers.
    #[serde(default = "default_transition_label")]
    pub transition_label: String,

    /// Window before a clip end in which a transition marker follows the end.
    #[serde(default = "default_transition_tolerance_ms")]
    pub transition_tolerance_ms: f64,

    /// Frame rate for projects created by the host without one.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
}

fn default_primary_track() -> String {
    "main".to_string()
}

fn default_excluded_tracks() -> Vec<String> {
    vec!["music".to_string()]
}

fn default_transition_label() -> String {
    "v".to_string()
}

fn default_transition_tolerance_ms() -> f64 {
    10.0
}

fn default_frame_rate() -> f64 {
    29.97
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            primary_track: default_primary_track(),
            excluded_tracks: default_excluded_tracks(),
            transition_label: default_transition_label(),
            transition_tolerance_ms: default_transition_tolerance_ms(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl TimelineSettings {
    pub fn frame_rate(&self) -> FrameRate {
        FrameRate::new(self.frame_rate)
    }
}

/// Speed rescale limits and preset factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedSettings {
    /// Slowest playback rate a clip may get.
    #[serde(default = "default_min_rate")]
    pub min_rate: f64,

    /// Fastest playback rate a clip may get.
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,

    /// Factor of the large speed-up preset.
    #[serde(default = "default_large_factor")]
    pub large_factor: f64,

    /// Factor of the small speed-up preset.
    #[serde(default = "default_small_factor")]
    pub small_factor: f64,
}

fn default_min_rate() -> f64 {
    0.25
}

fn default_max_rate() -> f64 {
    4.0
}

fn default_large_factor() -> f64 {
    3.0
}

fn default_small_factor() -> f64 {
    1.0 / 0.9
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            min_rate: default_min_rate(),
            max_rate: default_max_rate(),
            large_factor: default_large_factor(),
            small_factor: default_small_factor(),
        }
    }
}

/// Shift-after-cursor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftSettings {
    /// Distance everything after the cursor is pushed, in milliseconds.
    #[serde(default = "default_shift_amount_ms")]
    pub amount_ms: f64,
}

fn default_shift_amount_ms() -> f64 {
    4000.0
}

impl Default for ShiftSettings {
    fn default() -> Self {
        Self {
            amount_ms: default_shift_amount_ms(),
        }
    }
}

/// Cut-list settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutListSettings {
    /// Preferred target track; the primary track is used when missing.
    #[serde(default = "default_target_track")]
    pub target_track: String,

    /// Playback rate of `F` rows.
    #[serde(default = "default_fast_forward_rate")]
    pub fast_forward_rate: f64,
}

fn default_target_track() -> String {
    "yeet".to_string()
}

fn default_fast_forward_rate() -> f64 {
    3.0
}

impl Default for CutListSettings {
    fn default() -> Self {
        Self {
            target_track: default_target_track(),
            fast_forward_rate: default_fast_forward_rate(),
        }
    }
}

/// Auxiliary propagation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropagationSettings {
    /// Move grouped clips by their anchor in flat propagation too.
    #[serde(default)]
    pub group_aware_flat: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level written by edit loggers.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep per-clip detail lines out of the host log.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of recent lines kept for error reports.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Prefix log lines with a timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Folder for edit log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            show_timestamps: true,
            logs_folder: default_logs_folder(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Timeline,
    Speed,
    Shift,
    CutList,
    Propagation,
    Logging,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 6] = [
        ConfigSection::Timeline,
        ConfigSection::Speed,
        ConfigSection::Shift,
        ConfigSection::CutList,
        ConfigSection::Propagation,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Timeline => "timeline",
            ConfigSection::Speed => "speed",
            ConfigSection::Shift => "shift",
            ConfigSection::CutList => "cutlist",
            ConfigSection::Propagation => "propagation",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the table.
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSection::Timeline => "Track roles and transition markers",
            ConfigSection::Speed => "Speed rescale limits and presets",
            ConfigSection::Shift => "Shift after cursor",
            ConfigSection::CutList => "CSV cut lists",
            ConfigSection::Propagation => "Propagation to auxiliary tracks",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}
