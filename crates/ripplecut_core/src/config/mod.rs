//! Configuration management for ripplecut.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Conversion into the engine structs (`TimelineRules`, `SpeedLimits`, ...)
//!
//! # Example
//!
//! ```no_run
//! use ripplecut_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/ripplecut.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Primary track: {}", config.settings().timeline.primary_track);
//!
//! config.settings_mut().speed.max_rate = 8.0;
//! config.update_section(ConfigSection::Speed).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, CutListSettings, LoggingSettings, PropagationSettings, Settings, ShiftSettings,
    SpeedSettings, TimelineSettings,
};
