//! Ripplecut Core - timeline recalculation engine for NLE automation
//!
//! This crate contains all edit logic with zero UI dependencies. A host
//! editor integration maps its document onto [`models::Project`], calls an
//! [`operations::Editor`] operation and mirrors the result back.

pub mod config;
pub mod cutlist;
pub mod groups;
pub mod logging;
pub mod markers;
pub mod models;
pub mod operations;
pub mod plan;
pub mod propagation;
pub mod recalc;
pub mod timing;

pub use operations::{EditError, EditResult, EditSummary, Editor, EditorConfig};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
