//! Engine tunables.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest width/height an object may have after a resize.
pub const MIN_OBJECT_SIZE: f64 = 50.0;
/// Distance (logical units, per axis) within which a corner handle is hit.
pub const HANDLE_TOLERANCE: f64 = 10.0;
/// Scale change per zoom step.
pub const ZOOM_STEP: f64 = 0.1;
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;
/// Keyboard nudge distance in logical units at scale 1.0.
pub const NUDGE_DISTANCE: f64 = 50.0;
/// A drag-to-create gesture must exceed this extent to count.
pub const CREATE_THRESHOLD: f64 = 10.0;
/// Extent used for an axis that was degenerate during drag-to-create.
pub const DEFAULT_CREATE_SIZE: f64 = 100.0;
/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Configuration for a [`Canvas`](crate::Canvas) session.
///
/// Every field has a default, so a partial JSON file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub min_object_size: f64,
    pub handle_tolerance: f64,
    pub zoom_step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub nudge_distance: f64,
    pub create_threshold: f64,
    pub default_create_size: f64,
    /// Minimum text box size after converting a drawing to text.
    pub text_min_width: f64,
    pub text_min_height: f64,
    pub max_undo_history: usize,
    pub default_table_rows: usize,
    pub default_table_cols: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_object_size: MIN_OBJECT_SIZE,
            handle_tolerance: HANDLE_TOLERANCE,
            zoom_step: ZOOM_STEP,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            nudge_distance: NUDGE_DISTANCE,
            create_threshold: CREATE_THRESHOLD,
            default_create_size: DEFAULT_CREATE_SIZE,
            text_min_width: 100.0,
            text_min_height: 40.0,
            max_undo_history: MAX_UNDO_HISTORY,
            default_table_rows: 3,
            default_table_cols: 3,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }
}
