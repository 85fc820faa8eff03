use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections fall back to their
    /// defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config = serde_json::from_str(raw)?;
        Ok(config)
    }
}

/// Tunables for classification and repetition counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// A winning template score must be strictly above this to be accepted.
    pub acceptance_threshold: f32,
    /// A joint counts as visible only when its visibility is strictly above
    /// this value.
    pub visibility_floor: f32,
    /// Raw frames required before any signal extraction is attempted.
    pub min_frames: usize,
    /// Extracted signal points required before extremum detection runs.
    pub min_signal_points: usize,
    /// Frame rate assumed when converting a hold into seconds.
    pub assumed_fps: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.6,
            visibility_floor: 0.5,
            min_frames: 10,
            min_signal_points: 5,
            assumed_fps: 30,
        }
    }
}

/// Controls how much of a sequence is handed to the critique provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Keep every `stride`-th frame.
    pub stride: usize,
    pub max_frames: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            stride: 5,
            max_frames: 20,
        }
    }
}
