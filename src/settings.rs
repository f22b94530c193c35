//! Game settings
//!
//! Loaded from a JSON file. Every field has a default, so partial files are fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// Game difficulty / mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Whether a moving platform changes the ball's vx on catch
    pub fn slicing_enabled(&self) -> bool {
        match self {
            Difficulty::Easy => false,
            Difficulty::Normal => true,
            Difficulty::Hard => true,
        }
    }

    /// Whether the blocker is in play
    pub fn blocker_enabled(&self) -> bool {
        match self {
            Difficulty::Easy => false,
            Difficulty::Normal => false,
            Difficulty::Hard => true,
        }
    }
}

/// Heuristic constants of the landing predictor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorTuning {
    /// Event times at or below this count as already happened
    pub time_epsilon: f32,
    /// Blocker contact this close to a vertical edge also flips vx
    pub edge_margin: f32,
    /// Inward offset applied after a resolved event
    pub nudge: f32,
    /// Upper bound on simulated events per prediction
    pub max_iterations: u32,
    /// Blocker displacement under this keeps the previous speed estimate
    pub blocker_dead_band: f32,
}

impl Default for PredictorTuning {
    fn default() -> Self {
        Self {
            time_epsilon: PREDICT_TIME_EPSILON,
            edge_margin: BLOCKER_EDGE_MARGIN,
            nudge: PREDICT_NUDGE,
            max_iterations: PREDICT_MAX_ITERATIONS,
            blocker_dead_band: BLOCKER_DEAD_BAND,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Game mode
    pub difficulty: Difficulty,
    /// Points that end the match
    pub game_over_score: u32,
    /// Serve speed on each axis
    pub init_speed: f32,
    /// Seed for forced serves and blocker placement
    pub seed: u64,

    // === Round pacing ===
    /// Frame at which an idle serving side is served for
    pub serve_timeout_frames: u64,
    /// Frames since serve between speed escalations
    pub speed_up_interval: u64,
    /// Ball speed on either axis above this is a draw
    pub draw_speed: f32,

    // === Controllers ===
    pub predictor: PredictorTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            game_over_score: DEFAULT_GAME_OVER_SCORE,
            init_speed: BALL_INIT_SPEED,
            seed: 0,

            serve_timeout_frames: SERVE_TIMEOUT_FRAMES,
            speed_up_interval: SPEED_UP_INTERVAL,
            draw_speed: DRAW_BALL_SPEED,

            predictor: PredictorTuning::default(),
        }
    }
}

impl Settings {
    /// Create settings for a difficulty (other fields default)
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file
    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Read settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Using default settings ({}: {})", path.display(), err);
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
