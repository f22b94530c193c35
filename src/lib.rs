//! PingPong - two-player ball-and-platform game with a moving blocker
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinetics, collisions, round status)
//! - `ai`: Landing prediction, blocker-speed estimation and controllers
//! - `runner`: Headless match driver pairing the world with two controllers
//! - `settings`: Data-driven game configuration
//! - `error`: Error types surfaced to callers

pub mod ai;
pub mod error;
pub mod runner;
pub mod settings;
pub mod sim;

pub use error::{PredictError, SettingsError};
pub use settings::{Difficulty, PredictorTuning, Settings};

/// Game configuration constants
pub mod consts {
    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 200.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Ball is a square box, position is its top-left corner
    pub const BALL_SIZE: f32 = 5.0;
    /// Default serve speed on each axis
    pub const BALL_INIT_SPEED: f32 = 7.0;
    /// Added to |vx| and |vy| at every escalation
    pub const BALL_SPEED_UP_STEP: f32 = 1.0;
    /// Frames since serve between escalations
    pub const SPEED_UP_INTERVAL: u64 = 100;
    /// Either axis above this ends the round as a draw
    pub const DRAW_BALL_SPEED: f32 = 40.0;
    /// Frame at which the world serves on behalf of an idle side
    pub const SERVE_TIMEOUT_FRAMES: u64 = 150;

    /// Platform defaults
    pub const PLATFORM_WIDTH: f32 = 40.0;
    pub const PLATFORM_HEIGHT: f32 = 10.0;
    pub const PLATFORM_SHIFT_SPEED: f32 = 5.0;
    pub const PLATFORM_1P_START: (f32, f32) = (80.0, 420.0);
    pub const PLATFORM_2P_START: (f32, f32) = (80.0, 70.0);
    /// Extra |vx| when a moving platform slices the ball along its motion
    pub const SLICE_SPEED_BONUS: f32 = 3.0;

    /// Blocker defaults
    pub const BLOCKER_WIDTH: f32 = 30.0;
    pub const BLOCKER_HEIGHT: f32 = 20.0;
    pub const BLOCKER_Y: f32 = 240.0;
    pub const BLOCKER_SPEED: f32 = 5.0;
    /// Spawn x is drawn from 0, 20, .., 160
    pub const BLOCKER_SPAWN_STEP: u32 = 20;
    pub const BLOCKER_SPAWN_SLOTS: u32 = 9;

    /// Points needed to end the match
    pub const DEFAULT_GAME_OVER_SCORE: u32 = 3;

    /// Predictor heuristics (tuned values, see `PredictorTuning`)
    pub const PREDICT_TIME_EPSILON: f32 = 0.001;
    /// Approximate side/corner hit band around the blocker's vertical edges
    pub const BLOCKER_EDGE_MARGIN: f32 = 1.5;
    pub const PREDICT_NUDGE: f32 = 0.01;
    pub const PREDICT_MAX_ITERATIONS: u32 = 30;
    /// Blocker displacement below this is treated as noise
    pub const BLOCKER_DEAD_BAND: f32 = 2.0;
}

use consts::*;

/// Center x of a platform whose left edge is at `x`
#[inline]
pub fn platform_center(x: f32) -> f32 {
    x + PLATFORM_WIDTH / 2.0
}

/// Clamp a platform-center target into the range a platform can reach
#[inline]
pub fn clamp_platform_center(center: f32) -> f32 {
    let half = PLATFORM_WIDTH / 2.0;
    center.clamp(half, FIELD_WIDTH - half)
}
