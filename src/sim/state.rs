//! Game state and core simulation types
//!
//! Everything a round needs lives here; `tick` drives it and `Snapshot` is the
//! only view handed to controllers.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::PredictError;
use crate::settings::Settings;

/// Version stamped into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

/// Player side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bottom platform
    #[serde(rename = "1P")]
    OneP,
    /// Top platform
    #[serde(rename = "2P")]
    TwoP,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::OneP => "1P",
            Side::TwoP => "2P",
        }
    }

    pub fn opponent(&self) -> Side {
        match self {
            Side::OneP => Side::TwoP,
            Side::TwoP => Side::OneP,
        }
    }

    /// Index into per-side arrays such as the score
    pub fn index(&self) -> usize {
        match self {
            Side::OneP => 0,
            Side::TwoP => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1P" => Ok(Side::OneP),
            "2P" => Ok(Side::TwoP),
            other => Err(PredictError::InvalidSide(other.to_string())),
        }
    }
}

/// Per-tick platform command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlatformAction {
    #[default]
    None,
    MoveLeft,
    MoveRight,
    ServeToLeft,
    ServeToRight,
}

impl PlatformAction {
    /// Parse a command name; anything outside the vocabulary is `None`
    pub fn parse(s: &str) -> Self {
        match s {
            "MOVE_LEFT" => PlatformAction::MoveLeft,
            "MOVE_RIGHT" => PlatformAction::MoveRight,
            "SERVE_TO_LEFT" => PlatformAction::ServeToLeft,
            "SERVE_TO_RIGHT" => PlatformAction::ServeToRight,
            _ => PlatformAction::None,
        }
    }

    pub fn is_serve(&self) -> bool {
        matches!(self, PlatformAction::ServeToLeft | PlatformAction::ServeToRight)
    }
}

/// Round status, recomputed every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[serde(rename = "GAME_ALIVE")]
    Alive,
    #[serde(rename = "GAME_1P_WIN")]
    OnePWins,
    #[serde(rename = "GAME_2P_WIN")]
    TwoPWins,
    #[serde(rename = "GAME_DRAW")]
    Draw,
    /// Match finished (set by the score layer, never by geometry)
    #[serde(rename = "GAME_OVER")]
    Over,
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    /// Position before the last `tick_move`, used for plane crossings
    pub prev_pos: Vec2,
    pub served: bool,
    pub serving_side: Side,
    /// Frame of the most recent serve
    pub served_frame: u64,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

impl Ball {
    pub fn new() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            prev_pos: Vec2::ZERO,
            served: false,
            serving_side: Side::OneP,
            served_frame: 0,
        }
    }

    /// Park the ball on the serving platform, centered horizontally
    pub fn stick_on_platform(&mut self, platform: &Platform) {
        self.pos = Vec2::new(platform.center() - BALL_SIZE / 2.0, platform.catch_plane());
        self.prev_pos = self.pos;
    }

    /// Launch toward the opponent. Non-serve actions are ignored.
    pub fn serve(&mut self, action: PlatformAction, speed: f32, frame: u64) -> bool {
        let vx = match action {
            PlatformAction::ServeToLeft => -speed,
            PlatformAction::ServeToRight => speed,
            _ => return false,
        };
        let vy = match self.serving_side {
            Side::OneP => -speed,
            Side::TwoP => speed,
        };
        self.vel = Vec2::new(vx, vy);
        self.served = true;
        self.served_frame = frame;
        true
    }

    /// Integrate position by one frame of velocity
    pub fn tick_move(&mut self) {
        self.prev_pos = self.pos;
        self.pos += self.vel;
    }

    /// Grow |vx| and |vy| by `step`, keeping signs
    pub fn escalate_speed(&mut self, step: f32) {
        self.vel.x = grow_magnitude(self.vel.x, step);
        self.vel.y = grow_magnitude(self.vel.y, step);
    }

    pub fn frames_since_serve(&self, frame: u64) -> u64 {
        frame.saturating_sub(self.served_frame)
    }

    /// Back to unserved; the other side serves next
    pub fn reset(&mut self) {
        self.serving_side = self.serving_side.opponent();
        self.vel = Vec2::ZERO;
        self.served = false;
        self.served_frame = 0;
    }
}

#[inline]
fn grow_magnitude(v: f32, step: f32) -> f32 {
    if v > 0.0 {
        v + step
    } else if v < 0.0 {
        v - step
    } else {
        v
    }
}

/// A side's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub side: Side,
    /// Top-left corner; y never changes
    pub pos: Vec2,
    /// Signed x shift applied on the last `apply`
    pub shift: f32,
}

impl Platform {
    pub fn new(side: Side) -> Self {
        let (x, y) = match side {
            Side::OneP => PLATFORM_1P_START,
            Side::TwoP => PLATFORM_2P_START,
        };
        Self {
            side,
            pos: Vec2::new(x, y),
            shift: 0.0,
        }
    }

    /// Apply one tick's command. Serve actions don't move the platform.
    ///
    /// `shift` records the displacement actually made, after clamping.
    pub fn apply(&mut self, action: PlatformAction) {
        let step = match action {
            PlatformAction::MoveLeft => -PLATFORM_SHIFT_SPEED,
            PlatformAction::MoveRight => PLATFORM_SHIFT_SPEED,
            _ => 0.0,
        };
        let old_x = self.pos.x;
        self.pos.x = (old_x + step).clamp(0.0, FIELD_WIDTH - PLATFORM_WIDTH);
        self.shift = self.pos.x - old_x;
    }

    pub fn center(&self) -> f32 {
        crate::platform_center(self.pos.x)
    }

    /// Ball y at which this platform catches
    pub fn catch_plane(&self) -> f32 {
        catch_plane(self.side, self.pos.y)
    }

    /// Whether a ball at `x` lies within this platform's horizontal extent
    pub fn covers(&self, x: f32) -> bool {
        x + BALL_SIZE >= self.pos.x && x <= self.pos.x + PLATFORM_WIDTH
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.side);
    }
}

/// Catching plane of `side` for a platform whose top edge is at `platform_y`
pub fn catch_plane(side: Side, platform_y: f32) -> f32 {
    match side {
        Side::OneP => platform_y - BALL_SIZE,
        Side::TwoP => platform_y + PLATFORM_HEIGHT,
    }
}

/// The moving obstacle in the middle of the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blocker {
    /// Top-left corner; y never changes
    pub pos: Vec2,
    /// Always ±BLOCKER_SPEED
    pub vel_x: f32,
}

impl Blocker {
    /// Spawn at a random slot with a random direction
    pub fn spawn(rng: &mut Pcg32) -> Self {
        let slot = rng.random_range(0..BLOCKER_SPAWN_SLOTS);
        let vel_x = if rng.random_bool(0.5) {
            BLOCKER_SPEED
        } else {
            -BLOCKER_SPEED
        };
        Self {
            pos: Vec2::new((slot * BLOCKER_SPAWN_STEP) as f32, BLOCKER_Y),
            vel_x,
        }
    }

    /// Advance by the current speed, reflecting at the field edges
    pub fn tick_move(&mut self) {
        let max_x = FIELD_WIDTH - BLOCKER_WIDTH;
        self.pos.x += self.vel_x;
        if self.pos.x <= 0.0 || self.pos.x >= max_x {
            self.pos.x = self.pos.x.clamp(0.0, max_x);
            self.vel_x = -self.vel_x;
        }
    }

    /// Ball y when touching the top face from above
    pub fn top_plane(&self) -> f32 {
        self.pos.y - BALL_SIZE
    }

    /// Ball y when touching the bottom face from below
    pub fn bottom_plane(&self) -> f32 {
        self.pos.y + BLOCKER_HEIGHT
    }
}

/// Read-only per-tick view handed to controllers and the predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "snapshot_version")]
    pub version: u32,
    pub frame: u64,
    pub status: GameStatus,
    pub ball: Vec2,
    #[serde(rename = "ball_speed", default)]
    pub ball_velocity: Option<Vec2>,
    pub ball_served: bool,
    pub serving_side: Side,
    #[serde(rename = "platform_1P")]
    pub platform_1p: Vec2,
    #[serde(rename = "platform_2P")]
    pub platform_2p: Vec2,
    #[serde(default)]
    pub blocker: Option<Vec2>,
}

fn snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Snapshot {
    /// Top-left corner of `side`'s platform
    pub fn platform(&self, side: Side) -> Vec2 {
        match side {
            Side::OneP => self.platform_1p,
            Side::TwoP => self.platform_2p,
        }
    }

    pub fn platform_center(&self, side: Side) -> f32 {
        crate::platform_center(self.platform(side).x)
    }
}

/// Complete game state (deterministic for a given seed and command stream)
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Frames since the last reset
    pub frame: u64,
    pub status: GameStatus,
    pub ball: Ball,
    pub platform_1p: Platform,
    pub platform_2p: Platform,
    /// Absent unless the mode enables it
    pub blocker: Option<Blocker>,
    /// Points as [1P, 2P]
    pub score: [u32; 2],
    rng: Pcg32,
}

impl GameState {
    pub fn new(settings: Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let blocker = settings
            .difficulty
            .blocker_enabled()
            .then(|| Blocker::spawn(&mut rng));
        let mut state = Self {
            settings,
            frame: 0,
            status: GameStatus::Alive,
            ball: Ball::new(),
            platform_1p: Platform::new(Side::OneP),
            platform_2p: Platform::new(Side::TwoP),
            blocker,
            score: [0, 0],
            rng,
        };
        state.stick_ball();
        state
    }

    /// Keep the unserved ball on the serving platform
    pub fn stick_ball(&mut self) {
        let platform = match self.ball.serving_side {
            Side::OneP => &self.platform_1p,
            Side::TwoP => &self.platform_2p,
        };
        self.ball.stick_on_platform(platform);
    }

    /// Draw a serve direction for an idle serving side
    pub(crate) fn random_serve(&mut self) -> PlatformAction {
        if self.rng.random_bool(0.5) {
            PlatformAction::ServeToLeft
        } else {
            PlatformAction::ServeToRight
        }
    }

    /// Start a new round; the score is kept
    pub fn reset(&mut self) {
        log::info!("reset pingpong");
        self.frame = 0;
        self.status = GameStatus::Alive;
        self.ball.reset();
        self.platform_1p.reset();
        self.platform_2p.reset();
        if self.blocker.is_some() {
            self.blocker = Some(Blocker::spawn(&mut self.rng));
        }
        self.stick_ball();
    }

    pub fn is_running(&self) -> bool {
        self.status != GameStatus::Over
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            frame: self.frame,
            status: self.status,
            ball: self.ball.pos,
            ball_velocity: Some(self.ball.vel),
            ball_served: self.ball.served,
            serving_side: self.ball.serving_side,
            platform_1p: self.platform_1p.pos,
            platform_2p: self.platform_2p.pos,
            blocker: self.blocker.as_ref().map(|b| b.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;
    use proptest::prelude::*;

    #[test]
    fn test_side_parsing() {
        assert_eq!("1P".parse::<Side>(), Ok(Side::OneP));
        assert_eq!("2P".parse::<Side>(), Ok(Side::TwoP));
        assert_eq!(
            "3P".parse::<Side>(),
            Err(PredictError::InvalidSide("3P".to_string()))
        );
    }

    #[test]
    fn test_unknown_command_is_none() {
        assert_eq!(PlatformAction::parse("MOVE_LEFT"), PlatformAction::MoveLeft);
        assert_eq!(PlatformAction::parse("SERVE_TO_RIGHT"), PlatformAction::ServeToRight);
        assert_eq!(PlatformAction::parse("JUMP"), PlatformAction::None);
        assert_eq!(PlatformAction::parse(""), PlatformAction::None);
    }

    #[test]
    fn test_serve_direction() {
        let mut ball = Ball::new();
        assert!(ball.serve(PlatformAction::ServeToLeft, 7.0, 12));
        assert_eq!(ball.vel, Vec2::new(-7.0, -7.0));
        assert_eq!(ball.served_frame, 12);

        let mut ball = Ball::new();
        ball.serving_side = Side::TwoP;
        assert!(ball.serve(PlatformAction::ServeToRight, 7.0, 3));
        assert_eq!(ball.vel, Vec2::new(7.0, 7.0));

        let mut ball = Ball::new();
        assert!(!ball.serve(PlatformAction::MoveLeft, 7.0, 3));
        assert!(!ball.served);
    }

    #[test]
    fn test_escalate_speed_keeps_sign() {
        let mut ball = Ball::new();
        ball.vel = Vec2::new(-7.0, 9.0);
        ball.escalate_speed(1.0);
        assert_eq!(ball.vel, Vec2::new(-8.0, 10.0));
    }

    #[test]
    fn test_stick_on_platform() {
        let mut ball = Ball::new();
        let p1 = Platform::new(Side::OneP);
        ball.stick_on_platform(&p1);
        assert_eq!(ball.pos, Vec2::new(97.5, 415.0));

        let p2 = Platform::new(Side::TwoP);
        ball.stick_on_platform(&p2);
        assert_eq!(ball.pos, Vec2::new(97.5, 80.0));
    }

    #[test]
    fn test_platform_moves_and_clamps() {
        let mut platform = Platform::new(Side::OneP);
        platform.apply(PlatformAction::MoveLeft);
        assert_eq!(platform.pos.x, 75.0);
        assert_eq!(platform.shift, -5.0);

        platform.apply(PlatformAction::ServeToLeft);
        assert_eq!(platform.pos.x, 75.0);
        assert_eq!(platform.shift, 0.0);

        platform.pos.x = 0.0;
        platform.apply(PlatformAction::MoveLeft);
        assert_eq!(platform.pos.x, 0.0);
        assert_eq!(platform.shift, 0.0);

        platform.pos.x = 158.0;
        platform.apply(PlatformAction::MoveRight);
        assert_eq!(platform.pos.x, 160.0);
        // Clamped move: only the real displacement counts for slicing
        assert_eq!(platform.shift, 2.0);

        platform.apply(PlatformAction::MoveRight);
        assert_eq!(platform.pos.x, 160.0);
        assert_eq!(platform.shift, 0.0);
    }

    #[test]
    fn test_blocker_reflects_at_bound() {
        let mut blocker = Blocker {
            pos: Vec2::new(5.0, BLOCKER_Y),
            vel_x: -BLOCKER_SPEED,
        };
        blocker.tick_move();
        assert_eq!(blocker.pos.x, 0.0);
        assert_eq!(blocker.vel_x, BLOCKER_SPEED);
        blocker.tick_move();
        assert_eq!(blocker.pos.x, 5.0);

        let mut blocker = Blocker {
            pos: Vec2::new(168.0, BLOCKER_Y),
            vel_x: BLOCKER_SPEED,
        };
        blocker.tick_move();
        assert_eq!(blocker.pos.x, 170.0);
        assert_eq!(blocker.vel_x, -BLOCKER_SPEED);
    }

    #[test]
    fn test_blocker_spawn_slots() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let blocker = Blocker::spawn(&mut rng);
            assert!(blocker.pos.x >= 0.0 && blocker.pos.x <= 160.0);
            assert_eq!(blocker.pos.x % 20.0, 0.0);
            assert_eq!(blocker.vel_x.abs(), BLOCKER_SPEED);
        }
    }

    #[test]
    fn test_blocker_only_in_hard() {
        let easy = GameState::new(Settings::from_difficulty(Difficulty::Easy));
        assert!(easy.blocker.is_none());
        assert!(easy.snapshot().blocker.is_none());

        let hard = GameState::new(Settings::from_difficulty(Difficulty::Hard));
        assert!(hard.blocker.is_some());
        assert_eq!(hard.snapshot().blocker.unwrap().y, BLOCKER_Y);
    }

    #[test]
    fn test_reset_alternates_serving_side() {
        let mut state = GameState::new(Settings::default());
        assert_eq!(state.ball.serving_side, Side::OneP);
        state.reset();
        assert_eq!(state.ball.serving_side, Side::TwoP);
        assert_eq!(state.ball.pos.y, PLATFORM_2P_START.1 + PLATFORM_HEIGHT);
        state.reset();
        assert_eq!(state.ball.serving_side, Side::OneP);
    }

    #[test]
    fn test_snapshot_json_keys() {
        let state = GameState::new(Settings::from_difficulty(Difficulty::Hard));
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["status"], "GAME_ALIVE");
        assert_eq!(json["serving_side"], "1P");
        assert_eq!(json["platform_1P"], serde_json::json!([80.0, 420.0]));
        assert!(json["ball_speed"].is_array());
        assert!(json["blocker"].is_array());
    }

    #[test]
    fn test_snapshot_without_ball_speed() {
        let json = r#"{
            "frame": 10, "status": "GAME_ALIVE", "ball": [100.0, 250.0],
            "ball_served": true, "serving_side": "2P",
            "platform_1P": [80.0, 420.0], "platform_2P": [80.0, 70.0]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.ball_velocity, None);
        assert_eq!(snapshot.blocker, None);
        assert_eq!(snapshot.serving_side, Side::TwoP);
    }

    proptest! {
        #[test]
        fn platform_stays_in_field(
            start in 0.0f32..=160.0,
            moves in proptest::collection::vec(0u8..5, 1..200)
        ) {
            let mut platform = Platform::new(Side::TwoP);
            platform.pos.x = start;
            for m in moves {
                let action = match m {
                    0 => PlatformAction::MoveLeft,
                    1 => PlatformAction::MoveRight,
                    2 => PlatformAction::ServeToLeft,
                    3 => PlatformAction::ServeToRight,
                    _ => PlatformAction::None,
                };
                platform.apply(action);
                prop_assert!(platform.pos.x >= 0.0);
                prop_assert!(platform.pos.x <= FIELD_WIDTH - PLATFORM_WIDTH);
                prop_assert_eq!(platform.pos.y, PLATFORM_2P_START.1);
            }
        }
    }
}
