//! Fixed-step simulation tick
//!
//! Per tick: commands -> platforms -> blocker -> ball (serve or move, then
//! collisions) -> status. `update` layers round and match bookkeeping on top.

use std::fmt;

use super::state::{Ball, GameState, GameStatus, Platform, PlatformAction, Side};
use crate::consts::*;

/// Commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub action_1p: PlatformAction,
    pub action_2p: PlatformAction,
}

impl TickInput {
    pub fn new(action_1p: PlatformAction, action_2p: PlatformAction) -> Self {
        Self {
            action_1p,
            action_2p,
        }
    }

    pub fn action(&self, side: Side) -> PlatformAction {
        match side {
            Side::OneP => self.action_1p,
            Side::TwoP => self.action_2p,
        }
    }
}

/// What the driver should do after `update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Round still running
    Continue,
    /// Round ended; call `GameState::reset` before the next tick
    Reset,
    /// Match over
    Quit,
}

/// Final match score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Points as [1P, 2P]
    pub score: [u32; 2],
}

impl MatchResult {
    /// None on a tie
    pub fn winner(&self) -> Option<Side> {
        match self.score[0].cmp(&self.score[1]) {
            std::cmp::Ordering::Greater => Some(Side::OneP),
            std::cmp::Ordering::Less => Some(Side::TwoP),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let winner = self.winner().map_or("No one", |side| side.as_str());
        write!(
            f,
            "{} wins! Final score: {}-{}",
            winner, self.score[0], self.score[1]
        )
    }
}

/// Round status from geometry alone
pub fn evaluate_status(
    ball: &Ball,
    platform_1p: &Platform,
    platform_2p: &Platform,
    draw_speed: f32,
) -> GameStatus {
    if ball.pos.y > platform_1p.pos.y + PLATFORM_HEIGHT {
        GameStatus::TwoPWins
    } else if ball.pos.y + BALL_SIZE < platform_2p.pos.y {
        GameStatus::OnePWins
    } else if ball.vel.x.abs() > draw_speed || ball.vel.y.abs() > draw_speed {
        GameStatus::Draw
    } else {
        GameStatus::Alive
    }
}

/// Advance the world by one frame and return the new round status
pub fn tick(state: &mut GameState, input: &TickInput) -> GameStatus {
    if !state.is_running() {
        return state.status;
    }

    state.frame += 1;
    state.platform_1p.apply(input.action_1p);
    state.platform_2p.apply(input.action_2p);
    if let Some(blocker) = state.blocker.as_mut() {
        blocker.tick_move();
    }

    if state.ball.served {
        move_ball(state);
    } else {
        wait_for_serve(state, input);
    }

    state.status = evaluate_status(
        &state.ball,
        &state.platform_1p,
        &state.platform_2p,
        state.settings.draw_speed,
    );
    state.status
}

fn wait_for_serve(state: &mut GameState, input: &TickInput) {
    state.stick_ball();

    let mut action = input.action(state.ball.serving_side);
    if state.frame >= state.settings.serve_timeout_frames && !action.is_serve() {
        action = state.random_serve();
        log::debug!(
            "{} idle for {} frames, serving {:?}",
            state.ball.serving_side,
            state.frame,
            action
        );
    }

    state
        .ball
        .serve(action, state.settings.init_speed, state.frame);
}

fn move_ball(state: &mut GameState) {
    let interval = state.settings.speed_up_interval;
    if interval > 0 && state.ball.frames_since_serve(state.frame) % interval == 0 {
        state.ball.escalate_speed(BALL_SPEED_UP_STEP);
        log::debug!("speed up to {:?} at frame {}", state.ball.vel, state.frame);
    }

    state.ball.tick_move();
    let slicing = state.settings.difficulty.slicing_enabled();
    let contacts = state.ball.resolve_collisions(
        &state.platform_1p,
        &state.platform_2p,
        state.blocker.as_ref(),
        slicing,
        state.settings.predictor.edge_margin,
    );
    if contacts.any() {
        log::trace!("frame {} contacts {:?}", state.frame, contacts);
    }
}

/// Tick, then score a finished round and decide between reset and quit
pub fn update(state: &mut GameState, input: &TickInput) -> TickOutcome {
    if !state.is_running() {
        return TickOutcome::Quit;
    }

    let status = tick(state, input);
    match status {
        GameStatus::Alive => return TickOutcome::Continue,
        GameStatus::OnePWins => state.score[Side::OneP.index()] += 1,
        GameStatus::TwoPWins => state.score[Side::TwoP.index()] += 1,
        GameStatus::Draw => {
            state.score[0] += 1;
            state.score[1] += 1;
        }
        GameStatus::Over => return TickOutcome::Quit,
    }
    log::info!(
        "round over at frame {}: {:?}, score {}-{}",
        state.frame,
        status,
        state.score[0],
        state.score[1]
    );

    let target = state.settings.game_over_score;
    if state.score.iter().any(|&points| points >= target) {
        state.status = GameStatus::Over;
        log::info!("{}", state.result());
        TickOutcome::Quit
    } else {
        TickOutcome::Reset
    }
}

impl GameState {
    pub fn result(&self) -> MatchResult {
        MatchResult { score: self.score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, Settings};
    use crate::sim::Blocker;
    use glam::Vec2;

    fn serve_1p_left() -> TickInput {
        TickInput::new(PlatformAction::ServeToLeft, PlatformAction::None)
    }

    fn playing_state(difficulty: Difficulty, pos: Vec2, vel: Vec2) -> GameState {
        let mut state = GameState::new(Settings::from_difficulty(difficulty));
        state.blocker = None;
        state.frame = 10;
        state.ball.served = true;
        state.ball.served_frame = state.frame;
        state.ball.pos = pos;
        state.ball.prev_pos = pos;
        state.ball.vel = vel;
        state
    }

    #[test]
    fn test_tick_serve_to_playing() {
        let mut state = GameState::new(Settings::default());
        assert!(!state.ball.served);

        // Tick without serve - should stay on the platform
        tick(&mut state, &TickInput::default());
        assert!(!state.ball.served);
        assert_eq!(state.ball.pos, Vec2::new(97.5, 415.0));

        // The non-serving side can't serve
        tick(
            &mut state,
            &TickInput::new(PlatformAction::None, PlatformAction::ServeToRight),
        );
        assert!(!state.ball.served);

        tick(&mut state, &serve_1p_left());
        assert!(state.ball.served);
        assert_eq!(state.ball.vel, Vec2::new(-7.0, -7.0));
        assert_eq!(state.ball.served_frame, 3);
    }

    #[test]
    fn test_unserved_ball_follows_platform() {
        let mut state = GameState::new(Settings::default());
        tick(
            &mut state,
            &TickInput::new(PlatformAction::MoveRight, PlatformAction::None),
        );
        assert_eq!(state.platform_1p.pos.x, 85.0);
        assert_eq!(state.ball.pos.x, 102.5);
    }

    #[test]
    fn test_forced_serve_after_timeout() {
        let mut state = GameState::new(Settings::default());
        for _ in 0..149 {
            tick(&mut state, &TickInput::default());
        }
        assert!(!state.ball.served);
        tick(&mut state, &TickInput::default());
        assert!(state.ball.served);
        assert_eq!(state.ball.served_frame, SERVE_TIMEOUT_FRAMES);
        assert_eq!(state.ball.vel.x.abs(), BALL_INIT_SPEED);
        assert_eq!(state.ball.vel.y, -BALL_INIT_SPEED);
    }

    #[test]
    fn test_speed_up_on_schedule() {
        let mut state = playing_state(Difficulty::Easy, Vec2::new(50.0, 250.0), Vec2::new(1.0, 1.0));
        for _ in 0..99 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.ball.vel, Vec2::new(1.0, 1.0));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.ball.vel, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_edge_margin_setting_reaches_blocker_collision() {
        let mut state = playing_state(Difficulty::Hard, Vec2::new(78.0, 200.0), Vec2::new(1.0, 7.0));
        state.settings.predictor.edge_margin = 4.0;
        state.blocker = Some(Blocker {
            pos: Vec2::new(85.0, BLOCKER_Y),
            vel_x: 0.0,
        });

        let trace = crate::ai::trace_landing(
            &state.snapshot(),
            Side::OneP,
            Some(0.0),
            &state.settings.predictor,
        );
        let crate::ai::SimEvent::BlockerHit { vel: predicted, side_hit, .. } = trace.events[0] else {
            panic!("expected blocker hit, got {:?}", trace.events[0]);
        };
        assert!(side_hit);

        // Face reached after 5 ticks at x = 83, 3 units from the left edge bound
        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.ball.pos, Vec2::new(83.0, 235.0));
        assert_eq!(state.ball.vel, predicted);
        assert_eq!(state.ball.vel, Vec2::new(-1.0, -7.0));
    }

    #[test]
    fn test_evaluate_status() {
        let p1 = Platform::new(Side::OneP);
        let p2 = Platform::new(Side::TwoP);
        let mut ball = Ball::new();

        ball.pos = Vec2::new(100.0, 250.0);
        ball.vel = Vec2::new(7.0, 7.0);
        assert_eq!(evaluate_status(&ball, &p1, &p2, 40.0), GameStatus::Alive);

        ball.pos.y = 431.0;
        assert_eq!(evaluate_status(&ball, &p1, &p2, 40.0), GameStatus::TwoPWins);

        ball.pos.y = 64.0;
        assert_eq!(evaluate_status(&ball, &p1, &p2, 40.0), GameStatus::OnePWins);

        ball.pos.y = 250.0;
        ball.vel = Vec2::new(41.0, 12.0);
        assert_eq!(evaluate_status(&ball, &p1, &p2, 40.0), GameStatus::Draw);
        ball.vel = Vec2::new(-12.0, -41.0);
        assert_eq!(evaluate_status(&ball, &p1, &p2, 40.0), GameStatus::Draw);
    }

    #[test]
    fn test_round_win_and_reset() {
        let mut state = playing_state(Difficulty::Easy, Vec2::new(10.0, 428.0), Vec2::new(0.0, 7.0));
        let outcome = update(&mut state, &TickInput::default());
        assert_eq!(outcome, TickOutcome::Reset);
        assert_eq!(state.status, GameStatus::TwoPWins);
        assert_eq!(state.score, [0, 1]);

        state.reset();
        assert_eq!(state.status, GameStatus::Alive);
        assert_eq!(state.frame, 0);
        assert_eq!(state.score, [0, 1]);
        assert_eq!(state.ball.serving_side, Side::TwoP);
    }

    #[test]
    fn test_draw_scores_both_and_ends_match() {
        let mut state = playing_state(Difficulty::Easy, Vec2::new(100.0, 250.0), Vec2::new(45.0, 45.0));
        state.settings.game_over_score = 1;
        let outcome = update(&mut state, &TickInput::default());
        assert_eq!(outcome, TickOutcome::Quit);
        assert_eq!(state.status, GameStatus::Over);
        assert_eq!(state.score, [1, 1]);
        assert_eq!(state.result().winner(), None);
        assert_eq!(state.result().to_string(), "No one wins! Final score: 1-1");

        // A finished match stays finished
        assert_eq!(update(&mut state, &TickInput::default()), TickOutcome::Quit);
        assert_eq!(state.frame, 11);
    }

    #[test]
    fn test_match_result_display() {
        let result = MatchResult { score: [3, 1] };
        assert_eq!(result.winner(), Some(Side::OneP));
        assert_eq!(result.to_string(), "1P wins! Final score: 3-1");
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let settings = Settings {
            difficulty: Difficulty::Hard,
            seed: 99999,
            ..Settings::default()
        };
        let mut state1 = GameState::new(settings.clone());
        let mut state2 = GameState::new(settings);

        let inputs = [
            TickInput::default(),
            TickInput::new(PlatformAction::MoveLeft, PlatformAction::MoveRight),
            TickInput::new(PlatformAction::None, PlatformAction::MoveLeft),
        ];
        for i in 0..600 {
            let input = inputs[i % inputs.len()];
            let outcome1 = update(&mut state1, &input);
            let outcome2 = update(&mut state2, &input);
            assert_eq!(outcome1, outcome2);
            assert_eq!(state1.snapshot(), state2.snapshot());
            match outcome1 {
                TickOutcome::Reset => {
                    state1.reset();
                    state2.reset();
                }
                TickOutcome::Quit => break,
                TickOutcome::Continue => {}
            }
        }
    }

    #[test]
    fn test_ball_and_blocker_stay_in_bounds() {
        let settings = Settings {
            difficulty: Difficulty::Hard,
            seed: 4242,
            game_over_score: 50,
            ..Settings::default()
        };
        let mut state = GameState::new(settings);
        let input = TickInput::new(PlatformAction::MoveRight, PlatformAction::MoveLeft);
        for _ in 0..5000 {
            let outcome = update(&mut state, &input);
            assert!(state.ball.pos.x >= 0.0 && state.ball.pos.x <= FIELD_WIDTH - BALL_SIZE);
            let blocker = state.blocker.as_ref().unwrap();
            assert!(blocker.pos.x >= 0.0 && blocker.pos.x <= FIELD_WIDTH - BLOCKER_WIDTH);
            match outcome {
                TickOutcome::Reset => state.reset(),
                TickOutcome::Quit => break,
                TickOutcome::Continue => {}
            }
        }
    }
}
