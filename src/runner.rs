//! Headless match driver
//!
//! Owns the world and one controller per side. Each step the world publishes
//! a snapshot, both controllers reply, and the world ticks. Once a round has
//! ended the world stops ticking and keeps publishing the final snapshot until
//! both controllers reply RESET; QUIT from either side stops the match.

use crate::ai::{Controller, ControllerCommand};
use crate::settings::Settings;
use crate::sim::{GameState, GameStatus, MatchResult, TickInput, TickOutcome, update};

pub struct Match<A: Controller, B: Controller> {
    pub state: GameState,
    pub controller_1p: A,
    pub controller_2p: B,
    /// Hard stop on runner steps (ticks plus round-boundary waits), if set
    pub step_limit: Option<u64>,
    steps: u64,
    frames_played: u64,
}

impl<A: Controller, B: Controller> Match<A, B> {
    pub fn new(settings: Settings, controller_1p: A, controller_2p: B) -> Self {
        log::info!(
            "new match: {} vs {}, {} to {} points, seed {}",
            controller_1p.name(),
            controller_2p.name(),
            settings.difficulty.as_str(),
            settings.game_over_score,
            settings.seed
        );
        Self {
            state: GameState::new(settings),
            controller_1p,
            controller_2p,
            step_limit: None,
            steps: 0,
            frames_played: 0,
        }
    }

    /// Ticks actually simulated
    pub fn frames_played(&self) -> u64 {
        self.frames_played
    }

    /// Play one step. Returns false once the match is over.
    pub fn step(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }
        if self.step_limit.is_some_and(|limit| self.steps >= limit) {
            log::warn!(
                "step limit reached after {} steps ({} frames)",
                self.steps,
                self.frames_played
            );
            return false;
        }
        self.steps += 1;

        let snapshot = self.state.snapshot();
        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&snapshot) {
                log::trace!("{}", json);
            }
        }

        let command_1p = self.controller_1p.update(&snapshot);
        let command_2p = self.controller_2p.update(&snapshot);
        if self.quit_requested(command_1p, command_2p) {
            return false;
        }

        if snapshot.status != GameStatus::Alive {
            if command_1p == ControllerCommand::Reset && command_2p == ControllerCommand::Reset {
                self.start_next_round();
            }
            return true;
        }

        let input = TickInput::new(command_1p.action(), command_2p.action());
        self.frames_played += 1;
        match update(&mut self.state, &input) {
            TickOutcome::Continue | TickOutcome::Reset => true,
            TickOutcome::Quit => false,
        }
    }

    /// Play until the match ends and return the final score
    pub fn run(&mut self) -> MatchResult {
        while self.step() {}
        self.state.result()
    }

    fn start_next_round(&mut self) {
        self.state.reset();
        self.controller_1p.reset();
        self.controller_2p.reset();
    }

    fn quit_requested(&self, command_1p: ControllerCommand, command_2p: ControllerCommand) -> bool {
        for (command, name) in [
            (command_1p, self.controller_1p.name()),
            (command_2p, self.controller_2p.name()),
        ] {
            if command == ControllerCommand::Quit {
                log::info!("{} quit at frame {}", name, self.state.frame);
                return true;
            }
        }
        false
    }
}
