//! Controllers driving one platform each from snapshots

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::estimator::BlockerSpeedEstimator;
use super::predict::predict_landing;
use crate::consts::FIELD_WIDTH;
use crate::settings::PredictorTuning;
use crate::sim::{GameStatus, PlatformAction, Side, Snapshot};

/// Follow a predicted landing point within this distance
const TRACK_TOLERANCE: f32 = 3.0;
/// Return to the field center within this distance
const CENTER_TOLERANCE: f32 = 5.0;

/// Reply from a controller for one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCommand {
    Act(PlatformAction),
    /// Start the next round (only honored once a round has ended)
    Reset,
    /// Stop the match
    Quit,
}

impl ControllerCommand {
    /// Platform action for this tick; control requests don't move the platform
    pub fn action(&self) -> PlatformAction {
        match self {
            ControllerCommand::Act(action) => *action,
            _ => PlatformAction::None,
        }
    }
}

/// Something that plays one side.
///
/// Controllers see nothing but the snapshot; any history they need (such as
/// the blocker's direction) they must keep themselves.
pub trait Controller {
    /// Decide on this frame's command
    fn update(&mut self, snapshot: &Snapshot) -> ControllerCommand;

    /// Clear per-round state
    fn reset(&mut self);

    fn name(&self) -> &str;
}

/// Steers its platform center toward the predicted landing point
pub struct TrackingController {
    side: Side,
    name: String,
    rng: Pcg32,
    estimator: BlockerSpeedEstimator,
    tuning: PredictorTuning,
}

impl TrackingController {
    pub fn new(side: Side, seed: u64, tuning: PredictorTuning) -> Self {
        Self {
            side,
            name: format!("tracker-{}", side),
            rng: Pcg32::seed_from_u64(seed),
            estimator: BlockerSpeedEstimator::new(tuning.blocker_dead_band),
            tuning,
        }
    }

    fn serve(&mut self) -> PlatformAction {
        if self.rng.random_bool(0.5) {
            PlatformAction::ServeToLeft
        } else {
            PlatformAction::ServeToRight
        }
    }
}

impl Controller for TrackingController {
    fn update(&mut self, snapshot: &Snapshot) -> ControllerCommand {
        if snapshot.status != GameStatus::Alive {
            return ControllerCommand::Reset;
        }

        if !snapshot.ball_served {
            self.estimator.reset();
            // The non-serving side's serve is ignored by the world
            return ControllerCommand::Act(self.serve());
        }

        let blocker_speed = self.estimator.observe(snapshot.blocker);
        let prediction = predict_landing(snapshot, self.side, Some(blocker_speed), &self.tuning);
        let center = snapshot.platform_center(self.side);

        let action = match prediction.target() {
            Some(target) => steer(center, target, TRACK_TOLERANCE),
            None => steer(center, FIELD_WIDTH / 2.0, CENTER_TOLERANCE),
        };
        ControllerCommand::Act(action)
    }

    fn reset(&mut self) {
        self.estimator.reset();
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn steer(center: f32, target: f32, tolerance: f32) -> PlatformAction {
    if center < target - tolerance {
        PlatformAction::MoveRight
    } else if center > target + tolerance {
        PlatformAction::MoveLeft
    } else {
        PlatformAction::None
    }
}
