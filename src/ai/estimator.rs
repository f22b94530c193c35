//! Blocker speed estimation from consecutive snapshots
//!
//! Snapshots carry the blocker position only. The estimator differences
//! successive x readings and snaps the result to the nominal speed, keeping
//! the previous estimate when the displacement is inside the dead band.

use glam::Vec2;

use crate::consts::{BLOCKER_DEAD_BAND, BLOCKER_SPEED};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockerSpeedEstimator {
    prev_x: Option<f32>,
    speed: f32,
    dead_band: f32,
}

impl Default for BlockerSpeedEstimator {
    fn default() -> Self {
        Self::new(BLOCKER_DEAD_BAND)
    }
}

impl BlockerSpeedEstimator {
    pub fn new(dead_band: f32) -> Self {
        Self {
            prev_x: None,
            speed: 0.0,
            dead_band,
        }
    }

    /// Feed this frame's blocker position and return the current estimate
    pub fn observe(&mut self, blocker: Option<Vec2>) -> f32 {
        let Some(pos) = blocker else {
            self.reset();
            return self.speed;
        };

        if let Some(prev_x) = self.prev_x {
            let dx = pos.x - prev_x;
            if dx > self.dead_band {
                self.speed = BLOCKER_SPEED;
            } else if dx < -self.dead_band {
                self.speed = -BLOCKER_SPEED;
            }
        }
        self.prev_x = Some(pos.x);
        self.speed
    }

    /// Forget history (new round)
    pub fn reset(&mut self) {
        self.prev_x = None;
        self.speed = 0.0;
    }
}
