//! Collision detection and response
//!
//! Everything is axis-aligned: the ball is a 5x5 box, contacts are detected as
//! plane crossings between the previous and current position. Candidate
//! contacts in one tick are resolved independently in a fixed order (walls,
//! 1P platform, 2P platform, blocker). That is not physically exact, but it is
//! deterministic and the predictor mirrors it.

use glam::Vec2;

use super::state::{Ball, Blocker, Platform, Side};
use crate::consts::*;

/// How the ball met the blocker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockerContact {
    /// Top or bottom face; only vy flips
    Face,
    /// Within the edge margin of a vertical edge; vx flips as well
    Side,
}

/// Contacts resolved during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub wall: bool,
    pub platform: Option<Side>,
    pub blocker: Option<BlockerContact>,
}

impl Contacts {
    pub fn any(&self) -> bool {
        self.wall || self.platform.is_some() || self.blocker.is_some()
    }
}

/// Reflect off the left/right walls and clamp inside the field
///
/// A ball already sitting on a wall and moving away from it is left alone, so
/// a boundary position never bounces twice.
pub fn bounce_off_walls(pos: &mut Vec2, vel: &mut Vec2) -> bool {
    let max_x = FIELD_WIDTH - BALL_SIZE;
    let hit = (pos.x <= 0.0 && vel.x < 0.0) || (pos.x >= max_x && vel.x > 0.0);
    if hit {
        vel.x = -vel.x;
    }
    pos.x = pos.x.clamp(0.0, max_x);
    hit
}

/// Whether a ball at `ball_x` overlaps a blocker whose left edge is `blocker_x`
#[inline]
pub fn blocker_overlaps(blocker_x: f32, ball_x: f32) -> bool {
    blocker_x - BALL_SIZE < ball_x && ball_x < blocker_x + BLOCKER_WIDTH
}

/// Approximate side/corner hit: contact within `margin` of a vertical edge.
///
/// Heuristic, not true edge collision; controllers are tuned against it.
#[inline]
pub fn near_blocker_edge(blocker_x: f32, ball_x: f32, margin: f32) -> bool {
    (ball_x - (blocker_x - BALL_SIZE)).abs() < margin
        || (ball_x - (blocker_x + BLOCKER_WIDTH)).abs() < margin
}

/// New vx after a platform catch when slicing is on
///
/// A still platform restores a diagonal (|vx| = |vy|), moving with the ball
/// speeds it up, moving against it sends the ball back the way it came.
pub fn slice_ball(vx: f32, vy: f32, platform_shift: f32) -> f32 {
    if platform_shift == 0.0 {
        vy.abs().copysign(vx)
    } else if vx * platform_shift > 0.0 {
        vx + SLICE_SPEED_BONUS.copysign(vx)
    } else {
        -vx
    }
}

impl Ball {
    /// Resolve this tick's contacts in fixed order
    ///
    /// `edge_margin` is the blocker side-hit band; the predictor must be given
    /// the same value to stay in step with the world.
    pub fn resolve_collisions(
        &mut self,
        platform_1p: &Platform,
        platform_2p: &Platform,
        blocker: Option<&Blocker>,
        slicing: bool,
        edge_margin: f32,
    ) -> Contacts {
        let mut contacts = Contacts {
            wall: bounce_off_walls(&mut self.pos, &mut self.vel),
            ..Default::default()
        };

        for platform in [platform_1p, platform_2p] {
            if self.catch_on(platform, slicing) {
                contacts.platform = Some(platform.side);
            }
        }

        if let Some(blocker) = blocker {
            contacts.blocker = self.bounce_off_blocker(blocker, edge_margin);
        }

        contacts
    }

    /// Catch on `platform` if the ball crossed its plane within its extent
    fn catch_on(&mut self, platform: &Platform, slicing: bool) -> bool {
        let plane = platform.catch_plane();
        let crossed = match platform.side {
            Side::OneP => self.vel.y > 0.0 && self.prev_pos.y <= plane && self.pos.y >= plane,
            Side::TwoP => self.vel.y < 0.0 && self.prev_pos.y >= plane && self.pos.y <= plane,
        };
        if !crossed || !platform.covers(self.pos.x) {
            return false;
        }

        self.pos.y = plane;
        self.vel.y = -self.vel.y;
        if slicing {
            self.vel.x = slice_ball(self.vel.x, self.vel.y, platform.shift);
        }
        true
    }

    /// Bounce off the blocker's near face
    fn bounce_off_blocker(&mut self, blocker: &Blocker, edge_margin: f32) -> Option<BlockerContact> {
        let top = blocker.top_plane();
        let bottom = blocker.bottom_plane();
        let plane = if self.vel.y > 0.0 && self.prev_pos.y <= top && self.pos.y >= top {
            top
        } else if self.vel.y < 0.0 && self.prev_pos.y >= bottom && self.pos.y <= bottom {
            bottom
        } else {
            return None;
        };

        if !blocker_overlaps(blocker.pos.x, self.pos.x) {
            return None;
        }

        let side_hit = near_blocker_edge(blocker.pos.x, self.pos.x, edge_margin);
        self.pos.y = plane;
        self.vel.y = -self.vel.y;
        if side_hit {
            self.vel.x = -self.vel.x;
            Some(BlockerContact::Side)
        } else {
            Some(BlockerContact::Face)
        }
    }
}
