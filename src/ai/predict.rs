//! Landing prediction
//!
//! Forward event simulation from a single snapshot. Instead of stepping frame
//! by frame, the simulated ball jumps straight to the earliest of three
//! events (catching plane, side wall, blocker face), resolves it, and repeats
//! until it reaches the plane or runs out of iterations.
//!
//! The predictor is a pure function of its inputs. It reads nothing but the
//! snapshot and owns nothing but its local simulated ball and blocker, so any
//! number of controllers may call it at any time.

use glam::Vec2;

use crate::consts::*;
use crate::error::PredictError;
use crate::settings::PredictorTuning;
use crate::sim::{Side, Snapshot, blocker_overlaps, catch_plane, near_blocker_edge};
use crate::{clamp_platform_center, platform_center};

/// Why a prediction fell back to the platform's current center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackCause {
    /// Snapshot carries no ball velocity
    MissingVelocity,
    /// No finite event time, or iteration cap reached
    UnresolvedSimulation,
}

/// Why there is nothing to predict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPredictionCause {
    /// Ball is not heading toward the requesting side's plane
    WrongDirection,
    /// Ball has no vertical speed
    ZeroVerticalVelocity,
}

/// Predictor output
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    /// Platform-center x at which the ball reaches the plane
    Landing(f32),
    /// Prediction failed; the requesting platform's current center
    Fallback { center_x: f32, cause: FallbackCause },
    /// Nothing to predict
    NoPrediction(NoPredictionCause),
}

impl Prediction {
    /// Numeric target for a controller (landing or fallback center)
    pub fn target(&self) -> Option<f32> {
        match *self {
            Prediction::Landing(x) => Some(x),
            Prediction::Fallback { center_x, .. } => Some(center_x),
            Prediction::NoPrediction(_) => None,
        }
    }

    /// Only a successful landing
    pub fn landing(&self) -> Option<f32> {
        match *self {
            Prediction::Landing(x) => Some(x),
            _ => None,
        }
    }
}

/// A resolved event of the forward simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    PlaneReached { pos: Vec2 },
    /// `vel` is the velocity after the bounce
    WallHit { pos: Vec2, vel: Vec2 },
    BlockerHit { pos: Vec2, vel: Vec2, side_hit: bool },
    /// Reached the blocker's face height beside it
    BlockerMissed { pos: Vec2 },
}

/// Prediction plus the events that led to it
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub prediction: Prediction,
    pub events: Vec<SimEvent>,
}

/// Predict where `side` should put its platform center to catch the ball.
///
/// `blocker_speed` is the caller's estimate of the blocker's signed x speed;
/// `None` treats the blocker as static.
pub fn predict_landing(
    snapshot: &Snapshot,
    side: Side,
    blocker_speed: Option<f32>,
    tuning: &PredictorTuning,
) -> Prediction {
    simulate(snapshot, side, blocker_speed, tuning, |_| {})
}

/// `predict_landing` for a side given by name ("1P" / "2P")
pub fn predict_landing_for(
    snapshot: &Snapshot,
    side: &str,
    blocker_speed: Option<f32>,
    tuning: &PredictorTuning,
) -> Result<Prediction, PredictError> {
    let side: Side = side.parse()?;
    Ok(predict_landing(snapshot, side, blocker_speed, tuning))
}

/// Same simulation as `predict_landing`, recording every resolved event
pub fn trace_landing(
    snapshot: &Snapshot,
    side: Side,
    blocker_speed: Option<f32>,
    tuning: &PredictorTuning,
) -> Trace {
    let mut events = Vec::new();
    let prediction = simulate(snapshot, side, blocker_speed, tuning, |event| {
        events.push(event)
    });
    Trace { prediction, events }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Plane,
    Wall,
    Blocker,
}

#[derive(Debug, Clone, Copy)]
struct SimBall {
    pos: Vec2,
    vel: Vec2,
}

#[derive(Debug, Clone, Copy)]
struct SimBlocker {
    pos: Vec2,
    vel_x: f32,
}

impl SimBlocker {
    /// Same edge rule as the real blocker, applied over `dt`
    fn advance(&mut self, dt: f32) {
        let max_x = FIELD_WIDTH - BLOCKER_WIDTH;
        let x = self.pos.x + self.vel_x * dt;
        if x <= 0.0 || x >= max_x {
            self.vel_x = -self.vel_x;
        }
        self.pos.x = x.clamp(0.0, max_x);
    }
}

fn time_to_plane(ball: &SimBall, plane: f32, epsilon: f32) -> Option<f32> {
    if ball.vel.y == 0.0 {
        return None;
    }
    let dt = (plane - ball.pos.y) / ball.vel.y;
    (dt > -epsilon).then(|| dt.max(0.0))
}

fn time_to_wall(ball: &SimBall, epsilon: f32) -> Option<f32> {
    let dt = if ball.vel.x > 0.0 {
        (FIELD_WIDTH - BALL_SIZE - ball.pos.x) / ball.vel.x
    } else if ball.vel.x < 0.0 {
        -ball.pos.x / ball.vel.x
    } else {
        return None;
    };
    (dt > epsilon).then_some(dt)
}

fn time_to_blocker(ball: &SimBall, blocker: Option<&SimBlocker>, epsilon: f32) -> Option<f32> {
    let blocker = blocker?;
    let top = blocker.pos.y;
    let bottom = top + BLOCKER_HEIGHT;
    let face = if ball.vel.y > 0.0 && ball.pos.y < bottom {
        top - BALL_SIZE
    } else if ball.vel.y < 0.0 && ball.pos.y > top {
        bottom
    } else {
        return None;
    };
    let dt = (face - ball.pos.y) / ball.vel.y;
    (dt > epsilon).then_some(dt)
}

/// Earliest finite event; ties go to plane, then wall, then blocker
fn next_event(
    ball: &SimBall,
    plane: f32,
    blocker: Option<&SimBlocker>,
    epsilon: f32,
) -> Option<(Event, f32)> {
    let candidates = [
        (Event::Plane, time_to_plane(ball, plane, epsilon)),
        (Event::Wall, time_to_wall(ball, epsilon)),
        (Event::Blocker, time_to_blocker(ball, blocker, epsilon)),
    ];

    let mut best: Option<(Event, f32)> = None;
    for (event, dt) in candidates {
        let Some(dt) = dt.filter(|dt| dt.is_finite()) else {
            continue;
        };
        match best {
            Some((_, best_dt)) if best_dt <= dt => {}
            _ => best = Some((event, dt)),
        }
    }
    best
}

fn simulate(
    snapshot: &Snapshot,
    side: Side,
    blocker_speed: Option<f32>,
    tuning: &PredictorTuning,
    mut on_event: impl FnMut(SimEvent),
) -> Prediction {
    let platform = snapshot.platform(side);
    let center_x = platform_center(platform.x);
    let fallback = |cause| Prediction::Fallback { center_x, cause };

    let Some(vel) = snapshot.ball_velocity else {
        return fallback(FallbackCause::MissingVelocity);
    };
    if vel.y == 0.0 {
        return Prediction::NoPrediction(NoPredictionCause::ZeroVerticalVelocity);
    }
    let approaching = match side {
        Side::OneP => vel.y > 0.0,
        Side::TwoP => vel.y < 0.0,
    };
    if !approaching {
        return Prediction::NoPrediction(NoPredictionCause::WrongDirection);
    }

    let plane = catch_plane(side, platform.y);
    let mut ball = SimBall {
        pos: snapshot.ball,
        vel,
    };
    let mut blocker = snapshot.blocker.map(|pos| SimBlocker {
        pos,
        vel_x: blocker_speed.unwrap_or(0.0),
    });

    for _ in 0..tuning.max_iterations {
        let Some((event, dt)) = next_event(&ball, plane, blocker.as_ref(), tuning.time_epsilon)
        else {
            log::trace!("{} prediction stuck at {:?} {:?}", side, ball.pos, ball.vel);
            return fallback(FallbackCause::UnresolvedSimulation);
        };

        ball.pos += ball.vel * dt;
        if let Some(blocker) = blocker.as_mut() {
            blocker.advance(dt);
        }

        match event {
            Event::Plane => {
                on_event(SimEvent::PlaneReached { pos: ball.pos });
                return Prediction::Landing(clamp_platform_center(ball.pos.x + BALL_SIZE / 2.0));
            }
            Event::Wall => {
                ball.pos.x = if ball.vel.x < 0.0 {
                    tuning.nudge
                } else {
                    FIELD_WIDTH - BALL_SIZE - tuning.nudge
                };
                ball.vel.x = -ball.vel.x;
                on_event(SimEvent::WallHit {
                    pos: ball.pos,
                    vel: ball.vel,
                });
            }
            Event::Blocker => {
                // Only scheduled while a blocker exists
                let Some(blocker) = blocker.as_ref() else {
                    continue;
                };
                if blocker_overlaps(blocker.pos.x, ball.pos.x) {
                    let side_hit = near_blocker_edge(blocker.pos.x, ball.pos.x, tuning.edge_margin);
                    if side_hit {
                        ball.vel.x = -ball.vel.x;
                    }
                    ball.vel.y = -ball.vel.y;
                    let hit_pos = ball.pos;
                    ball.pos += ball.vel * tuning.nudge;
                    on_event(SimEvent::BlockerHit {
                        pos: hit_pos,
                        vel: ball.vel,
                        side_hit,
                    });
                } else {
                    on_event(SimEvent::BlockerMissed { pos: ball.pos });
                }
            }
        }
    }

    log::trace!(
        "{} prediction hit the {} iteration cap",
        side,
        tuning.max_iterations
    );
    fallback(FallbackCause::UnresolvedSimulation)
}
