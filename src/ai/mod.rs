//! Controller-side logic
//!
//! Nothing in here touches `GameState`; everything works from `Snapshot`s.

pub mod controller;
pub mod estimator;
pub mod predict;

pub use controller::{Controller, ControllerCommand, TrackingController};
pub use estimator::BlockerSpeedEstimator;
pub use predict::{
    FallbackCause, NoPredictionCause, Prediction, SimEvent, Trace, predict_landing,
    predict_landing_for, trace_landing,
};
