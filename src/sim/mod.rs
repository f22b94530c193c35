//! Deterministic simulation module
//!
//! All gameplay physics lives here. This module must stay deterministic:
//! - One tick per frame, integer-step velocities
//! - Seeded RNG only (forced serves, blocker spawn)
//! - Fixed collision resolution order
//! - No rendering or transport dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{
    BlockerContact, Contacts, blocker_overlaps, bounce_off_walls, near_blocker_edge, slice_ball,
};
pub use state::{
    Ball, Blocker, GameState, GameStatus, Platform, PlatformAction, SNAPSHOT_VERSION, Side,
    Snapshot, catch_plane,
};
pub use tick::{MatchResult, TickInput, TickOutcome, evaluate_status, tick, update};
