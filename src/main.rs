//! PingPong entry point
//!
//! Runs a headless match between two tracking controllers.
//! Usage: `pingpong [settings.json]`

use std::path::Path;

use pingpong::ai::TrackingController;
use pingpong::runner::Match;
use pingpong::settings::Settings;
use pingpong::sim::Side;

fn main() {
    env_logger::init();
    log::info!("PingPong (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };

    let tuning = settings.predictor;
    let seed = settings.seed;
    let mut game = Match::new(
        settings,
        TrackingController::new(Side::OneP, seed.wrapping_add(1), tuning),
        TrackingController::new(Side::TwoP, seed.wrapping_add(2), tuning),
    );
    let result = game.run();

    log::info!("match finished after {} frames", game.frames_played());
    println!("{}", result);
}
