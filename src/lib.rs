//! Astro Drift - a headless asteroid-field shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, motion, wrapping, collisions, world tick)
//! - `platform`: Host integration (lifecycle state machine, world loop task, frame sink)
//! - `persistence`: JSON file load/save
//! - `settings`: Rulesets and tuning
//! - `highscores`: Leaderboard

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use highscores::HighScores;
pub use settings::{Ruleset, Settings, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Target update rate of the world loop
    pub const TARGET_FPS: u32 = 60;
    /// Fastest supported rate; the tick interval has millisecond resolution
    pub const MAX_TARGET_FPS: u32 = 1000;

    /// `launch(amount)` accelerates by this multiple of `amount`
    pub const LAUNCH_SCALE: f32 = 10.0;
    /// Heading every entity starts with unless its kind overrides it (degrees)
    pub const DEFAULT_HEADING: f32 = 90.0;

    /// Player craft
    pub const PLAYER_RADIUS: i32 = 200;
    pub const PLAYER_THRUST: f32 = 2.0;
    pub const PLAYER_TURN_RATE: f32 = 5.0; // degrees per tick
    pub const PLAYER_START_HEADING: f32 = 90.0; // facing up

    /// Obstacles
    pub const OBSTACLE_COUNT: usize = 5;
    pub const OBSTACLE_RADIUS: i32 = 200;
    pub const OBSTACLE_SPEED: f32 = 1.0;
    pub const OBSTACLE_POINTS: u64 = 20;
    /// Split fragments, one size tier down at a time
    pub const MEDIUM_OBSTACLE_RADIUS: i32 = 100;
    pub const MEDIUM_OBSTACLE_POINTS: u64 = 50;
    pub const SMALL_OBSTACLE_RADIUS: i32 = 50;
    pub const SMALL_OBSTACLE_POINTS: u64 = 100;
    /// Speed each fragment gains on top of its parent's velocity
    pub const SPLIT_KICK: f32 = 5.0;
    /// Fragments veer up to this many degrees either side of the impact heading
    pub const SPLIT_SPREAD: f32 = 15.0;
    /// Re-rolls allowed when an obstacle spawns on top of the player
    pub const SPAWN_CLEARANCE_ATTEMPTS: u32 = 64;

    /// Projectiles
    pub const PROJECTILE_RADIUS: i32 = 10;
    pub const PROJECTILE_BONUS_SPEED: f32 = 5.0;
    pub const PROJECTILE_LIFETIME: f32 = 40.0;

    /// Background stars: count in [AVG - SPREAD, AVG + SPREAD)
    pub const STAR_AVG_COUNT: usize = 20;
    pub const STAR_COUNT_SPREAD: usize = 10;
    pub const STAR_MIN_SIZE: u32 = 5;
    pub const STAR_MAX_SIZE: u32 = 25;

    /// Number of player sprite frames covering a full turn
    pub const HEADING_FRAMES: usize = 12;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unit vector for a heading in degrees (0 = +x, 90 = +y)
#[inline]
pub fn heading_vector(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}
