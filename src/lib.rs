//! Bomb Jack - a cherry-collecting arcade platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (platforms, actor physics, enemies, pickups)
//! - `settings`: Runtime configuration
//! - `highscores`: Single-value high score persistence
//! - `error`: Startup load errors

pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::LoadError;
pub use highscores::HighScore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Tile dimensions in pixels
    pub const TILE_W: f32 = 25.0;
    pub const TILE_H: f32 = 30.0;
    /// Level grid size (cells)
    pub const NROWS: usize = 19;
    pub const NCOLS: usize = 19;
    /// Play area
    pub const SCREEN_W: f32 = NCOLS as f32 * TILE_W;
    pub const SCREEN_H: f32 = NROWS as f32 * TILE_H;
    /// Platform bar thickness (3/4 of the smaller tile side)
    pub const PLATFORM_SIZE: f32 = TILE_W * 3.0 / 4.0;
    /// Sprite scale used to size actors
    pub const SPRITE_FACTOR: f32 = 5.0 / 3.0;

    /// Default number of distinct levels before the cycle repeats
    pub const NUM_LEVELS: u32 = 5;
    /// Default lives per game
    pub const NUM_LIVES: u8 = 5;

    /// Gravity (pixels/s²) and terminal fall speed (pixels/s)
    pub const GRAVITY: f32 = 400.0;
    pub const MAX_FALL: f32 = 800.0;

    /// Player horizontal speed (pixels/s)
    pub const PLAYER_SPEED: f32 = 175.0;
    /// Initial jump velocity (negative = up)
    pub const JUMP_VELOCITY: f32 = -GRAVITY / 2.0;
    /// Glide descent speed and duration
    pub const GLIDE_VELOCITY: f32 = 25.0;
    pub const GLIDE_TIME: f32 = 0.3;

    /// Enemy freeze (coin) duration in seconds
    pub const FREEZE_TIME: f32 = 6.0;
    /// Initial flash interval during the end of a freeze
    pub const FLASH_TIME: f32 = 0.3;
    /// Number of on/off toggles budgeted at the end of a freeze
    pub const NUM_FLASHES: f32 = 4.0;
    /// Each flash interval is divided by this
    pub const FLASH_ACCEL: f32 = 1.3;
    /// Friendly (harmless) grace period
    pub const SAFE_TIME: f32 = FLASH_TIME * 2.0;
    /// Interval between enemy respawns
    pub const RESPAWN_TIME: f32 = FREEZE_TIME;
    /// Laps a mummy walks before dropping off its platform
    pub const MUMMY_LAPS: u32 = 3;

    /// Pause at the start of every round
    pub const READY_TIME: f32 = 1.0;

    /// Points
    pub const JUMP_POINTS: u64 = 10;
    pub const CEILING_POINTS: u64 = 10;
    pub const CHERRY_POINTS: u64 = 100;
    pub const LIT_CHERRY_BONUS: u64 = 100;
    /// Net cherries eaten before the power coin appears
    pub const POWER_COIN_CHERRIES: u32 = 20;
    /// Successive frozen-enemy capture values
    pub const CAPTURE_POINTS: [u64; 7] = [100, 200, 300, 500, 800, 1200, 2000];
    /// Round-clear bonus multipliers, indexed by `23 - lit_count`
    pub const LIT_BONUS_TABLE: [u64; 4] = [5, 3, 2, 1];
    pub const LIT_BONUS_UNIT: u64 = 10_000;
    pub const LIT_BONUS_MIN: u32 = 20;
}

/// Top-left pixel of a grid cell
#[inline]
pub fn cell_origin(row: usize, col: usize) -> Vec2 {
    Vec2::new(col as f32 * consts::TILE_W, row as f32 * consts::TILE_H)
}

/// Circle-vs-circle overlap test (touching counts as overlap)
#[inline]
pub fn circles_touch(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) <= (ra + rb) * (ra + rb)
}

/// Unit vector from `from` toward `to`, or zero when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
