//! Flappy Drone - A side-scrolling gap-flying arcade game
//!
//! Core modules:
//! - `sim`: Simulation (physics, obstacle stream, collisions, game state)
//! - `session`: Drives the simulation and dispatches to audio/storage/prompt collaborators
//! - `renderer`: WebGPU rendering pipeline
//! - `audio`: Procedural sound effects and background music
//! - `platform`: Browser/native platform detection
//! - `persistence`: Key/value storage backends
//! - `highscores`: Top-5 leaderboard

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::{HighScoreEntry, HighScores};
pub use session::Session;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Downward acceleration added to the drone velocity every tick (px/tick²)
    pub const GRAVITY: f32 = 0.5;
    /// Velocity set by a tap (negative is up, px/tick)
    pub const JUMP: f32 = -8.0;
    /// Taps closer together than this get the boosted impulse
    pub const FAST_TAP_INTERVAL_MS: f64 = 200.0;
    pub const FAST_TAP_MULTIPLIER: f32 = 1.5;

    /// Smallest gap, reached once the difficulty ramp completes
    pub const BASE_GAP: f32 = 140.0;
    /// Gap at session start is BASE_GAP times this
    pub const INITIAL_GAP_MULTIPLIER: f32 = 2.0;
    /// Time for the gap to shrink from its initial size to BASE_GAP
    pub const GAP_RAMP_MS: f64 = 60_000.0;

    /// Pipe dimensions and placement
    pub const PIPE_WIDTH: f32 = 60.0;
    /// Horizontal distance between consecutive pipes (px)
    pub const PIPE_SPACING: f32 = 600.0;
    /// Time for a pipe to scroll across the whole screen
    pub const PIPE_CROSS_TIME_MS: f32 = 5000.0;
    /// Minimum distance between the gap and the top/bottom screen edges
    pub const PIPE_MARGIN: f32 = 50.0;
    /// First backfilled pipe sits at most this far right of the drone
    pub const BACKFILL_LEAD: f32 = 400.0;

    /// Drone sprite size on screen
    pub const DRONE_WIDTH: f32 = 80.0;
    pub const DRONE_HEIGHT: f32 = 64.0;
    /// Drone column as a fraction of screen width
    pub const DRONE_COLUMN: f32 = 0.25;

    /// Sprite sheet frame size, used to scale hitbox padding
    pub const SPRITE_FRAME_WIDTH: f32 = 350.0;
    pub const SPRITE_FRAME_HEIGHT: f32 = 240.0;
    /// Hitbox inset in sprite pixels
    pub const HITBOX_PAD_X: f32 = 10.0;
    pub const HITBOX_PAD_Y: f32 = 5.0;

    /// Rotor animation
    pub const ANIM_FRAMES: u32 = 3;
    pub const ANIM_FRAME_MS: f32 = 120.0;

    /// Frame rate caps
    pub const MAX_FPS_DESKTOP: f64 = 60.0;
    pub const MAX_FPS_MOBILE: f64 = 45.0;
    /// Frame duration the per-tick physics constants were tuned at
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

    /// Ambient clouds
    pub const CLOUD_COUNT_DESKTOP: usize = 8;
    pub const CLOUD_COUNT_MOBILE: usize = 4;
    pub const CLOUD_WIDTH: f32 = 60.0;
    pub const CLOUD_HEIGHT: f32 = 40.0;

    /// Leaderboard
    pub const MAX_HIGH_SCORES: usize = 5;
    pub const DEFAULT_PLAYER_NAME: &str = "FlappyDrone";
}

/// Axis-aligned rectangle in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True if the horizontal spans overlap (open intervals)
    #[inline]
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        left < self.right() && right > self.left()
    }
}

/// Screen dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}
