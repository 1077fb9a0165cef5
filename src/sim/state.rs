//! Game state and core simulation types
//!
//! One `GameState` is one play session: the drone, the pipe stream, the
//! score and the phase machine. Nothing here is global, so tests (or a
//! split-screen host) can run as many sessions as they like.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::DeathCause;
use super::drone::{Drone, PhysicsPolicy};
use super::pipes::{PipeStream, gap_size};
use crate::Viewport;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen; pipes are a static backdrop
    Intro,
    /// Active gameplay
    Playing,
    /// Run ended; waiting for a tap to restart
    Dead { cause: DeathCause },
}

/// Things that move the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Tap,
    Crash(DeathCause),
}

impl GamePhase {
    /// Phase transition table. `None` means the trigger doesn't change phase.
    pub fn next(self, trigger: Trigger) -> Option<GamePhase> {
        match (self, trigger) {
            (GamePhase::Intro, Trigger::Tap) | (GamePhase::Dead { .. }, Trigger::Tap) => {
                Some(GamePhase::Playing)
            }
            (GamePhase::Playing, Trigger::Crash(cause)) => Some(GamePhase::Dead { cause }),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, GamePhase::Playing)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, GamePhase::Dead { .. })
    }
}

/// Notifications for the audio/persistence/presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Any tap, in any phase
    Tap { boosted: bool },
    /// Entered Playing (first start or restart)
    SessionStarted,
    /// Cleared a pipe; carries the new score
    Scored { score: u64 },
    /// Entered Dead
    Died { cause: DeathCause, score: u64 },
}

/// A background cloud (decoration only)
#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    /// Center
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Drift speed (px/ms)
    pub speed: f32,
}

impl Cloud {
    pub fn random<R: Rng>(rng: &mut R, viewport: Viewport) -> Self {
        let scale = 0.5 + rng.random::<f32>() * 0.5;
        Self {
            x: rng.random::<f32>() * viewport.width,
            y: rng.random::<f32>() * viewport.height * 0.5,
            width: CLOUD_WIDTH * scale,
            height: CLOUD_HEIGHT * scale,
            speed: 0.02 + rng.random::<f32>() * 0.05,
        }
    }

    /// Drift left; wrap back to the right edge at a new height
    pub fn drift<R: Rng>(&mut self, delta_ms: f32, viewport: Viewport, rng: &mut R) {
        self.x -= self.speed * delta_ms;
        if self.x + self.width < 0.0 {
            self.x = viewport.width;
            self.y = rng.random::<f32>() * viewport.height * 0.5;
        }
    }
}

/// Runtime simulation options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub cloud_count: usize,
    pub physics: PhysicsPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cloud_count: CLOUD_COUNT_DESKTOP,
            physics: PhysicsPolicy::FrameCoupled,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub viewport: Viewport,
    pub phase: GamePhase,
    pub drone: Drone,
    pub pipes: PipeStream,
    pub clouds: Vec<Cloud>,
    /// Pipes cleared this run
    pub score: u64,
    /// Simulation clock: sum of all accepted frame deltas
    pub time_ms: f64,
    /// `time_ms` when the current run started (drives the gap ramp)
    pub session_start_ms: f64,
    /// `time_ms` of the previous tap
    pub last_tap_ms: Option<f64>,
    pub config: SimConfig,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, viewport: Viewport, config: SimConfig) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed), viewport, config)
    }

    /// Create a new game state drawing all randomness from `rng`
    pub fn with_rng(rng: Pcg32, viewport: Viewport, config: SimConfig) -> Self {
        let drone = Drone::new(viewport.width * DRONE_COLUMN, viewport.height / 2.0);
        let mut state = Self {
            viewport,
            phase: GamePhase::Intro,
            drone,
            pipes: PipeStream::new(viewport),
            clouds: Vec::new(),
            score: 0,
            time_ms: 0.0,
            session_start_ms: 0.0,
            last_tap_ms: None,
            config,
            rng,
            events: Vec::new(),
        };

        state.spawn_clouds();
        // Pipes on the title screen so there's something to look at
        state.backfill_pipes();
        state
    }

    /// Time since the current run started
    pub fn session_elapsed_ms(&self) -> f64 {
        self.time_ms - self.session_start_ms
    }

    /// Gap size for pipes spawned now
    pub fn current_gap(&self) -> f32 {
        gap_size(self.session_elapsed_ms())
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events emitted since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Screen size changed: rederive pipe speed, regenerate clouds, and keep
    /// the drone in its column.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.pipes.resize(viewport.width);
        self.drone.x = viewport.width * DRONE_COLUMN;
        self.drone.update_hitbox();
        self.spawn_clouds();
    }

    /// Change the number of clouds
    pub fn set_cloud_count(&mut self, count: usize) {
        self.config.cloud_count = count;
        self.spawn_clouds();
    }

    pub(crate) fn spawn_clouds(&mut self) {
        let viewport = self.viewport;
        let rng = &mut self.rng;
        self.clouds = (0..self.config.cloud_count)
            .map(|_| Cloud::random(&mut *rng, viewport))
            .collect();
    }

    pub(crate) fn update_clouds(&mut self, delta_ms: f32) {
        let viewport = self.viewport;
        for cloud in &mut self.clouds {
            cloud.drift(delta_ms, viewport, &mut self.rng);
        }
    }

    /// Scroll and spawn pipes for one frame
    pub(crate) fn update_pipes(&mut self, delta_ms: f32) {
        let gap = self.current_gap();
        self.pipes
            .update(delta_ms, self.viewport, gap, &mut self.rng);
    }

    /// Clear the pipe stream and refill it ahead of the drone
    pub(crate) fn backfill_pipes(&mut self) {
        let gap = self.current_gap();
        self.pipes.clear();
        self.pipes
            .backfill(self.drone.x, self.viewport, gap, &mut self.rng);
    }
}
