//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only advances through `tick` deltas
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod drone;
pub mod pipes;
pub mod state;
pub mod tick;

pub use clock::{FrameClock, FrameStep};
pub use collision::{DeathCause, award_passed, check_bounds, find_collision, hits_pipe};
pub use drone::{Drone, DroneAnimation, PhysicsPolicy};
pub use pipes::{Pipe, PipeStream, gap_size};
pub use state::{Cloud, GameEvent, GamePhase, GameState, SimConfig, Trigger};
pub use tick::{TickInput, tap, tick};
