//! The player-controlled drone
//!
//! Gravity and the tap impulse are per-tick constants tuned at 60 Hz. The
//! default `PhysicsPolicy::FrameCoupled` applies them once per accepted frame
//! regardless of its duration; `TimeScaled` scales them by the frame length.

use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::*;

/// How per-tick physics constants relate to elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PhysicsPolicy {
    /// Gravity and velocity applied once per frame, whatever its length
    #[default]
    FrameCoupled,
    /// Gravity and velocity scaled by `delta / reference_frame_ms`
    TimeScaled { reference_frame_ms: f32 },
}

impl PhysicsPolicy {
    /// Multiplier applied to per-tick constants for a frame of `delta_ms`
    pub fn step_scale(&self, delta_ms: f32) -> f32 {
        match *self {
            PhysicsPolicy::FrameCoupled => 1.0,
            PhysicsPolicy::TimeScaled { reference_frame_ms } => {
                if reference_frame_ms > 0.0 {
                    delta_ms / reference_frame_ms
                } else {
                    1.0
                }
            }
        }
    }
}

/// Rotor animation counter (frame index into the sprite row)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DroneAnimation {
    pub frame: u32,
    pub frame_time: f32,
}

impl DroneAnimation {
    pub fn reset(&mut self) {
        self.frame = 0;
        self.frame_time = 0.0;
    }

    /// Cycle through the frames (flying)
    pub fn advance_looping(&mut self, delta_ms: f32) {
        self.frame_time += delta_ms;
        if self.frame_time > ANIM_FRAME_MS {
            self.frame = (self.frame + 1) % ANIM_FRAMES;
            self.frame_time = 0.0;
        }
    }

    /// Step toward the last frame and hold there (crashing)
    pub fn advance_to_end(&mut self, delta_ms: f32) {
        self.frame_time += delta_ms;
        if self.frame_time > ANIM_FRAME_MS && self.frame < ANIM_FRAMES - 1 {
            self.frame += 1;
            self.frame_time = 0.0;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Drone {
    /// Fixed column (left edge)
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Vertical velocity (px/tick, positive is down)
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    /// Collision box, inset from the sprite bounds
    pub hitbox: Rect,
    pub anim: DroneAnimation,
}

impl Drone {
    pub fn new(x: f32, y: f32) -> Self {
        let mut drone = Self {
            x,
            y,
            vy: 0.0,
            width: DRONE_WIDTH,
            height: DRONE_HEIGHT,
            hitbox: Rect::default(),
            anim: DroneAnimation::default(),
        };
        drone.update_hitbox();
        drone
    }

    /// Place the drone at `y` with no vertical motion
    pub fn reset(&mut self, y: f32) {
        self.y = y;
        self.vy = 0.0;
        self.anim.reset();
        self.update_hitbox();
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Recompute the hitbox from the current position and size. Padding is
    /// defined in sprite pixels and scaled to the on-screen size.
    pub fn update_hitbox(&mut self) {
        let pad_x = HITBOX_PAD_X * (self.width / SPRITE_FRAME_WIDTH);
        let pad_y = HITBOX_PAD_Y * (self.height / SPRITE_FRAME_HEIGHT);
        self.hitbox = Rect::new(
            self.x + pad_x,
            self.y + pad_y,
            self.width - pad_x * 2.0,
            self.height - pad_y * 2.0,
        );
    }

    /// Apply gravity and integrate position for one frame
    pub fn integrate(&mut self, delta_ms: f32, policy: PhysicsPolicy) {
        let scale = policy.step_scale(delta_ms);
        self.vy += GRAVITY * scale;
        self.y += self.vy * scale;
        self.update_hitbox();
    }

    /// Tap impulse. `since_last_tap_ms` is `None` when there was no earlier
    /// tap. Returns true if the fast-tap boost applied.
    pub fn flap(&mut self, since_last_tap_ms: Option<f64>) -> bool {
        let fast = since_last_tap_ms.is_some_and(|dt| dt < FAST_TAP_INTERVAL_MS);
        self.vy = if fast {
            JUMP * FAST_TAP_MULTIPLIER
        } else {
            JUMP
        };
        fast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hitbox_inset() {
        let drone = Drone::new(100.0, 200.0);
        let pad_x = 10.0 * 80.0 / 350.0;
        let pad_y = 5.0 * 64.0 / 240.0;
        assert!((drone.hitbox.x - (100.0 + pad_x)).abs() < 1e-4);
        assert!((drone.hitbox.y - (200.0 + pad_y)).abs() < 1e-4);
        assert!((drone.hitbox.width - (80.0 - 2.0 * pad_x)).abs() < 1e-4);
        assert!((drone.hitbox.height - (64.0 - 2.0 * pad_y)).abs() < 1e-4);
    }

    #[test]
    fn test_integrate_frame_coupled_ignores_delta() {
        let mut a = Drone::new(0.0, 100.0);
        let mut b = Drone::new(0.0, 100.0);
        a.integrate(16.0, PhysicsPolicy::FrameCoupled);
        b.integrate(33.0, PhysicsPolicy::FrameCoupled);
        assert_eq!(a.vy, GRAVITY);
        assert_eq!(a.y, 100.5);
        assert_eq!(a.y, b.y);
    }

    #[test]
    fn test_integrate_time_scaled() {
        let policy = PhysicsPolicy::TimeScaled {
            reference_frame_ms: 16.0,
        };
        let mut drone = Drone::new(0.0, 100.0);
        drone.integrate(32.0, policy);
        assert_eq!(drone.vy, 1.0);
        assert_eq!(drone.y, 102.0);
    }

    #[test]
    fn test_hitbox_follows_position() {
        let mut drone = Drone::new(0.0, 100.0);
        let before = drone.hitbox.y;
        drone.integrate(16.0, PhysicsPolicy::FrameCoupled);
        assert!((drone.hitbox.y - before - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_flap_fast_tap_boost() {
        let mut drone = Drone::new(0.0, 100.0);
        assert!(!drone.flap(None));
        assert_eq!(drone.vy, JUMP);
        assert!(!drone.flap(Some(250.0)));
        assert_eq!(drone.vy, JUMP);
        assert!(drone.flap(Some(150.0)));
        assert_eq!(drone.vy, JUMP * 1.5);
    }

    #[test]
    fn test_animation_loops_while_flying() {
        let mut anim = DroneAnimation::default();
        for _ in 0..4 {
            anim.advance_looping(121.0);
        }
        assert_eq!(anim.frame, 1);
    }

    #[test]
    fn test_animation_holds_last_frame() {
        let mut anim = DroneAnimation::default();
        for _ in 0..20 {
            anim.advance_to_end(121.0);
            assert!(anim.frame < ANIM_FRAMES);
        }
        assert_eq!(anim.frame, ANIM_FRAMES - 1);
    }
}
