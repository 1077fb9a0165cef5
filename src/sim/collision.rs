//! Collision detection and scoring
//!
//! The drone hitbox is an axis-aligned rectangle and every pipe is a top and
//! bottom rectangle separated by its gap, so all tests are independent
//! per-axis interval checks.

use super::pipes::Pipe;
use crate::Rect;

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Flew above the top of the screen
    Ceiling,
    /// Fell to the bottom of the screen
    Floor,
    /// Touched a pipe
    Pipe,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Ceiling => "ceiling",
            DeathCause::Floor => "floor",
            DeathCause::Pipe => "pipe",
        }
    }
}

/// Screen edge check
pub fn check_bounds(hitbox: &Rect, screen_height: f32) -> Option<DeathCause> {
    if hitbox.bottom() >= screen_height {
        Some(DeathCause::Floor)
    } else if hitbox.top() < 0.0 {
        Some(DeathCause::Ceiling)
    } else {
        None
    }
}

/// True if the hitbox is horizontally inside the pipe and pokes out of the gap
pub fn hits_pipe(hitbox: &Rect, pipe: &Pipe) -> bool {
    if !hitbox.overlaps_x(pipe.x, pipe.right()) {
        return false;
    }
    hitbox.top() < pipe.top || hitbox.bottom() > pipe.gap_bottom()
}

/// True once the pipe's trailing edge is behind the hitbox's leading edge
#[inline]
pub fn passed_pipe(hitbox: &Rect, pipe: &Pipe) -> bool {
    pipe.right() < hitbox.left()
}

/// Bounds first, then pipes in order; stops at the first hit
pub fn find_collision(hitbox: &Rect, pipes: &[Pipe], screen_height: f32) -> Option<DeathCause> {
    if let Some(cause) = check_bounds(hitbox, screen_height) {
        return Some(cause);
    }
    pipes
        .iter()
        .any(|pipe| hits_pipe(hitbox, pipe))
        .then_some(DeathCause::Pipe)
}

/// Flag every newly passed pipe as scored; returns how many were flagged
pub fn award_passed(hitbox: &Rect, pipes: &mut [Pipe]) -> u32 {
    let mut awarded = 0;
    for pipe in pipes.iter_mut() {
        if !pipe.scored && passed_pipe(hitbox, pipe) {
            pipe.scored = true;
            awarded += 1;
        }
    }
    awarded
}
