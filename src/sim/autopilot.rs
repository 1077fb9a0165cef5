//! Demo-mode controller
//!
//! Keeps the drone hovering just above the lower edge of the next gap. Only
//! reads state; the caller turns its answer into a tap.

use super::state::{GamePhase, GameState};
use crate::consts::*;

/// Distance above the gap's lower edge the autopilot tries to stay at
const HOVER_MARGIN: f32 = 12.0;

/// Wait this long on the game-over screen before restarting
const RESTART_DELAY_FRAMES: u32 = ANIM_FRAMES - 1;

/// Decide whether to tap this frame
pub fn should_tap(state: &GameState) -> bool {
    match state.phase {
        GamePhase::Intro => true,
        GamePhase::Dead { .. } => state.drone.anim.frame >= RESTART_DELAY_FRAMES,
        GamePhase::Playing => {
            let hitbox = state.drone.hitbox;
            if state.drone.vy < 0.0 {
                return false;
            }

            // Next pipe the drone hasn't cleared yet
            let floor_line = state
                .pipes
                .pipes()
                .iter()
                .find(|p| p.right() >= hitbox.left())
                .map(|p| p.gap_bottom() - HOVER_MARGIN)
                .unwrap_or(state.viewport.height * 0.6);

            hitbox.bottom() > floor_line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use crate::sim::pipes::Pipe;
    use crate::sim::state::SimConfig;
    use crate::sim::tick::{TickInput, tap, tick};

    #[test]
    fn test_starts_from_intro() {
        let state = GameState::new(1, Viewport::default(), SimConfig::default());
        assert!(should_tap(&state));
    }

    #[test]
    fn test_taps_when_sinking_below_gap() {
        let mut state = GameState::new(1, Viewport::default(), SimConfig::default());
        tap(&mut state);
        state.pipes.clear();
        let hb = state.drone.hitbox;
        state.pipes.push(Pipe::new(hb.right() + 50.0, hb.y - 100.0, 150.0));
        // Gap bottom is at hb.y + 50, hitbox bottom is lower
        assert!(should_tap(&state));

        state.drone.vy = -3.0;
        assert!(!should_tap(&state));
    }

    #[test]
    fn test_holds_when_high_in_gap() {
        let mut state = GameState::new(1, Viewport::default(), SimConfig::default());
        tap(&mut state);
        state.pipes.clear();
        let hb = state.drone.hitbox;
        state.pipes.push(Pipe::new(hb.right() + 50.0, hb.y - 10.0, 200.0));
        assert!(!should_tap(&state));
    }

    #[test]
    fn test_clears_some_pipes() {
        let mut state = GameState::new(2024, Viewport::new(1000.0, 700.0), SimConfig::default());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut best = 0;
        for _ in 0..3_600 {
            tick(&mut state, &input, 1000.0 / 60.0);
            best = best.max(state.score);
        }
        assert!(best >= 1);
    }
}
