//! Per-frame simulation update
//!
//! Within a Playing frame the order is fixed: pipes scroll and spawn, the
//! drone integrates, then scoring and collision are evaluated. Taps are
//! applied between frames.

use super::autopilot;
use super::collision::{award_passed, find_collision};
use super::state::{GameEvent, GamePhase, GameState, Trigger};

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Tap/click/space before this frame
    pub tap: bool,
    /// Demo mode - the autopilot taps for the player
    pub autopilot: bool,
}

/// Handle a tap: flap while playing, otherwise start a new run
pub fn tap(state: &mut GameState) {
    let now = state.time_ms;
    let since_last = state.last_tap_ms.map(|t| now - t);

    match state.phase.next(Trigger::Tap) {
        Some(next) => {
            state.push_event(GameEvent::Tap { boosted: false });
            state.phase = next;
            start_session(state);
        }
        None => {
            let boosted = state.drone.flap(since_last);
            state.push_event(GameEvent::Tap { boosted });
        }
    }
    state.last_tap_ms = Some(now);
}

/// Reset everything a run owns. Called on every entry to Playing.
fn start_session(state: &mut GameState) {
    state.score = 0;
    state.session_start_ms = state.time_ms;
    let mid = state.viewport.height / 2.0;
    state.drone.reset(mid);
    state.backfill_pipes();
    state.push_event(GameEvent::SessionStarted);
    log::info!("Run started");
}

fn crash(state: &mut GameState, cause: super::collision::DeathCause) {
    if let Some(next) = state.phase.next(Trigger::Crash(cause)) {
        state.phase = next;
        state.drone.anim.reset();
        state.push_event(GameEvent::Died {
            cause,
            score: state.score,
        });
        log::info!("Crashed into {} with score {}", cause.as_str(), state.score);
    }
}

/// Advance the game state by one accepted frame of `delta_ms`
pub fn tick(state: &mut GameState, input: &TickInput, delta_ms: f32) {
    let wants_tap = input.tap || (input.autopilot && autopilot::should_tap(state));
    if wants_tap {
        tap(state);
    }

    state.time_ms += delta_ms as f64;
    state.update_clouds(delta_ms);

    match state.phase {
        GamePhase::Intro => {}

        GamePhase::Playing => {
            let viewport = state.viewport;
            state.update_pipes(delta_ms);

            state.drone.anim.advance_looping(delta_ms);
            state.drone.integrate(delta_ms, state.config.physics);

            let hitbox = state.drone.hitbox;
            let awarded = award_passed(&hitbox, state.pipes.pipes_mut());
            for _ in 0..awarded {
                state.score += 1;
                let score = state.score;
                state.push_event(GameEvent::Scored { score });
            }

            if let Some(cause) = find_collision(&hitbox, state.pipes.pipes(), viewport.height) {
                crash(state, cause);
                return;
            }

            state.pipes.prune();
        }

        GamePhase::Dead { .. } => {
            state.drone.anim.advance_to_end(delta_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use crate::consts::*;
    use crate::sim::collision::DeathCause;
    use crate::sim::pipes::Pipe;
    use crate::sim::state::SimConfig;

    const VIEW: Viewport = Viewport::new(1000.0, 600.0);
    const DT: f32 = 1000.0 / 60.0;

    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, VIEW, SimConfig::default());
        tap(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);
        state.drain_events();
        state
    }

    #[test]
    fn test_intro_is_static() {
        let mut state = GameState::new(1, VIEW, SimConfig::default());
        let pipes_before: Vec<f32> = state.pipes.pipes().iter().map(|p| p.x).collect();
        let y_before = state.drone.y;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), DT);
        }
        let pipes_after: Vec<f32> = state.pipes.pipes().iter().map(|p| p.x).collect();
        assert_eq!(pipes_before, pipes_after);
        assert_eq!(state.drone.y, y_before);
        assert_eq!(state.phase, GamePhase::Intro);
    }

    #[test]
    fn test_intro_tap_starts_run() {
        let mut state = GameState::new(1, VIEW, SimConfig::default());
        let input = TickInput {
            tap: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::Tap { boosted: false });
        assert_eq!(events[1], GameEvent::SessionStarted);
    }

    #[test]
    fn test_starting_tap_does_not_flap() {
        let state = playing_state(2);
        assert_eq!(state.drone.vy, 0.0);
        assert_eq!(state.drone.y, VIEW.height / 2.0);
    }

    #[test]
    fn test_playing_tap_flaps() {
        let mut state = playing_state(2);
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), DT);
        }
        tap(&mut state);
        assert_eq!(state.drone.vy, JUMP);
        // Second tap in the same frame is a fast tap
        tap(&mut state);
        assert_eq!(state.drone.vy, JUMP * FAST_TAP_MULTIPLIER);
        let events = state.drain_events();
        assert_eq!(events, vec![
            GameEvent::Tap { boosted: false },
            GameEvent::Tap { boosted: true },
        ]);
    }

    #[test]
    fn test_falls_to_floor() {
        let mut state = playing_state(3);
        let mut frames = 0;
        while state.phase == GamePhase::Playing && frames < 1_000 {
            tick(&mut state, &TickInput::default(), DT);
            frames += 1;
        }
        assert_eq!(state.phase, GamePhase::Dead {
            cause: DeathCause::Floor
        });
    }

    #[test]
    fn test_top_edge_rising_dies_next_frame() {
        let mut state = playing_state(4);
        state.pipes.clear();
        // Hitbox top exactly at y=0
        let pad_y = state.drone.hitbox.y - state.drone.y;
        state.drone.y = -pad_y;
        state.drone.update_hitbox();
        assert!(state.drone.hitbox.y.abs() < 1e-4);
        state.last_tap_ms = None;
        tap(&mut state);

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Dead {
            cause: DeathCause::Ceiling
        });
    }

    #[test]
    fn test_pipe_collision_kills() {
        let mut state = playing_state(5);
        state.pipes.clear();
        let hb = state.drone.hitbox;
        // Gap well below the drone
        state
            .pipes
            .push(Pipe::new(hb.x, hb.bottom() + 20.0, 140.0));
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Dead {
            cause: DeathCause::Pipe
        });
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Died {
            cause: DeathCause::Pipe,
            score: 0
        }));
    }

    #[test]
    fn test_flying_through_gap_is_safe() {
        let mut state = playing_state(6);
        state.pipes.clear();
        let hb = state.drone.hitbox;
        state.pipes.push(Pipe::new(hb.x, hb.y - 40.0, 200.0));
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_scores_each_pipe_once() {
        let mut state = playing_state(7);
        state.pipes.clear();
        let hb = state.drone.hitbox;
        state.pipes.push(Pipe::new(hb.x - PIPE_WIDTH - 5.0, 50.0, 400.0));
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.score, 1);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.score, 1);
        let events = state.drain_events();
        assert_eq!(events, vec![GameEvent::Scored { score: 1 }]);
    }

    #[test]
    fn test_dead_is_frozen() {
        let mut state = playing_state(8);
        while state.phase == GamePhase::Playing {
            tick(&mut state, &TickInput::default(), DT);
        }
        let y = state.drone.y;
        let xs: Vec<f32> = state.pipes.pipes().iter().map(|p| p.x).collect();
        let score = state.score;
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), DT);
            assert!(state.drone.anim.frame < ANIM_FRAMES);
        }
        assert_eq!(state.drone.y, y);
        assert_eq!(state.score, score);
        let xs_after: Vec<f32> = state.pipes.pipes().iter().map(|p| p.x).collect();
        assert_eq!(xs, xs_after);
        assert_eq!(state.drone.anim.frame, ANIM_FRAMES - 1);
    }

    #[test]
    fn test_restart_resets_score_and_velocity() {
        let mut state = playing_state(9);
        state.score = 17;
        state.drone.vy = 12.5;
        crash(&mut state, DeathCause::Pipe);
        assert!(state.phase.is_dead());

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), DT);
        }
        tap(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.drone.vy, 0.0);
        assert_eq!(state.session_start_ms, state.time_ms);
        assert_eq!(state.current_gap(), BASE_GAP * INITIAL_GAP_MULTIPLIER);
        let first = &state.pipes.pipes()[0];
        assert!(first.x - state.drone.x <= BACKFILL_LEAD);
    }

    #[test]
    fn test_gap_shrinks_during_run() {
        let mut state = playing_state(10);
        state.time_ms += 30_000.0;
        assert_eq!(state.current_gap(), 210.0);
        state.time_ms += 60_000.0;
        assert_eq!(state.current_gap(), BASE_GAP);
    }

    #[test]
    fn test_score_never_decreases() {
        let mut state = playing_state(11);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut last = 0;
        for _ in 0..3_000 {
            tick(&mut state, &input, DT);
            if state.phase.is_playing() {
                assert!(state.score >= last);
                assert!(state.score <= last + 1);
                last = state.score;
            } else {
                last = 0;
            }
        }
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999, VIEW, SimConfig::default());
        let mut state2 = GameState::new(99999, VIEW, SimConfig::default());

        let taps = [true, false, false, true, false, false, false, true];
        for _ in 0..40 {
            for &t in &taps {
                let input = TickInput {
                    tap: t,
                    ..Default::default()
                };
                tick(&mut state1, &input, DT);
                tick(&mut state2, &input, DT);
            }
        }

        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.drone.y, state2.drone.y);
        assert_eq!(state1.pipes.pipes(), state2.pipes.pipes());
        assert_eq!(state1.clouds, state2.clouds);
    }
}
