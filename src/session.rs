//! Session driver
//!
//! Owns one `GameState` plus the collaborators the core talks to: the frame
//! clock, the high-score ledger and its store, the audio sink and the naming
//! prompt. Hosts feed it timestamps and taps and read state back for drawing.

use crate::Viewport;
use crate::highscores::HighScores;
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{FrameClock, FrameStep, GameEvent, GameState, TickInput, tap, tick};

/// Receives sound cues. Every method defaults to doing nothing.
pub trait AudioSink {
    fn on_tap(&mut self) {}
    fn on_session_start(&mut self) {}
    fn on_death(&mut self) {}
}

/// Asks the player for a name for a new high score.
/// `None` means cancelled; the ledger substitutes the default name.
pub trait NamePrompt {
    fn request_name(&mut self) -> Option<String>;
}

impl<F: FnMut() -> Option<String>> NamePrompt for F {
    fn request_name(&mut self) -> Option<String> {
        self()
    }
}

/// No audio
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioSink for Silent {}

pub struct Session<A, S, P> {
    state: GameState,
    clock: FrameClock,
    high_scores: HighScores,
    store: S,
    audio: A,
    prompt: P,
    autopilot: bool,
    /// Rank achieved by the last finished run, if it made the board
    last_rank: Option<usize>,
}

impl<A: AudioSink, S: KeyValueStore, P: NamePrompt> Session<A, S, P> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        seed: u64,
        viewport: Viewport,
        settings: &Settings,
        is_mobile: bool,
        now_ms: f64,
        store: S,
        audio: A,
        prompt: P,
    ) -> Self {
        let state = GameState::new(seed, viewport, settings.sim_config(is_mobile));
        let clock = FrameClock::new(settings.max_fps(is_mobile), now_ms);
        let high_scores = HighScores::load(&store);
        Self {
            state,
            clock,
            high_scores,
            store,
            audio,
            prompt,
            autopilot: false,
            last_rank: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
        log::info!("Autopilot: {}", enabled);
    }

    pub fn toggle_autopilot(&mut self) {
        self.set_autopilot(!self.autopilot);
    }

    /// Re-apply settings (frame cap, cloud density, physics policy)
    pub fn apply_settings(&mut self, settings: &Settings, is_mobile: bool) {
        let config = settings.sim_config(is_mobile);
        self.clock.set_max_fps(settings.max_fps(is_mobile));
        self.state.config.physics = config.physics;
        if config.cloud_count != self.state.clouds.len() {
            self.state.set_cloud_count(config.cloud_count);
        }
    }

    /// Player input. Applied immediately, between frames.
    pub fn tap(&mut self) {
        tap(&mut self.state);
        self.dispatch_events();
    }

    /// Offer a host frame timestamp. Returns true if the simulation advanced
    /// (and the host should redraw).
    pub fn frame(&mut self, now_ms: f64) -> bool {
        match self.clock.advance(now_ms) {
            FrameStep::Advance(delta_ms) => {
                let input = TickInput {
                    tap: false,
                    autopilot: self.autopilot,
                };
                tick(&mut self.state, &input, delta_ms);
                self.dispatch_events();
                true
            }
            FrameStep::Dropped | FrameStep::Suspended => false,
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        log::info!("Resized to {}x{}", viewport.width, viewport.height);
        self.state.resize(viewport);
    }

    /// Host visibility changed
    pub fn set_hidden(&mut self, hidden: bool, now_ms: f64) {
        self.clock.set_suspended(hidden, now_ms);
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Tap { .. } => self.audio.on_tap(),
                GameEvent::SessionStarted => {
                    self.last_rank = None;
                    self.audio.on_session_start();
                }
                GameEvent::Scored { .. } => {}
                GameEvent::Died { score, .. } => {
                    self.audio.on_death();
                    self.record_score(score);
                }
            }
        }
    }

    fn record_score(&mut self, score: u64) {
        let prompt = &mut self.prompt;
        self.last_rank = self
            .high_scores
            .record_if_qualifies(score, || prompt.request_name());

        if let Some(rank) = self.last_rank {
            log::info!("High score #{}: {}", rank, score);
            self.high_scores.save(&mut self.store);
        }
    }
}
