//! Web Audio backend
//!
//! Procedurally generated sound effects and music - no external files needed!

use rand::SeedableRng;
use rand_pcg::Pcg32;
use web_sys::{AudioBuffer, AudioContext, GainNode, OscillatorNode, OscillatorType};

use super::{
    Bus, MASTER_GAIN, MusicCue, SNARE_DURATION, Sequencer, SoundEffect, Voice, Waveform,
    noise_samples,
};
use crate::session::AudioSink;
use crate::settings::Settings;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    /// Everything routes through here
    master: Option<GainNode>,
    noise: Option<AudioBuffer>,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    /// Muted because the page is hidden (independent of the user's mute)
    hidden: bool,
    cue: MusicCue,
    sequencer: Option<Sequencer>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }

        let master = ctx.as_ref().and_then(|ctx| {
            let gain = ctx.create_gain().ok()?;
            gain.gain().set_value(MASTER_GAIN);
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some(gain)
        });

        Self {
            ctx,
            master,
            noise: None,
            sfx_volume: 1.0,
            music_volume: 1.0,
            muted: false,
            hidden: false,
            cue: MusicCue::default(),
            sequencer: None,
        }
    }

    /// Pick up volume and mute preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.effective_sfx_volume();
        self.music_volume = settings.effective_music_volume();
        self.muted = settings.muted;
        self.update_master();
    }

    /// Page visibility changed
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
        self.update_master();
    }

    fn update_master(&self) {
        if let (Some(ctx), Some(master)) = (&self.ctx, &self.master) {
            let level = if self.muted || self.hidden {
                0.0
            } else {
                MASTER_GAIN
            };
            master
                .gain()
                .set_value_at_time(level, ctx.current_time())
                .ok();
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        self.resume();
        let Some(ctx) = &self.ctx else { return };
        let voice = effect.voice(ctx.current_time());
        self.play_voice(&voice);
    }

    /// Start the music countdown (no-op once music is running)
    pub fn cue_music(&mut self) {
        if let Some(ctx) = &self.ctx {
            self.cue.request(ctx.current_time());
        }
    }

    /// Call once per animation frame: starts the music when due and keeps
    /// the melody scheduled ahead of the audio clock.
    pub fn pump(&mut self) {
        let Some(ctx) = &self.ctx else { return };
        let now = ctx.current_time();

        if self.cue.poll(now) {
            log::info!("Music started");
            self.sequencer = Some(Sequencer::new(now));
        }

        let voices = match self.sequencer.as_mut() {
            Some(seq) => seq.pump(now),
            None => return,
        };
        for voice in &voices {
            self.play_voice(voice);
        }
    }

    fn bus_volume(&self, bus: Bus) -> f32 {
        match bus {
            Bus::Sfx => self.sfx_volume,
            Bus::Music => self.music_volume,
        }
    }

    fn play_voice(&mut self, voice: &Voice) {
        let vol = self.bus_volume(voice.bus);
        if vol <= 0.0 {
            return;
        }
        match voice.waveform {
            Waveform::Sine => self.play_tone(voice, OscillatorType::Sine, vol),
            Waveform::Square => self.play_tone(voice, OscillatorType::Square, vol),
            Waveform::Sawtooth => self.play_tone(voice, OscillatorType::Sawtooth, vol),
            Waveform::Noise => self.play_noise(voice, vol),
        }
    }

    // === Sound generators ===

    /// Create a gain stage feeding the master bus with the voice's envelope
    fn create_envelope(&self, ctx: &AudioContext, voice: &Voice, vol: f32) -> Option<GainNode> {
        let master = self.master.as_ref()?;
        let gain = ctx.create_gain().ok()?;
        gain.connect_with_audio_node(master).ok()?;

        let t = voice.start;
        gain.gain().set_value_at_time(voice.gain_start * vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(voice.gain_end * vol, t + voice.duration)
            .ok();
        Some(gain)
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        voice: &Voice,
        osc_type: OscillatorType,
        vol: f32,
    ) -> Option<OscillatorNode> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = self.create_envelope(ctx, voice, vol)?;

        osc.set_type(osc_type);
        osc.frequency().set_value_at_time(voice.freq_start, voice.start).ok();
        if voice.freq_end != voice.freq_start {
            osc.frequency()
                .exponential_ramp_to_value_at_time(voice.freq_end, voice.end())
                .ok();
        }
        osc.connect_with_audio_node(&gain).ok()?;

        Some(osc)
    }

    fn play_tone(&self, voice: &Voice, osc_type: OscillatorType, vol: f32) {
        let Some(ctx) = &self.ctx else { return };
        let Some(osc) = self.create_osc(ctx, voice, osc_type, vol) else {
            return;
        };
        osc.start_with_when(voice.start).ok();
        osc.stop_with_when(voice.end()).ok();
    }

    /// Snare - white noise burst
    fn play_noise(&mut self, voice: &Voice, vol: f32) {
        let Some(ctx) = self.ctx.clone() else { return };
        if self.noise.is_none() {
            self.noise = create_noise_buffer(&ctx);
        }
        let Some(buffer) = &self.noise else { return };

        let Ok(source) = ctx.create_buffer_source() else { return };
        let Some(gain) = self.create_envelope(&ctx, voice, vol) else {
            return;
        };
        source.set_buffer(Some(buffer));
        if source.connect_with_audio_node(&gain).is_err() {
            return;
        }
        source.start_with_when(voice.start).ok();
        source.stop_with_when(voice.end()).ok();
    }
}

fn create_noise_buffer(ctx: &AudioContext) -> Option<AudioBuffer> {
    let rate = ctx.sample_rate();
    let len = (rate as f64 * SNARE_DURATION) as u32;
    let buffer = ctx.create_buffer(1, len, rate).ok()?;
    let mut rng = Pcg32::seed_from_u64(js_sys::Date::now() as u64);
    let samples = noise_samples(len as usize, &mut rng);
    buffer.copy_to_channel(&samples, 0).ok()?;
    Some(buffer)
}

impl AudioSink for AudioManager {
    fn on_tap(&mut self) {
        self.play(SoundEffect::Tap);
    }

    fn on_session_start(&mut self) {
        self.cue_music();
    }

    fn on_death(&mut self) {
        self.play(SoundEffect::Death);
    }
}
