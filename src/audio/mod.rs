//! Sound design and music sequencing
//!
//! Everything here is pure: sounds are described as `Voice`s with start
//! times on the audio clock (seconds) and the backend turns them into nodes.
//! Only the Web Audio backend touches the browser.

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

use rand::Rng;

/// Output gain applied to everything
pub const MASTER_GAIN: f32 = 0.25;
/// Seconds per melody step
pub const NOTE_DURATION: f64 = 0.3;
/// Notes sound for this share of their step
pub const NOTE_LENGTH: f64 = 0.9;
/// Steps per kick/snare measure
pub const MEASURE_LEN: usize = 8;
/// Delay between the first run starting and the music starting
pub const MUSIC_START_DELAY: f64 = 1.0;
/// Snare noise burst length
pub const SNARE_DURATION: f64 = 0.2;
/// How far ahead of the audio clock music is scheduled
pub const SCHEDULE_AHEAD: f64 = 0.5;
/// Lead time before the first step, so it isn't scheduled in the past
const START_LEAD: f64 = 0.05;

/// 64-step square wave melody (Hz)
pub const MELODY: [f32; 64] = [
    261.63, 293.66, 329.63, 392.00, 349.23, 329.63, 293.66, 261.63, //
    329.63, 349.23, 392.00, 440.00, 493.88, 440.00, 392.00, 349.23, //
    523.25, 493.88, 440.00, 392.00, 349.23, 329.63, 293.66, 261.63, //
    392.00, 440.00, 493.88, 523.25, 587.33, 523.25, 493.88, 440.00, //
    329.63, 392.00, 523.25, 659.25, 587.33, 493.88, 392.00, 329.63, //
    349.23, 440.00, 587.33, 523.25, 493.88, 440.00, 392.00, 349.23, //
    329.63, 261.63, 293.66, 349.23, 329.63, 392.00, 349.23, 440.00, //
    392.00, 349.23, 293.66, 246.94, 261.63, 329.63, 349.23, 392.00, //
];

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Flap / start
    Tap,
    /// Crash
    Death,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    /// White noise buffer
    Noise,
}

/// Which volume control a voice answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    Sfx,
    Music,
}

/// One scheduled sound: a source with an exponential pitch and gain sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub bus: Bus,
    /// Audio clock time (s)
    pub start: f64,
    pub duration: f64,
    pub freq_start: f32,
    pub freq_end: f32,
    pub gain_start: f32,
    pub gain_end: f32,
}

impl Voice {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

impl SoundEffect {
    pub fn voice(self, t: f64) -> Voice {
        match self {
            // Short high blip
            SoundEffect::Tap => Voice {
                waveform: Waveform::Square,
                bus: Bus::Sfx,
                start: t,
                duration: 0.15,
                freq_start: 880.0,
                freq_end: 880.0,
                gain_start: 0.4,
                gain_end: 0.001,
            },
            // Falling buzz
            SoundEffect::Death => Voice {
                waveform: Waveform::Sawtooth,
                bus: Bus::Sfx,
                start: t,
                duration: 0.6,
                freq_start: 300.0,
                freq_end: 50.0,
                gain_start: 0.5,
                gain_end: 0.001,
            },
        }
    }
}

/// Voices for melody step `step` starting at `t`
pub fn step_voices(step: usize, t: f64) -> Vec<Voice> {
    let freq = MELODY[step % MELODY.len()];
    let mut voices = vec![Voice {
        waveform: Waveform::Square,
        bus: Bus::Music,
        start: t,
        duration: NOTE_DURATION * NOTE_LENGTH,
        freq_start: freq,
        freq_end: freq,
        gain_start: 0.3,
        gain_end: 0.001,
    }];

    match step % MEASURE_LEN {
        // Kick
        0 => voices.push(Voice {
            waveform: Waveform::Sine,
            bus: Bus::Music,
            start: t,
            duration: 0.3,
            freq_start: 150.0,
            freq_end: 50.0,
            gain_start: 1.0,
            gain_end: 0.001,
        }),
        // Snare
        4 => voices.push(Voice {
            waveform: Waveform::Noise,
            bus: Bus::Music,
            start: t,
            duration: SNARE_DURATION,
            freq_start: 0.0,
            freq_end: 0.0,
            gain_start: 0.5,
            gain_end: 0.01,
        }),
        _ => {}
    }
    voices
}

/// Looping melody scheduler. Call `pump` regularly; it hands out every step
/// that starts before `now + SCHEDULE_AHEAD`.
#[derive(Debug, Clone)]
pub struct Sequencer {
    next_step: usize,
    next_time: f64,
}

impl Sequencer {
    pub fn new(now: f64) -> Self {
        Self {
            next_step: 0,
            next_time: now + START_LEAD,
        }
    }

    pub fn next_step(&self) -> usize {
        self.next_step
    }

    pub fn pump(&mut self, now: f64) -> Vec<Voice> {
        // Fell behind (page was hidden): pick the melody up where it stopped
        if self.next_time < now {
            self.next_time = now + START_LEAD;
        }

        let mut voices = Vec::new();
        while self.next_time < now + SCHEDULE_AHEAD {
            voices.extend(step_voices(self.next_step, self.next_time));
            self.next_step = (self.next_step + 1) % MELODY.len();
            self.next_time += NOTE_DURATION;
        }
        voices
    }
}

/// Starts the music once, `MUSIC_START_DELAY` after the latest run start
#[derive(Debug, Clone, Default)]
pub struct MusicCue {
    requested_at: Option<f64>,
    started: bool,
}

impl MusicCue {
    /// A run started at `now`. Restarts the countdown while it's pending.
    pub fn request(&mut self, now: f64) {
        if !self.started {
            self.requested_at = Some(now);
        }
    }

    /// True exactly once, when the countdown expires
    pub fn poll(&mut self, now: f64) -> bool {
        match self.requested_at {
            Some(at) if !self.started && now - at >= MUSIC_START_DELAY => {
                self.started = true;
                self.requested_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

/// White noise in [-1, 1)
pub fn noise_samples<R: Rng>(len: usize, rng: &mut R) -> Vec<f32> {
    (0..len).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_effect_shapes() {
        let tap = SoundEffect::Tap.voice(1.0);
        assert_eq!(tap.waveform, Waveform::Square);
        assert_eq!(tap.freq_start, 880.0);
        assert!((tap.end() - 1.15).abs() < 1e-9);

        let death = SoundEffect::Death.voice(0.0);
        assert_eq!(death.waveform, Waveform::Sawtooth);
        assert_eq!((death.freq_start, death.freq_end), (300.0, 50.0));
        assert_eq!(death.duration, 0.6);
    }

    #[test]
    fn test_percussion_pattern() {
        let kicks: Vec<usize> = (0..16)
            .filter(|&i| step_voices(i, 0.0).iter().any(|v| v.waveform == Waveform::Sine))
            .collect();
        let snares: Vec<usize> = (0..16)
            .filter(|&i| step_voices(i, 0.0).iter().any(|v| v.waveform == Waveform::Noise))
            .collect();
        assert_eq!(kicks, vec![0, 8]);
        assert_eq!(snares, vec![4, 12]);
        assert_eq!(step_voices(3, 0.0).len(), 1);
    }

    #[test]
    fn test_note_length() {
        let note = step_voices(5, 2.0)[0];
        assert_eq!(note.freq_start, MELODY[5]);
        assert!((note.duration - 0.27).abs() < 1e-9);
    }

    #[test]
    fn test_sequencer_schedules_ahead_and_loops() {
        let mut seq = Sequencer::new(0.0);
        let voices = seq.pump(0.0);
        // Steps at 0.05 and 0.35 fit in the first half second
        let notes: Vec<f64> = voices
            .iter()
            .filter(|v| v.waveform == Waveform::Square)
            .map(|v| v.start)
            .collect();
        assert_eq!(notes.len(), 2);
        assert!((notes[1] - notes[0] - NOTE_DURATION).abs() < 1e-9);
        assert!(seq.pump(0.0).is_empty());

        let mut t = 0.0;
        let mut total = 2;
        while total < MELODY.len() + 3 {
            t += 0.1;
            total += seq
                .pump(t)
                .iter()
                .filter(|v| v.waveform == Waveform::Square)
                .count();
        }
        // Wrapped back to the start of the melody
        assert!(seq.next_step() < 4);
    }

    #[test]
    fn test_sequencer_resyncs_after_gap() {
        let mut seq = Sequencer::new(0.0);
        seq.pump(0.0);
        let step = seq.next_step();
        let voices = seq.pump(100.0);
        assert!(voices.iter().all(|v| v.start >= 100.0));
        assert!(!voices.is_empty());
        let first_note = voices.iter().find(|v| v.waveform == Waveform::Square);
        assert_eq!(first_note.map(|v| v.freq_start), Some(MELODY[step]));
    }

    #[test]
    fn test_music_cue_waits_and_fires_once() {
        let mut cue = MusicCue::default();
        assert!(!cue.poll(10.0));
        cue.request(1.0);
        assert!(!cue.poll(1.5));
        // A restart pushes the start back
        cue.request(1.75);
        assert!(!cue.poll(2.5));
        assert!(cue.poll(2.75));
        assert!(cue.is_started());
        cue.request(5.0);
        assert!(!cue.poll(100.0));
    }

    #[test]
    fn test_noise_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        let samples = noise_samples(4_800, &mut rng);
        assert_eq!(samples.len(), 4_800);
        assert!(samples.iter().all(|s| (-1.0..1.0).contains(s)));
    }
}
