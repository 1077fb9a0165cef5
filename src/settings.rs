//! Game settings and preferences
//!
//! Persisted separately from the high scores under their own key.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::KeyValueStore;
use crate::sim::{PhysicsPolicy, SimConfig};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Cloud count for this preset, given the platform's base density
    pub fn cloud_count(&self, base: usize) -> usize {
        match self {
            QualityPreset::Low => 0,
            QualityPreset::Medium => base,
            QualityPreset::High => base * 2,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
    /// Mute while the page is hidden
    pub mute_on_hidden: bool,

    // === Simulation ===
    pub physics: PhysicsPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            // HUD
            show_fps: true,

            // Audio
            master_volume: 1.0,
            sfx_volume: 1.0,
            music_volume: 1.0,
            muted: false,
            mute_on_hidden: true,

            physics: PhysicsPolicy::FrameCoupled,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "flappy_drone_settings";

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Frame rate cap for the host class
    pub fn max_fps(&self, is_mobile: bool) -> f64 {
        if is_mobile {
            MAX_FPS_MOBILE
        } else {
            MAX_FPS_DESKTOP
        }
    }

    /// Simulation options for the host class
    pub fn sim_config(&self, is_mobile: bool) -> SimConfig {
        let base = if is_mobile {
            CLOUD_COUNT_MOBILE
        } else {
            CLOUD_COUNT_DESKTOP
        };
        SimConfig {
            cloud_count: self.quality.cloud_count(base),
            physics: self.physics,
        }
    }

    /// Effective sound effect gain (0 when muted)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective music gain (0 when muted)
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Load settings; anything missing or unreadable gives the defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unavailable: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged and otherwise ignored
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to encode settings: {}", e);
                return;
            }
        };
        match store.set(Self::STORAGE_KEY, &json) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_quality_from_str() {
        assert_eq!(QualityPreset::from_str("LOW"), Some(QualityPreset::Low));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }

    #[test]
    fn test_sim_config_per_platform() {
        let settings = Settings::default();
        assert_eq!(settings.sim_config(false).cloud_count, CLOUD_COUNT_DESKTOP);
        assert_eq!(settings.sim_config(true).cloud_count, CLOUD_COUNT_MOBILE);
        assert_eq!(settings.sim_config(false).physics, PhysicsPolicy::FrameCoupled);
        assert_eq!(settings.max_fps(false), 60.0);
        assert_eq!(settings.max_fps(true), 45.0);

        let low = Settings::from_preset(QualityPreset::Low);
        assert_eq!(low.sim_config(false).cloud_count, 0);
    }

    #[test]
    fn test_mute_zeroes_volume() {
        let mut settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            ..Default::default()
        };
        assert_eq!(settings.effective_sfx_volume(), 0.25);
        settings.muted = true;
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            quality: QualityPreset::High,
            show_fps: false,
            physics: PhysicsPolicy::TimeScaled {
                reference_frame_ms: REFERENCE_FRAME_MS,
            },
            ..Default::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_default() {
        let store = MemoryStore::with_value(Settings::STORAGE_KEY, "{not json");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let store = MemoryStore::with_value(Settings::STORAGE_KEY, r#"{"show_fps": false}"#);
        let settings = Settings::load(&store);
        assert!(!settings.show_fps);
        assert_eq!(settings.quality, QualityPreset::Medium);
    }
}
