//! Player preferences
//!
//! Persisted through the hash-checked envelope, separately from the high score.

use serde::{Deserialize, Serialize};

use crate::persistence::SecureStorage;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// HUD label
    pub fn label(self) -> &'static str {
        match self {
            QualityPreset::Low => "LOW",
            QualityPreset::Medium => "MED",
            QualityPreset::High => "HIGH",
        }
    }

    /// Next preset in the Low -> Medium -> High cycle
    pub fn next(self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Particle buffer capacity for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 1024,
        }
    }

    /// Whether to draw the background grid lines
    pub fn grid_lines(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Particle effects on collect/crash
    pub particles: bool,
    /// Grid lines behind the board
    pub show_grid: bool,
    /// All sound off
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            show_grid: true,
            muted: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "egs_settings";

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.show_grid = preset.grid_lines();
    }

    /// Effective particle capacity
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Step to the next quality preset, returning it
    pub fn cycle_preset(&mut self) -> QualityPreset {
        let next = self.quality.next();
        self.apply_preset(next);
        next
    }

    /// Flip mute, returning the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Load settings, falling back to defaults on absence or tampering
    pub fn load(storage: &SecureStorage) -> Self {
        storage.load(Self::STORAGE_KEY, Self::default())
    }

    pub fn save(&self, storage: &mut SecureStorage) {
        if storage.save(Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}
