//! Glitch Grid - a grid trail arcade game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (player, enemies, particles, score integrity)
//! - `input`: Command queue and key/swipe mapping
//! - `renderer`: 2D rendering collaborator (canvas on web)
//! - `platform`: Clock abstraction and browser glue
//! - `persistence`: Key/value storage with tamper detection
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod engine;
pub mod error;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::Engine;
pub use error::{EngineError, StorageError, TuningError};
pub use highscores::HighScore;
pub use input::{Command, InputQueue};
pub use settings::{QualityPreset, Settings};
pub use sim::{RunState, Simulation};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Grid dimensions (in tiles)
    pub const GRID_W: i32 = 40;
    pub const GRID_H: i32 = 30;
    /// Pixel size of one tile
    pub const TILE: f32 = 20.0;

    /// Seconds between player head advances
    pub const MOVE_INTERVAL: f32 = 0.08;
    /// Enemy speed in grid units per second
    pub const ENEMY_SPEED: f32 = 5.0;
    /// Seconds between enemy spawns
    pub const SPAWN_INTERVAL: f32 = 3.5;
    /// Points for one fragment
    pub const SCORE_VALUE: u32 = 100;
    /// Frame delta ceiling (anti-lag / anti-speedhack)
    pub const MAX_DT: f32 = 0.1;

    /// Enemy contact radius, squared (0.8 tiles)
    pub const ENEMY_HIT_DIST_SQ: f32 = 0.64;
    /// Enemies closer than this stop steering (avoids normalizing a zero vector)
    pub const ENEMY_MIN_STEER_DIST: f32 = 0.01;
    /// Idle enemies created up front
    pub const ENEMY_POOL_PREWARM: usize = 20;

    /// Rejection-sampling budget for fragment placement
    pub const FRAGMENT_RETRIES: u32 = 100;
    /// Pulse speed of the fragment (radians per second)
    pub const FRAGMENT_PULSE_RATE: f32 = 5.0;

    /// Particle burst sizes
    pub const COLLECT_BURST: usize = 12;
    pub const CRASH_BURST: usize = 24;

    /// XOR salt for the score shadow and the stored high score
    pub const SALT: u32 = 0xDEAD_BEEF;
    /// Secret mixed into the storage envelope hash
    pub const STORAGE_SECRET: &str = "egs::envelope::v1";

    /// Keyboard repeat throttle for movement keys (ms)
    pub const INPUT_THROTTLE_MS: f64 = 50.0;
    /// Minimum swipe distance in pixels
    pub const SWIPE_THRESHOLD: f32 = 30.0;

    /// Palette (CSS colors)
    pub mod colors {
        pub const BG: &str = "#050510";
        pub const GRID: &str = "#1a1a2e";
        pub const PLAYER: &str = "#00ffcc";
        pub const FRAGMENT: &str = "#ff00ff";
        pub const ENEMY: &str = "#ff3333";
    }
}

/// Clamp `v` into `[lo, hi]`
#[inline]
pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

/// Squared euclidean distance (no sqrt)
#[inline]
pub fn dist_sq(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    (x1 - x2) * (x1 - x2) + (y1 - y2) * (y1 - y2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_examples() {
        assert_eq!(clamp(10, 0, 5), 5);
        assert_eq!(clamp(-10, 0, 5), 0);
        assert_eq!(clamp(3, 0, 5), 3);
    }

    #[test]
    fn test_dist_sq_example() {
        assert_eq!(dist_sq(0.0, 0.0, 3.0, 4.0), 25.0);
    }

    proptest! {
        #[test]
        fn clamp_stays_in_range(v in -1000i32..1000, lo in -100i32..0, hi in 0i32..100) {
            let c = clamp(v, lo, hi);
            prop_assert!(c >= lo && c <= hi);
        }

        #[test]
        fn dist_sq_is_symmetric(
            x1 in -100i32..100, y1 in -100i32..100,
            x2 in -100i32..100, y2 in -100i32..100,
        ) {
            let (x1, y1, x2, y2) = (x1 as f32, y1 as f32, x2 as f32, y2 as f32);
            let d = dist_sq(x1, y1, x2, y2);
            prop_assert_eq!(d, dist_sq(x2, y2, x1, y1));
            prop_assert_eq!(d, (x1 - x2).powi(2) + (y1 - y2).powi(2));
        }
    }
}
