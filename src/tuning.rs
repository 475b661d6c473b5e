//! Data-driven game balance
//!
//! Defaults mirror `consts`; a JSON override may replace any subset of fields.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;

/// Gameplay parameters, fixed for the lifetime of a `Simulation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub grid_w: i32,
    pub grid_h: i32,
    /// Seconds between player head advances
    pub move_interval: f32,
    /// Enemy speed (grid units per second)
    pub enemy_speed: f32,
    /// Seconds between enemy spawns
    pub spawn_interval: f32,
    /// Points per fragment; larger single increments are rejected
    pub score_value: u32,
    /// Frame delta ceiling
    pub max_dt: f32,
    pub enemy_hit_dist_sq: f32,
    pub fragment_retries: u32,
    pub salt: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            grid_w: GRID_W,
            grid_h: GRID_H,
            move_interval: MOVE_INTERVAL,
            enemy_speed: ENEMY_SPEED,
            spawn_interval: SPAWN_INTERVAL,
            score_value: SCORE_VALUE,
            max_dt: MAX_DT,
            enemy_hit_dist_sq: ENEMY_HIT_DIST_SQ,
            fragment_retries: FRAGMENT_RETRIES,
            salt: SALT,
        }
    }
}

impl Tuning {
    /// Parse an override document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.grid_w < 2 || self.grid_h < 2 {
            return Err(TuningError::GridTooSmall {
                w: self.grid_w,
                h: self.grid_h,
            });
        }
        for (field, value) in [
            ("move_interval", self.move_interval),
            ("spawn_interval", self.spawn_interval),
            ("max_dt", self.max_dt),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("enemy_speed", self.enemy_speed),
            ("enemy_hit_dist_sq", self.enemy_hit_dist_sq),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Grid center cell
    pub fn center(&self) -> (i32, i32) {
        (self.grid_w / 2, self.grid_h / 2)
    }
}
