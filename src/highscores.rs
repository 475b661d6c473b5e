//! Best-score record
//!
//! Stored as the decimal text of `value ^ SALT` under a fixed key. Unreadable
//! or missing values read as zero.

use crate::persistence::SecureStorage;

/// The best score across runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    pub best: u32,
    salt: u32,
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "egs_prod_high";

    pub fn new(salt: u32) -> Self {
        Self { best: 0, salt }
    }

    /// Check if a score beats the record
    pub fn qualifies(&self, score: u32) -> bool {
        score > self.best
    }

    /// Promote `score` if it beats the record. Returns whether it did.
    pub fn submit(&mut self, score: u32) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        true
    }

    /// Load the record, falling back to zero
    pub fn load(storage: &SecureStorage, salt: u32) -> Self {
        let best = storage
            .load_raw(Self::STORAGE_KEY)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .map(|obfuscated| obfuscated ^ salt)
            .unwrap_or(0);
        if best > 0 {
            log::info!("Loaded high score {best}");
        }
        Self { best, salt }
    }

    /// Persist the record (best effort)
    pub fn save(&self, storage: &mut SecureStorage) {
        let obfuscated = self.best ^ self.salt;
        if storage.save_raw(Self::STORAGE_KEY, &obfuscated.to_string()) {
            log::info!("High score saved ({})", self.best);
        }
    }
}
