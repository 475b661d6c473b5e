//! Score bookkeeping with a tamper-evident shadow copy
//!
//! The shadow is `score ^ salt`. It is obfuscation, not cryptography: it
//! only catches writes that bypass `add`.

/// Score plus its XOR shadow
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    /// Current score. Writing this directly (instead of via `add`) is
    /// detected by `verify`.
    pub score: u32,
    shadow: u32,
    salt: u32,
    max_increment: u32,
}

impl ScoreTracker {
    pub fn new(salt: u32, max_increment: u32) -> Self {
        Self {
            score: 0,
            shadow: salt,
            salt,
            max_increment,
        }
    }

    /// The only sanctioned way to raise the score. Increments above the
    /// per-collection value are ignored. Returns whether it was applied.
    pub fn add(&mut self, value: u32) -> bool {
        if value > self.max_increment {
            log::warn!("Rejected score increment of {value}");
            return false;
        }
        self.score = self.score.saturating_add(value);
        self.shadow = self.score ^ self.salt;
        true
    }

    /// Whether score and shadow still agree
    pub fn verify(&self) -> bool {
        self.score ^ self.salt == self.shadow
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.shadow = self.salt;
    }
}
