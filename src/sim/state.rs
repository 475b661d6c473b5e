//! Run state and the small entity types owned by the simulation

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Run state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Before the first run
    Menu,
    /// Active gameplay
    Playing,
    /// Simulation frozen, rendering continues
    Paused,
    /// Bounds, self or enemy collision
    GameOver,
    /// Score was mutated outside the sanctioned path
    IntegrityViolation,
}

impl RunState {
    /// Whether the run has ended (either way)
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::GameOver | RunState::IntegrityViolation)
    }

    /// Overlay title for the HUD
    pub fn title(self) -> &'static str {
        match self {
            RunState::Menu => "GLITCH GRID",
            RunState::Playing => "",
            RunState::Paused => "PAUSED",
            RunState::GameOver => "CRITICAL FAILURE",
            RunState::IntegrityViolation => "SECURITY BREACH",
        }
    }

    /// Overlay status line for the HUD
    pub fn status(self) -> &'static str {
        match self {
            RunState::Menu => "PRESS START",
            RunState::Playing => "",
            RunState::Paused => "SUSPENDED",
            RunState::GameOver => "SYSTEM CRASHED",
            RunState::IntegrityViolation => "INTEGRITY COMPROMISED",
        }
    }
}

/// A pursuing enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub active: bool,
}

impl Enemy {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            active: false,
        }
    }

    /// Pool reinitialization routine
    pub fn reactivate(&mut self) {
        self.pos = Vec2::ZERO;
        self.active = true;
    }
}

/// The single active collectible
#[derive(Debug, Clone, Copy, Default)]
pub struct Fragment {
    pub pos: IVec2,
    pub active: bool,
}

/// Why a run ended by collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crash {
    Bounds,
    SelfHit,
    Enemy,
}

/// Notable simulation events, drained by the host for HUD and announcements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    RunStarted,
    Paused,
    Resumed,
    FragmentCollected { score: u32 },
    GameOver { score: u32, cause: Crash, new_high_score: bool },
    IntegrityViolation { score: u32 },
}

impl GameEvent {
    /// Screen-reader friendly description
    pub fn announcement(&self) -> String {
        match self {
            GameEvent::RunStarted => "Game Started. Good Luck.".to_string(),
            GameEvent::Paused => "Game Paused".to_string(),
            GameEvent::Resumed => "Resuming Game".to_string(),
            GameEvent::FragmentCollected { score } => format!("Fragment collected. Score {score}"),
            GameEvent::GameOver { score, .. } => format!(
                "{}. {}. Final Data: {score}",
                RunState::GameOver.title(),
                RunState::GameOver.status()
            ),
            GameEvent::IntegrityViolation { score } => format!(
                "{}. {}. Final Data: {score}",
                RunState::IntegrityViolation.title(),
                RunState::IntegrityViolation.status()
            ),
        }
    }
}
