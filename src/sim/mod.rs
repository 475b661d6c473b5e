//! Simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (`Pcg32`), so runs replay from a seed
//! - Stable iteration order (enemies by spawn order)
//! - Rendering, audio and storage only through collaborator traits

pub mod collision;
pub mod particles;
pub mod player;
pub mod pool;
pub mod score;
pub mod state;
pub mod tick;

pub use particles::{ParticleSystem, ParticleView};
pub use player::Player;
pub use pool::Pool;
pub use score::ScoreTracker;
pub use state::{Crash, Enemy, Fragment, GameEvent, RunState};
pub use tick::Simulation;
