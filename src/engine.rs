//! Frame driver
//!
//! Owns the simulation together with its renderer and clock. The host calls
//! `frame()` once per display refresh; the first frame after a (re)start
//! advances by zero.

use glam::Vec2;

use crate::platform::Clock;
use crate::renderer::Renderer;
use crate::sim::{GameEvent, Simulation};

pub struct Engine<R: Renderer, C: Clock> {
    pub sim: Simulation,
    renderer: R,
    clock: C,
    last_time: Option<f64>,
}

impl<R: Renderer, C: Clock> Engine<R, C> {
    pub fn new(sim: Simulation, renderer: R, clock: C) -> Self {
        Self {
            sim,
            renderer,
            clock,
            last_time: None,
        }
    }

    /// Advance by the wall time since the previous frame, draw, and return
    /// the events raised along the way
    pub fn frame(&mut self) -> Vec<GameEvent> {
        let now = self.clock.now_ms();
        let dt = match self.last_time {
            Some(last) => ((now - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(now);

        self.sim.advance(dt);
        self.sim.render(&mut self.renderer);
        self.sim.drain_events()
    }

    /// Begin a new run
    pub fn start(&mut self) {
        self.sim.start();
        self.last_time = None;
    }

    /// Feed a key press, timestamped by the engine clock
    pub fn key_down(&mut self, code: &str) -> bool {
        let now = self.clock.now_ms();
        self.sim.input_mut().key_down(code, now)
    }

    /// Feed a completed touch gesture
    pub fn swipe(&mut self, start: Vec2, end: Vec2) -> bool {
        self.sim.input_mut().swipe(start, end)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
