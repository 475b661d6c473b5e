//! 2D rendering collaborator
//!
//! The simulation draws through `Renderer` in grid units; implementations
//! scale to pixels. On the web, `CanvasRenderer` targets a 2D canvas context.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;

/// Entity silhouette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Inset square filling one tile
    Rect,
    /// Circle whose radius pulses with `phase`
    Circle,
}

/// Drawing surface. Calls are synchronous and must not reenter the simulation.
pub trait Renderer {
    /// Wipe the surface (background and grid)
    fn clear(&mut self);

    /// Draw one tile-sized entity at grid coordinates `(x, y)`
    fn draw_entity(&mut self, x: f32, y: f32, color: &str, shape: Shape, phase: f32);

    /// Draw a particle square scaled by `scale` (0..=1) at opacity `alpha`
    fn draw_particle(&mut self, x: f32, y: f32, scale: f32, alpha: f32, color: &str);
}

/// Circle radius in pixels for a pulsing entity on a `tile`-pixel grid
#[inline]
pub fn pulse_radius(tile: f32, phase: f32) -> f32 {
    (tile / 2.0 - 2.0) + phase.sin() * 2.0
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A recorded draw call
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum DrawCall {
        Clear,
        Entity { x: f32, y: f32, color: String, shape: Shape },
        Particle { x: f32, y: f32 },
    }

    /// Renderer that records calls instead of drawing
    #[derive(Debug, Default)]
    pub(crate) struct RecordingRenderer {
        pub calls: Vec<DrawCall>,
    }

    impl RecordingRenderer {
        pub fn entities(&self, color: &str) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, DrawCall::Entity { color: c, .. } if c == color))
                .count()
        }
    }

    impl Renderer for RecordingRenderer {
        fn clear(&mut self) {
            self.calls.push(DrawCall::Clear);
        }

        fn draw_entity(&mut self, x: f32, y: f32, color: &str, shape: Shape, _phase: f32) {
            self.calls.push(DrawCall::Entity {
                x,
                y,
                color: color.to_string(),
                shape,
            });
        }

        fn draw_particle(&mut self, x: f32, y: f32, _scale: f32, _alpha: f32, _color: &str) {
            self.calls.push(DrawCall::Particle { x, y });
        }
    }

    #[test]
    fn test_pulse_radius_range() {
        let tile = 20.0;
        for i in 0..32 {
            let r = pulse_radius(tile, i as f32 * 0.4);
            assert!((6.0..=10.0 + 1e-4).contains(&r));
        }
    }
}
