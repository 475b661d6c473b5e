//! HTML canvas 2D renderer

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Renderer, Shape, pulse_radius};
use crate::consts::colors;
use crate::error::EngineError;

/// Draws the board onto a `<canvas>` sized to the grid
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    tile: f32,
    show_grid: bool,
}

impl CanvasRenderer {
    /// Bind to the canvas with id `canvas_id` and size it to `grid_w` x
    /// `grid_h` tiles. Fails if the element or its 2D context is missing.
    pub fn new(
        canvas_id: &str,
        grid_w: i32,
        grid_h: i32,
        tile: f32,
        show_grid: bool,
    ) -> Result<Self, EngineError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(EngineError::NoWindow)?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| EngineError::SurfaceMissing(canvas_id.to_string()))?;

        let width = (grid_w as f32 * tile) as u32;
        let height = (grid_h as f32 * tile) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| EngineError::ContextUnavailable(canvas_id.to_string()))?;

        log::info!("Canvas `{canvas_id}` bound at {width}x{height}");

        Ok(Self {
            ctx,
            width: width as f64,
            height: height as f64,
            tile,
            show_grid,
        })
    }

    pub fn set_show_grid(&mut self, show_grid: bool) {
        self.show_grid = show_grid;
    }
}

impl Renderer for CanvasRenderer {
    fn clear(&mut self) {
        self.ctx.set_fill_style_str(colors::BG);
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);

        if !self.show_grid {
            return;
        }

        self.ctx.set_stroke_style_str(colors::GRID);
        self.ctx.set_line_width(1.0);
        self.ctx.begin_path();
        let t = self.tile as f64;
        let mut x = 0.0;
        while x <= self.width {
            self.ctx.move_to(x, 0.0);
            self.ctx.line_to(x, self.height);
            x += t;
        }
        let mut y = 0.0;
        while y <= self.height {
            self.ctx.move_to(0.0, y);
            self.ctx.line_to(self.width, y);
            y += t;
        }
        self.ctx.stroke();
    }

    fn draw_entity(&mut self, x: f32, y: f32, color: &str, shape: Shape, phase: f32) {
        let t = self.tile as f64;
        let px = x as f64 * t;
        let py = y as f64 * t;

        self.ctx.set_fill_style_str(color);
        match shape {
            Shape::Rect => self.ctx.fill_rect(px + 1.0, py + 1.0, t - 2.0, t - 2.0),
            Shape::Circle => {
                let r = pulse_radius(self.tile, phase) as f64;
                self.ctx.begin_path();
                let _ = self
                    .ctx
                    .arc(px + t / 2.0, py + t / 2.0, r, 0.0, std::f64::consts::TAU);
                self.ctx.fill();
            }
        }
    }

    fn draw_particle(&mut self, x: f32, y: f32, scale: f32, alpha: f32, color: &str) {
        let t = self.tile as f64;
        let size = scale as f64 * t * 0.4;

        self.ctx.set_global_alpha(crate::clamp(alpha, 0.0, 1.0) as f64);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x as f64 * t, y as f64 * t, size, size);
        self.ctx.set_global_alpha(1.0);
    }
}
