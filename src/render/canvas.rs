//! Canvas 2D backend.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::colors::{palette, translucent};
use super::{GridFrame, RenderBackend};
use crate::error::{AuditViewError, Result};
use crate::overlay::{CanvasSize, OverlayShape};

const FONT_STACK: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: u32,
    height: u32,
    row_header_width: f64,
    col_header_height: f64,
}

impl CanvasRenderer {
    /// Create a renderer for `canvas`. Header sizes are zero for the overlay
    /// canvas.
    pub fn new(
        canvas: HtmlCanvasElement,
        row_header_width: f64,
        col_header_height: f64,
    ) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|_| AuditViewError::Render("failed to get 2d context".to_string()))?
            .ok_or_else(|| AuditViewError::Render("no 2d context available".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| AuditViewError::Render("not a 2d context".to_string()))?;
        let width = canvas.width();
        let height = canvas.height();
        Ok(Self {
            canvas,
            ctx,
            width,
            height,
            row_header_width,
            col_header_height,
        })
    }

    /// Helper to get crisp pixel position for 1px lines
    fn crisp(x: f64) -> f64 {
        x.floor() + 0.5
    }

    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_line(&self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(1.0);
        self.ctx.move_to(Self::crisp(x1), Self::crisp(y1));
        self.ctx.line_to(Self::crisp(x2), Self::crisp(y2));
        self.ctx.stroke();
    }

    fn clip_to(&self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.begin_path();
        self.ctx.rect(x, y, w, h);
        self.ctx.clip();
    }

    fn draw_cells(&self, frame: &GridFrame) {
        let (ox, oy) = (self.row_header_width, self.col_header_height);
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        self.ctx.save();
        self.clip_to(ox, oy, w - ox, h - oy);

        for hl in &frame.highlights {
            let r = hl.rect;
            self.fill_rect(ox + r.x, oy + r.y, r.width, r.height, &translucent(&hl.color, 0.6));
        }

        for cell in &frame.cells {
            let r = cell.rect;
            let (left, top) = (ox + r.x, oy + r.y);
            let (right, bottom) = (left + r.width, top + r.height);
            self.stroke_line(left, bottom, right, bottom, palette::GRID_LINE);
            self.stroke_line(right, top, right, bottom, palette::GRID_LINE);
        }

        self.ctx.set_font(&format!("{:.0}px {FONT_STACK}", frame.font_size));
        self.ctx.set_text_align("left");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(palette::TEXT);
        for cell in frame.cells.iter().filter(|c| !c.text.is_empty()) {
            let r = cell.rect;
            self.ctx.save();
            self.clip_to(ox + r.x, oy + r.y, r.width, r.height);
            let _ = self.ctx.fill_text(&cell.text, ox + r.x + 4.0, oy + r.y + r.height / 2.0);
            self.ctx.restore();
        }

        for hl in frame.highlights.iter().filter(|h| h.active) {
            let r = hl.rect;
            self.ctx.set_stroke_style_str(&hl.color);
            self.ctx.set_line_width(2.0);
            self.ctx.stroke_rect(ox + r.x, oy + r.y, r.width, r.height);
        }
        self.ctx.restore();
    }

    fn draw_headers(&self, frame: &GridFrame) {
        let (ox, oy) = (self.row_header_width, self.col_header_height);
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        self.ctx.set_font(&format!("500 11px {FONT_STACK}"));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");

        self.ctx.save();
        self.clip_to(ox, 0.0, w - ox, oy);
        self.fill_rect(ox, 0.0, w - ox, oy, palette::HEADER_BG);
        for header in &frame.col_headers {
            let x = ox + header.offset;
            self.stroke_line(x + header.size, 0.0, x + header.size, oy, palette::HEADER_BORDER);
            self.ctx.set_fill_style_str(palette::HEADER_TEXT);
            let _ = self.ctx.fill_text(&header.label, x + header.size / 2.0, oy / 2.0);
        }
        self.ctx.restore();

        self.ctx.save();
        self.clip_to(0.0, oy, ox, h - oy);
        self.fill_rect(0.0, oy, ox, h - oy, palette::HEADER_BG);
        for header in &frame.row_headers {
            let y = oy + header.offset;
            self.stroke_line(0.0, y + header.size, ox, y + header.size, palette::HEADER_BORDER);
            self.ctx.set_fill_style_str(palette::HEADER_TEXT);
            let _ = self.ctx.fill_text(&header.label, ox / 2.0, y + header.size / 2.0);
        }
        self.ctx.restore();

        self.fill_rect(0.0, 0.0, ox, oy, palette::HEADER_BG);
    }
}

impl RenderBackend for CanvasRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn draw_grid(&mut self, frame: &GridFrame) -> Result<()> {
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        self.fill_rect(0.0, 0.0, w, h, palette::WHITE);
        self.draw_cells(frame);
        self.draw_headers(frame);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw_overlay(
        &mut self,
        _page: u32,
        canvas: CanvasSize,
        shapes: &[OverlayShape],
    ) -> Result<()> {
        let (w, h) = (canvas.width.round().max(0.0) as u32, canvas.height.round().max(0.0) as u32);
        if (w, h) != (self.width, self.height) {
            self.resize(w, h);
        }
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(self.width), f64::from(self.height));
        for shape in shapes {
            let r = shape.rect;
            self.fill_rect(r.x, r.y, r.width, r.height, &shape.style.fill);
            self.ctx.set_stroke_style_str(&shape.style.stroke);
            self.ctx.set_line_width(shape.style.line_width);
            self.ctx.stroke_rect(r.x, r.y, r.width, r.height);
            if let Some(bar) = shape.confidence_bar {
                self.fill_rect(bar.x, bar.y, bar.width, bar.height, &shape.style.stroke);
            }
        }
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
