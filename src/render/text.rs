//! Plain-text backend used by the CLI.
//!
//! Paints a frame as a fixed-width table. Highlighted cells are wrapped in
//! `[...]`, the active finding's cells in `<...>`.

use std::fmt::Write;

use crate::error::Result;
use crate::overlay::{CanvasSize, OverlayShape, VisualState};

use super::{GridFrame, RenderBackend};

const ROW_LABEL_WIDTH: usize = 6;

pub struct TextRenderer {
    column_width: usize,
    width: u32,
    height: u32,
    grid: String,
    overlay: String,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(12)
    }
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{text:<width$}")
    } else {
        let mut s: String = text.chars().take(width.saturating_sub(1)).collect();
        s.push('~');
        s
    }
}

impl TextRenderer {
    pub fn new(column_width: usize) -> Self {
        Self {
            column_width: column_width.max(4),
            width: 0,
            height: 0,
            grid: String::new(),
            overlay: String::new(),
        }
    }

    /// Last painted grid.
    pub fn grid(&self) -> &str {
        &self.grid
    }

    /// Last painted overlay listing.
    pub fn overlay(&self) -> &str {
        &self.overlay
    }
}

impl RenderBackend for TextRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn draw_grid(&mut self, frame: &GridFrame) -> Result<()> {
        let w = self.column_width;
        let mut out = String::new();
        let _ = writeln!(out, "[{}]", frame.sheet);
        let _ = write!(out, "{:>ROW_LABEL_WIDTH$} ", "");
        for header in &frame.col_headers {
            let _ = write!(out, "{} ", fit(&header.label, w));
        }
        out.push('\n');

        for header in &frame.row_headers {
            let _ = write!(out, "{:>ROW_LABEL_WIDTH$} ", header.label);
            for cell in frame.cells.iter().filter(|c| c.address.row == header.index) {
                let mark = frame
                    .highlights
                    .iter()
                    .filter(|h| h.address == cell.address)
                    .map(|h| h.active)
                    .max();
                let text = match mark {
                    Some(true) => format!("<{}>", cell.text),
                    Some(false) => format!("[{}]", cell.text),
                    None => cell.text.clone(),
                };
                let _ = write!(out, "{} ", fit(&text, w));
            }
            out.push('\n');
        }
        self.grid = out;
        Ok(())
    }

    fn draw_overlay(
        &mut self,
        page: u32,
        canvas: CanvasSize,
        shapes: &[OverlayShape],
    ) -> Result<()> {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "page {page} ({:.0}x{:.0}): {} box(es)",
            canvas.width,
            canvas.height,
            shapes.len()
        );
        for shape in shapes {
            let state = match shape.state {
                VisualState::Default => "",
                VisualState::Hovered => " (hovered)",
                VisualState::Selected => " (selected)",
            };
            let r = shape.rect;
            let _ = writeln!(
                out,
                "  {} at {:.0},{:.0} {:.0}x{:.0} {}{state}",
                shape.id, r.x, r.y, r.width, r.height, shape.style.stroke
            );
        }
        self.overlay = out;
        Ok(())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
