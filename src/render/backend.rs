//! Render backend trait for pluggable rendering implementations.
//!
//! The session builds backend-agnostic frames; a backend only paints them.
//! Canvas 2D paints in the browser, the text backend paints for the CLI and
//! for tests.

use crate::error::Result;
use crate::overlay::{CanvasSize, OverlayShape};

use super::GridFrame;

/// Trait for render backends
pub trait RenderBackend {
    /// Resize the render surface
    fn resize(&mut self, width: u32, height: u32);

    /// Paint the visible window of the grid.
    fn draw_grid(&mut self, frame: &GridFrame) -> Result<()>;

    /// Paint the overlay boxes of the current page, projected for a page of
    /// `canvas` size. `shapes` is already in paint order.
    fn draw_overlay(
        &mut self,
        page: u32,
        canvas: CanvasSize,
        shapes: &[OverlayShape],
    ) -> Result<()>;

    /// Get the current width
    fn width(&self) -> u32;

    /// Get the current height
    fn height(&self) -> u32;
}
