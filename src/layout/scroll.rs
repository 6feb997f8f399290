//! Centering a target cell or bounding box in the viewport.
//!
//! All functions are pure: the same target, zoom, and viewport always yield
//! the same offsets.

use serde::Serialize;

use super::{GridLayout, ViewportState};
use crate::overlay::{BoundingBox, CanvasSize};

/// Scroll offsets to apply.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScrollTarget {
    pub left: f64,
    pub top: f64,
}

/// Offset along one axis that centers the cell at 0-based `index`.
///
/// `index * cell - max(0, viewport/2 - cell/2)`, clamped to
/// `[0, max(0, content - viewport)]`.
pub fn center_offset(index: u32, cell: f64, viewport: f64, content: f64) -> f64 {
    let raw = f64::from(index) * cell - (viewport / 2.0 - cell / 2.0).max(0.0);
    raw.clamp(0.0, (content - viewport).max(0.0))
}

/// Offset along one axis that centers the span `[start, end]`.
fn center_span(start: f64, end: f64, viewport: f64, content: f64) -> f64 {
    let raw = (start + end) / 2.0 - viewport / 2.0;
    raw.clamp(0.0, (content - viewport).max(0.0))
}

pub struct ScrollCoordinator;

impl ScrollCoordinator {
    /// Offsets that bring `target` (1-based) into the center of the grid viewport.
    pub fn to_cell(
        layout: &GridLayout,
        viewport: &ViewportState,
        target: crate::types::Address,
    ) -> ScrollTarget {
        let (row, col) = target.zero_based();
        ScrollTarget {
            left: center_offset(
                col,
                layout.cell_width,
                viewport.width,
                layout.content_width(),
            ),
            top: center_offset(
                row,
                layout.cell_height,
                viewport.height,
                layout.content_height(),
            ),
        }
    }

    /// Offsets that center a bounding box on a raster page rendered at
    /// `canvas` size inside a `viewport_width` x `viewport_height` window.
    pub fn to_box(
        bbox: &BoundingBox,
        canvas: CanvasSize,
        viewport_width: f64,
        viewport_height: f64,
    ) -> ScrollTarget {
        let rect = bbox.project(canvas);
        ScrollTarget {
            left: center_span(rect.x, rect.x + rect.width, viewport_width, canvas.width),
            top: center_span(rect.y, rect.y + rect.height, viewport_height, canvas.height),
        }
    }
}
