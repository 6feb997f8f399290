//! Interactive annotations over the raster page and the grid.
//!
//! Boxes live in normalized `[0, 1]` page space and are projected to pixels
//! on every redraw.

mod bbox;
mod engine;
pub mod style;

pub use bbox::{BoundingBox, CanvasSize, PixelRect, FALLBACK_BOX, MIN_BOX_EXTENT};
pub use engine::{OverlayBox, OverlayEngine, OverlayShape};
pub use style::{BoxStyle, ConfidenceTier, VisualState};
