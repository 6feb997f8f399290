//! Layout engine for the virtualized grid.
//!
//! This module handles:
//! - Logical extent and zoomed cell geometry
//! - Viewport state (scroll position, zoom, visible range)
//! - Planning which tiles the visible region needs
//! - Centering a target cell or bounding box

mod grid;
mod preload;
mod scroll;
mod viewport;

pub use grid::{CellRect, GridLayout, VISIBLE_PADDING};
pub use preload::{plan_tiles, plan_visible, tile_origin};
pub use scroll::{center_offset, ScrollCoordinator, ScrollTarget};
pub use viewport::{ViewportState, DEFAULT_ZOOM_PERCENT};
