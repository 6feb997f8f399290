//! Rendering with pluggable backends.
//!
//! This module provides:
//! - The frame builder for the visible grid window
//! - A Canvas 2D backend (wasm32)
//! - A plain-text backend (CLI, tests)
//! - Color utilities

pub mod backend;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod colors;
pub mod grid;
pub mod text;

pub use backend::RenderBackend;
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use colors::palette;
pub use grid::{build_frame, CellPaint, GridFrame, GridParams, HeaderPaint, HighlightPaint};
pub use text::TextRenderer;
