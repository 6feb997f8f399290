//! Logical extent and uniform cell geometry of the virtualized grid.
//!
//! The grid never materializes rows or columns: every position is computed
//! from the extent and the zoomed cell size, so a 50k x 20k sheet costs the
//! same as a 10 x 10 one.

use super::ViewportState;
use crate::config::ViewerConfig;
use crate::overlay::BoundingBox;
use crate::types::{Address, SheetMeta};

/// Extra rows/cols to include around the viewport to reduce popping during scroll.
pub const VISIBLE_PADDING: u32 = 1;

/// Rectangle of a cell in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Geometry of one sheet at one zoom level.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Rows in the logical extent (declared rows + buffer)
    pub rows: u32,
    /// Columns in the logical extent (declared cols + buffer)
    pub cols: u32,
    /// Rows the metadata declared
    pub declared_rows: u32,
    /// Columns the metadata declared
    pub declared_cols: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    pub font_size: f64,
    pub zoom_percent: u32,
    base_cell_width: f64,
    base_cell_height: f64,
    base_font_size: f64,
}

/// Index of the cell containing `pos` along one axis, clamped to `[0, count)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn index_at(pos: f64, size: f64, count: u32) -> u32 {
    if size <= 0.0 || count == 0 {
        return 0;
    }
    let idx = (pos / size).floor().max(0.0) as u32;
    idx.min(count - 1)
}

impl GridLayout {
    pub fn new(meta: &SheetMeta, config: &ViewerConfig, zoom_percent: u32) -> Self {
        let rows = meta.rows.saturating_add(config.extent_buffer).max(1);
        let cols = meta.cols.saturating_add(config.extent_buffer).max(1);
        let mut layout = Self {
            rows,
            cols,
            declared_rows: meta.rows,
            declared_cols: meta.cols,
            cell_width: 0.0,
            cell_height: 0.0,
            font_size: 0.0,
            zoom_percent: 0,
            base_cell_width: config.base_cell_width,
            base_cell_height: config.base_cell_height,
            base_font_size: config.base_font_size,
        };
        layout.set_zoom(zoom_percent);
        layout
    }

    /// Recompute cell and font size for a zoom level.
    pub fn set_zoom(&mut self, zoom_percent: u32) {
        let scale = f64::from(zoom_percent) / 100.0;
        self.zoom_percent = zoom_percent;
        self.cell_width = self.base_cell_width * scale;
        self.cell_height = self.base_cell_height * scale;
        self.font_size = self.base_font_size * scale;
    }

    pub fn content_width(&self) -> f64 {
        f64::from(self.cols) * self.cell_width
    }

    pub fn content_height(&self) -> f64 {
        f64::from(self.rows) * self.cell_height
    }

    /// Bounds of a cell in content coordinates.
    pub fn cell_rect(&self, addr: Address) -> CellRect {
        let (row, col) = addr.zero_based();
        CellRect {
            x: f64::from(col) * self.cell_width,
            y: f64::from(row) * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    /// Cell under a content-space point, if inside the extent.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<Address> {
        if x < 0.0 || y < 0.0 || x >= self.content_width() || y >= self.content_height() {
            return None;
        }
        let col = index_at(x, self.cell_width, self.cols);
        let row = index_at(y, self.cell_height, self.rows);
        Some(Address::from_zero_based(row, col))
    }

    /// Whether `addr` falls inside the logical extent.
    pub fn contains(&self, addr: Address) -> bool {
        addr.row <= self.rows && addr.col <= self.cols
    }

    /// Visible rows as a 1-based inclusive range, padded by [`VISIBLE_PADDING`].
    pub fn visible_rows(&self, viewport: &ViewportState) -> (u32, u32) {
        let first = index_at(viewport.scroll_top, self.cell_height, self.rows);
        let last = index_at(
            viewport.scroll_top + viewport.height,
            self.cell_height,
            self.rows,
        );
        (
            first.saturating_sub(VISIBLE_PADDING) + 1,
            (last + VISIBLE_PADDING).min(self.rows - 1) + 1,
        )
    }

    /// Visible columns as a 1-based inclusive range, padded by [`VISIBLE_PADDING`].
    pub fn visible_cols(&self, viewport: &ViewportState) -> (u32, u32) {
        let first = index_at(viewport.scroll_left, self.cell_width, self.cols);
        let last = index_at(
            viewport.scroll_left + viewport.width,
            self.cell_width,
            self.cols,
        );
        (
            first.saturating_sub(VISIBLE_PADDING) + 1,
            (last + VISIBLE_PADDING).min(self.cols - 1) + 1,
        )
    }

    /// A cell as a box normalized to the grid content size, so cell highlights
    /// share the overlay projection.
    pub fn cell_bbox(&self, addr: Address) -> Option<BoundingBox> {
        if !self.contains(addr) {
            return None;
        }
        let rect = self.cell_rect(addr);
        let (w, h) = (self.content_width(), self.content_height());
        BoundingBox::new(
            rect.x / w,
            rect.y / h,
            (rect.x + rect.width) / w,
            (rect.y + rect.height) / h,
        )
    }

    /// Translation applied to the header strips: they follow the content
    /// scroll instead of keeping scroll state of their own.
    pub fn header_offsets(viewport: &ViewportState) -> (f64, f64) {
        (-viewport.scroll_left, -viewport.scroll_top)
    }
}
