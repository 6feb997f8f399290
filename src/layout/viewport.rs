//! Viewport state management for scrolling and zoom.

use serde::Serialize;

/// Default zoom level in percent.
pub const DEFAULT_ZOOM_PERCENT: u32 = 100;

/// Viewport state - the visible pixel window into the grid.
///
/// Scroll offsets are in pixels of the zoomed content, so a zoom change must
/// rescale them (see [`ViewportState::rescale_scroll`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewportState {
    /// Zoom in percent (50..=200 with the default config)
    pub zoom_percent: u32,
    /// Horizontal scroll position in content pixels
    pub scroll_left: f64,
    /// Vertical scroll position in content pixels
    pub scroll_top: f64,
    /// Viewport width in pixels (content area, excluding headers)
    pub width: f64,
    /// Viewport height in pixels (content area, excluding headers)
    pub height: f64,
    /// Page shown by the paired raster viewer (1-based)
    pub current_page: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportState {
    /// Create a new viewport with default values
    pub fn new() -> Self {
        Self {
            zoom_percent: DEFAULT_ZOOM_PERCENT,
            scroll_left: 0.0,
            scroll_top: 0.0,
            width: 800.0,
            height: 600.0,
            current_page: 1,
        }
    }

    /// Zoom as a scale factor (1.0 = 100%)
    pub fn scale(&self) -> f64 {
        f64::from(self.zoom_percent) / 100.0
    }

    /// Back to the initial zoom/scroll/page, keeping the measured size.
    pub fn reset(&mut self) {
        *self = Self {
            width: self.width,
            height: self.height,
            ..Self::new()
        };
    }

    /// Convert content coordinates to screen coordinates
    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.scroll_left, y - self.scroll_top)
    }

    /// Largest scroll offsets that still show content at the far edge.
    pub fn max_scroll(&self, content_width: f64, content_height: f64) -> (f64, f64) {
        (
            (content_width - self.width).max(0.0),
            (content_height - self.height).max(0.0),
        )
    }

    /// Clamp scroll position to valid range.
    pub fn clamp_scroll(&mut self, content_width: f64, content_height: f64) {
        let (max_x, max_y) = self.max_scroll(content_width, content_height);
        self.scroll_left = self.scroll_left.clamp(0.0, max_x);
        self.scroll_top = self.scroll_top.clamp(0.0, max_y);
    }

    /// Set absolute scroll position. Returns whether it moved.
    pub fn set_scroll(&mut self, x: f64, y: f64, content_width: f64, content_height: f64) -> bool {
        let before = (self.scroll_left, self.scroll_top);
        self.scroll_left = if x.is_finite() { x } else { 0.0 };
        self.scroll_top = if y.is_finite() { y } else { 0.0 };
        self.clamp_scroll(content_width, content_height);
        (self.scroll_left - before.0).abs() > f64::EPSILON
            || (self.scroll_top - before.1).abs() > f64::EPSILON
    }

    /// Scroll by delta amounts. Returns whether it moved.
    pub fn scroll_by(&mut self, dx: f64, dy: f64, content_width: f64, content_height: f64) -> bool {
        self.set_scroll(
            self.scroll_left + dx,
            self.scroll_top + dy,
            content_width,
            content_height,
        )
    }

    /// Keep the same content under the top-left corner across a zoom change.
    pub fn rescale_scroll(&mut self, old_zoom: u32, new_zoom: u32) {
        if old_zoom == 0 {
            return;
        }
        let ratio = f64::from(new_zoom) / f64::from(old_zoom);
        self.scroll_left *= ratio;
        self.scroll_top *= ratio;
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }
}
