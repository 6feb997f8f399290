//! Viewer configuration.
//!
//! Every field has a default, so a host may pass `{}` or only the keys it
//! wants to override. In the browser the object arrives through
//! `serde-wasm-bindgen`; the CLI reads it from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuditViewError, Result};

/// Zoom bounds in percent.
pub const MIN_ZOOM_PERCENT: u32 = 50;
pub const MAX_ZOOM_PERCENT: u32 = 200;

/// How a pointer resolves when several overlay boxes contain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitPolicy {
    /// First box in list order.
    #[default]
    FirstInList,
    /// Box with the smallest area, ties broken by list order.
    SmallestArea,
}

/// Overlay colors (CSS strings, used as-is by Canvas 2D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayPalette {
    pub high: String,
    pub medium: String,
    pub low: String,
    pub unknown: String,
    pub hovered: String,
    pub selected: String,
    pub cell_highlight: String,
    pub active_cell_highlight: String,
}

impl Default for OverlayPalette {
    fn default() -> Self {
        Self {
            high: "#16A34A".to_string(),
            medium: "#D97706".to_string(),
            low: "#DC2626".to_string(),
            unknown: "#6B7280".to_string(),
            hovered: "#2563EB".to_string(),
            selected: "#7C3AED".to_string(),
            cell_highlight: "#FDE68A".to_string(),
            active_cell_highlight: "#F59E0B".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Rows per fetched tile.
    pub tile_rows: u32,
    /// Columns per fetched tile.
    pub tile_cols: u32,
    /// Cell width at 100% zoom (logical pixels).
    pub base_cell_width: f64,
    /// Cell height at 100% zoom (logical pixels).
    pub base_cell_height: f64,
    /// Font size at 100% zoom.
    pub base_font_size: f64,
    /// Rows/cols added to the declared sheet size to absorb metadata drift.
    pub extent_buffer: u32,
    pub min_zoom: u32,
    pub max_zoom: u32,
    pub zoom_step: u32,
    /// Width of the row header strip.
    pub row_header_width: f64,
    /// Height of the column header strip.
    pub col_header_height: f64,
    /// Base URL of the spreadsheet endpoints (`meta`, `page`, `spotlight`).
    pub api_base: String,
    pub hit_policy: HitPolicy,
    pub palette: OverlayPalette,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tile_rows: 1000,
            tile_cols: 250,
            base_cell_width: 100.0,
            base_cell_height: 24.0,
            base_font_size: 12.0,
            extent_buffer: 10,
            min_zoom: MIN_ZOOM_PERCENT,
            max_zoom: MAX_ZOOM_PERCENT,
            zoom_step: 10,
            row_header_width: 48.0,
            col_header_height: 24.0,
            api_base: "/api/excel".to_string(),
            hit_policy: HitPolicy::default(),
            palette: OverlayPalette::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON document, then validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::info!("Loaded viewer config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_rows == 0 || self.tile_cols == 0 {
            return Err(AuditViewError::Config(
                "tile dimensions must be non-zero".to_string(),
            ));
        }
        if !(self.base_cell_width > 0.0 && self.base_cell_height > 0.0) {
            return Err(AuditViewError::Config(
                "base cell size must be positive".to_string(),
            ));
        }
        if self.min_zoom == 0 || self.min_zoom > self.max_zoom {
            return Err(AuditViewError::Config(format!(
                "zoom bounds {}..={} are inverted or zero",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }

    /// Clamp a requested zoom into the configured bounds.
    pub fn clamp_zoom(&self, percent: u32) -> u32 {
        percent.clamp(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json(r#"{"tile_rows": 200, "hit_policy": "smallest_area"}"#)
            .unwrap();
        assert_eq!(config.tile_rows, 200);
        assert_eq!(config.tile_cols, 250);
        assert_eq!(config.hit_policy, HitPolicy::SmallestArea);
    }

    #[test]
    fn test_zero_tile_rejected() {
        assert!(ViewerConfig::from_json(r#"{"tile_cols": 0}"#).is_err());
    }

    #[test]
    fn test_inverted_zoom_rejected() {
        assert!(ViewerConfig::from_json(r#"{"min_zoom": 150, "max_zoom": 100}"#).is_err());
    }
}
