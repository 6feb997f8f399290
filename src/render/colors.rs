//! Color utilities for grid and overlay rendering.
//!
//! Colors travel as CSS strings, which Canvas 2D consumes directly.

/// RGB color parsed from a `#RRGGBB` palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse from a hex string (with or without #).
    /// Returns None if the format is invalid.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        Some(Self { r, g, b })
    }

    /// CSS `rgba()` with the given alpha (clamped to 0.0..=1.0).
    pub fn to_rgba(self, alpha: f64) -> String {
        format!(
            "rgba({}, {}, {}, {:.2})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }
}

/// Translucent fill for a stroke color; falls back to the color itself when
/// it is not a plain hex value.
pub fn translucent(color: &str, alpha: f64) -> String {
    Rgb::from_hex(color).map_or_else(|| color.to_string(), |rgb| rgb.to_rgba(alpha))
}

/// Fixed colors of the grid chrome.
pub mod palette {
    pub const WHITE: &str = "#FFFFFF";
    pub const TEXT: &str = "#202124";

    /// Grid line color
    pub const GRID_LINE: &str = "#E0E0E0";

    /// Header strip background and text
    pub const HEADER_BG: &str = "#F8F9FA";
    pub const HEADER_TEXT: &str = "#5F6368";
    pub const HEADER_BORDER: &str = "#DADCE0";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_from_hex() {
        assert_eq!(translucent("#16A34A", 0.2), "rgba(22, 163, 74, 0.20)");
    }

    #[test]
    fn test_non_hex_passthrough() {
        assert_eq!(translucent("rebeccapurple", 0.5), "rebeccapurple");
    }

    #[test]
    fn test_from_hex_rejects_short_values() {
        assert_eq!(Rgb::from_hex("#FFF"), None);
        assert_eq!(Rgb::from_hex("16a34a"), Some(Rgb { r: 22, g: 163, b: 74 }));
    }
}
