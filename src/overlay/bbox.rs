//! Normalized bounding boxes and their projection onto a canvas.

use serde::{Deserialize, Serialize};

/// Smallest extent a sanitized box keeps on either axis.
pub const MIN_BOX_EXTENT: f64 = 0.01;

/// Box used when the input cannot be interpreted at all.
pub const FALLBACK_BOX: [f64; 4] = [0.1, 0.1, 0.2, 0.2];

/// Size of the surface a box is projected onto, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Pixel point as fractions of this canvas; `None` on an empty canvas.
    pub fn normalize_point(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some((x / self.width, y / self.height))
    }
}

/// A projected box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// `[x1, y1, x2, y2]` as fractions of the page, `x1 < x2`, `y1 < y2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = String;

    fn try_from(v: [f64; 4]) -> std::result::Result<Self, Self::Error> {
        let [x1, y1, x2, y2] = v;
        Self::new(x1, y1, x2, y2).ok_or_else(|| format!("invalid bounding box {v:?}"))
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

fn in_unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

impl BoundingBox {
    /// A box whose coordinates are in `[0, 1]` and strictly ordered.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Option<Self> {
        let ok = [x1, y1, x2, y2].iter().all(|v| in_unit(*v)) && x1 < x2 && y1 < y2;
        ok.then_some(Self { x1, y1, x2, y2 })
    }

    /// Repair an extracted box: clamp to the page, reorder inverted corners
    /// and widen degenerate ones. Non-finite input yields [`FALLBACK_BOX`].
    pub fn sanitize(raw: [f64; 4]) -> Self {
        if raw.iter().any(|v| !v.is_finite()) {
            let [x1, y1, x2, y2] = FALLBACK_BOX;
            return Self { x1, y1, x2, y2 };
        }
        let [x1, y1, x2, y2] = raw.map(|v| v.clamp(0.0, 1.0));
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        let (y1, y2) = (y1.min(y2), y1.max(y2));
        let (x1, x2) = widen(x1, x2);
        let (y1, y2) = widen(y1, y2);
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Inclusive containment of a normalized point.
    pub fn contains(&self, fx: f64, fy: f64) -> bool {
        fx >= self.x1 && fx <= self.x2 && fy >= self.y1 && fy <= self.y2
    }

    /// Pixel rectangle on a canvas of the given size.
    pub fn project(&self, canvas: CanvasSize) -> PixelRect {
        PixelRect {
            x: self.x1 * canvas.width,
            y: self.y1 * canvas.height,
            width: self.width() * canvas.width,
            height: self.height() * canvas.height,
        }
    }
}

/// Enforce [`MIN_BOX_EXTENT`] on an ordered pair, growing toward the far
/// edge and backing off when it would leave the page.
fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if hi - lo >= MIN_BOX_EXTENT {
        return (lo, hi);
    }
    let hi = (lo + MIN_BOX_EXTENT).min(1.0);
    let lo = if hi - lo < MIN_BOX_EXTENT {
        hi - MIN_BOX_EXTENT
    } else {
        lo
    };
    (lo, hi)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_rejects_inverted() {
        assert!(serde_json::from_str::<BoundingBox>("[0.3, 0.1, 0.1, 0.2]").is_err());
        let b: BoundingBox = serde_json::from_str("[0.1, 0.1, 0.3, 0.2]").unwrap();
        assert!((b.width() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_widen_at_right_edge() {
        let b = BoundingBox::sanitize([1.0, 0.5, 1.0, 0.6]);
        assert!((b.x2 - 1.0).abs() < 1e-9);
        assert!((b.x1 - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_empty_canvas() {
        assert_eq!(CanvasSize::new(0.0, 10.0).normalize_point(1.0, 1.0), None);
    }
}
