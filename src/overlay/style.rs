//! Stroke and fill of overlay boxes.

use serde::Serialize;

use crate::config::OverlayPalette;
use crate::render::colors::translucent;

use super::PixelRect;

/// Confidence at or above which a box is drawn as high confidence.
pub const HIGH_CONFIDENCE: f64 = 0.8;
/// Confidence at or above which a box is drawn as medium confidence.
pub const MEDIUM_CONFIDENCE: f64 = 0.6;

/// Height of the confidence bar drawn under a box, in pixels.
pub const CONFIDENCE_BAR_HEIGHT: f64 = 4.0;
/// Gap between a box and its confidence bar.
pub const CONFIDENCE_BAR_GAP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
    Unknown,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: Option<f64>) -> Self {
        match confidence {
            Some(c) if c.is_nan() => Self::Unknown,
            Some(c) if c >= HIGH_CONFIDENCE => Self::High,
            Some(c) if c >= MEDIUM_CONFIDENCE => Self::Medium,
            Some(_) => Self::Low,
            None => Self::Unknown,
        }
    }

    pub fn color<'a>(&self, palette: &'a OverlayPalette) -> &'a str {
        match self {
            Self::High => &palette.high,
            Self::Medium => &palette.medium,
            Self::Low => &palette.low,
            Self::Unknown => &palette.unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualState {
    Default,
    Hovered,
    Selected,
}

impl VisualState {
    /// Selected beats hovered beats default.
    pub fn resolve(selected: bool, hovered: bool) -> Self {
        if selected {
            Self::Selected
        } else if hovered {
            Self::Hovered
        } else {
            Self::Default
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStyle {
    pub stroke: String,
    pub fill: String,
    pub line_width: f64,
}

impl BoxStyle {
    pub fn for_box(state: VisualState, confidence: Option<f64>, palette: &OverlayPalette) -> Self {
        let (stroke, line_width, alpha) = match state {
            VisualState::Selected => (palette.selected.as_str(), 3.0, 0.25),
            VisualState::Hovered => (palette.hovered.as_str(), 2.0, 0.18),
            VisualState::Default => (
                ConfidenceTier::from_confidence(confidence).color(palette),
                1.5,
                0.1,
            ),
        };
        Self {
            stroke: stroke.to_string(),
            fill: translucent(stroke, alpha),
            line_width,
        }
    }
}

/// Bar under a box whose width is the box width scaled by confidence.
pub fn confidence_bar(rect: &PixelRect, confidence: Option<f64>) -> Option<PixelRect> {
    let c = confidence.filter(|c| c.is_finite())?.clamp(0.0, 1.0);
    Some(PixelRect {
        x: rect.x,
        y: rect.y + rect.height + CONFIDENCE_BAR_GAP,
        width: rect.width * c,
        height: CONFIDENCE_BAR_HEIGHT,
    })
}
