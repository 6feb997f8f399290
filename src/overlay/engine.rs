//! Overlay state: which boxes exist, which one is hovered or selected, and
//! what the pointer is over.
//!
//! Nothing here caches pixels. [`OverlayEngine::shapes`] projects every box
//! against the canvas size it is given, so a zoom or resize only needs a
//! redraw.

use serde::Serialize;

use super::style::{confidence_bar, BoxStyle, VisualState};
use super::{BoundingBox, CanvasSize, PixelRect};
use crate::config::{HitPolicy, OverlayPalette};

/// One finding's box on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayBox {
    pub id: String,
    pub page: u32,
    pub bbox: BoundingBox,
    pub confidence: Option<f64>,
}

/// A box ready to paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayShape {
    pub id: String,
    pub rect: PixelRect,
    pub state: VisualState,
    pub style: BoxStyle,
    pub confidence_bar: Option<PixelRect>,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayEngine {
    boxes: Vec<OverlayBox>,
    selected: Option<String>,
    hovered: Option<String>,
    policy: HitPolicy,
    palette: OverlayPalette,
}

impl OverlayEngine {
    pub fn new(policy: HitPolicy, palette: OverlayPalette) -> Self {
        Self {
            policy,
            palette,
            ..Self::default()
        }
    }

    /// Replace the box list. Hover and selection survive only if their id is
    /// still present.
    pub fn set_boxes(&mut self, boxes: Vec<OverlayBox>) {
        self.boxes = boxes;
        let known = |id: &Option<String>| {
            id.as_ref()
                .is_some_and(|id| self.boxes.iter().any(|b| &b.id == id))
        };
        if !known(&self.selected) {
            self.selected = None;
        }
        if !known(&self.hovered) {
            self.hovered = None;
        }
    }

    pub fn boxes(&self) -> &[OverlayBox] {
        &self.boxes
    }

    pub fn get(&self, id: &str) -> Option<&OverlayBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn policy(&self) -> HitPolicy {
        self.policy
    }

    /// Returns whether the selection changed.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        let next = id.map(str::to_string);
        let changed = self.selected != next;
        self.selected = next;
        changed
    }

    /// Returns whether the hover target changed.
    pub fn hover(&mut self, id: Option<&str>) -> bool {
        let next = id.map(str::to_string);
        let changed = self.hovered != next;
        self.hovered = next;
        changed
    }

    fn state_of(&self, id: &str) -> VisualState {
        VisualState::resolve(
            self.selected.as_deref() == Some(id),
            self.hovered.as_deref() == Some(id),
        )
    }

    /// Shapes for `page` projected onto `canvas`. Hovered and selected boxes
    /// come last so they paint over their neighbours.
    pub fn shapes(&self, page: u32, canvas: CanvasSize) -> Vec<OverlayShape> {
        let mut shapes: Vec<OverlayShape> = self
            .boxes
            .iter()
            .filter(|b| b.page == page)
            .map(|b| {
                let rect = b.bbox.project(canvas);
                let state = self.state_of(&b.id);
                OverlayShape {
                    id: b.id.clone(),
                    rect,
                    state,
                    style: BoxStyle::for_box(state, b.confidence, &self.palette),
                    confidence_bar: confidence_bar(&rect, b.confidence),
                }
            })
            .collect();
        shapes.sort_by_key(|s| match s.state {
            VisualState::Default => 0,
            VisualState::Hovered => 1,
            VisualState::Selected => 2,
        });
        shapes
    }

    /// Box under the pixel `(x, y)` of a `canvas`-sized page.
    pub fn hit_test(&self, page: u32, canvas: CanvasSize, x: f64, y: f64) -> Option<&OverlayBox> {
        let (fx, fy) = canvas.normalize_point(x, y)?;
        let mut hits = self
            .boxes
            .iter()
            .filter(|b| b.page == page && b.bbox.contains(fx, fy));
        match self.policy {
            HitPolicy::FirstInList => hits.next(),
            HitPolicy::SmallestArea => hits.fold(None, |best: Option<&OverlayBox>, b| match best {
                Some(prev) if prev.bbox.area() <= b.bbox.area() => Some(prev),
                _ => Some(b),
            }),
        }
    }

    /// Update hover from a pointer position. Returns whether it changed.
    pub fn pointer_move(&mut self, page: u32, canvas: CanvasSize, x: f64, y: f64) -> bool {
        let id = self.hit_test(page, canvas, x, y).map(|b| b.id.clone());
        self.hover(id.as_deref())
    }

    /// Select the box under the pointer. A click on empty space keeps the
    /// current selection.
    pub fn pointer_down(
        &mut self,
        page: u32,
        canvas: CanvasSize,
        x: f64,
        y: f64,
    ) -> Option<String> {
        let id = self.hit_test(page, canvas, x, y).map(|b| b.id.clone())?;
        self.select(Some(&id));
        Some(id)
    }
}
