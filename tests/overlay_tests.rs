//! Overlay tests
//!
//! Box projection, sanitizing, visual precedence, confidence tiers, and hit
//! testing under both hit policies.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use auditview::config::{HitPolicy, OverlayPalette};
use auditview::overlay::style::confidence_bar;
use auditview::overlay::{
    BoundingBox, BoxStyle, CanvasSize, ConfidenceTier, OverlayBox, OverlayEngine, PixelRect,
    VisualState, FALLBACK_BOX, MIN_BOX_EXTENT,
};
use test_case::test_case;

const EPS: f64 = 1e-9;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

fn overlay_box(id: &str, page: u32, coords: [f64; 4], confidence: Option<f64>) -> OverlayBox {
    let [x1, y1, x2, y2] = coords;
    OverlayBox {
        id: id.to_string(),
        page,
        bbox: BoundingBox::new(x1, y1, x2, y2).unwrap(),
        confidence,
    }
}

/// A large box with a small box inside it, both on page 1.
fn nested(policy: HitPolicy) -> OverlayEngine {
    let mut engine = OverlayEngine::new(policy, OverlayPalette::default());
    engine.set_boxes(vec![
        overlay_box("outer", 1, [0.1, 0.1, 0.9, 0.9], Some(0.9)),
        overlay_box("inner", 1, [0.4, 0.4, 0.5, 0.5], Some(0.7)),
        overlay_box("elsewhere", 2, [0.0, 0.0, 1.0, 1.0], None),
    ]);
    engine
}

#[test]
fn test_projection_matches_canvas() {
    let bbox = BoundingBox::new(0.1, 0.1, 0.3, 0.3).unwrap();
    let rect = bbox.project(CanvasSize::new(1000.0, 800.0));
    assert!(close(rect.x, 100.0));
    assert!(close(rect.y, 80.0));
    assert!(close(rect.width, 200.0));
    assert!(close(rect.height, 160.0));
}

#[test]
fn test_projection_follows_canvas_size() {
    let bbox = BoundingBox::new(0.25, 0.5, 0.75, 1.0).unwrap();
    let small = bbox.project(CanvasSize::new(400.0, 200.0));
    let large = bbox.project(CanvasSize::new(800.0, 400.0));
    assert_eq!(large.x, small.x * 2.0);
    assert_eq!(large.height, small.height * 2.0);
}

#[test_case([0.1, 0.1, 0.1, 0.3] ; "zero width")]
#[test_case([0.3, 0.1, 0.1, 0.3] ; "inverted")]
#[test_case([-0.1, 0.1, 0.2, 0.3] ; "negative")]
#[test_case([0.1, 0.1, 1.2, 0.3] ; "past edge")]
fn test_new_rejects_invalid_boxes(c: [f64; 4]) {
    assert!(BoundingBox::new(c[0], c[1], c[2], c[3]).is_none());
}

#[test]
fn test_sanitize_repairs_boxes() {
    let inverted = BoundingBox::sanitize([0.5, 0.6, 0.2, 0.1]);
    assert_eq!([inverted.x1, inverted.y1, inverted.x2, inverted.y2], [0.2, 0.1, 0.5, 0.6]);

    let clamped = BoundingBox::sanitize([-0.5, 0.2, 1.5, 0.4]);
    assert_eq!((clamped.x1, clamped.x2), (0.0, 1.0));

    let point = BoundingBox::sanitize([0.3, 0.3, 0.3, 0.3]);
    assert!(close(point.width(), MIN_BOX_EXTENT));
    assert!(close(point.height(), MIN_BOX_EXTENT));

    let edge = BoundingBox::sanitize([1.0, 1.0, 1.0, 1.0]);
    assert_eq!(edge.x2, 1.0);
    assert!(close(edge.x1, 1.0 - MIN_BOX_EXTENT));
}

#[test]
fn test_sanitize_non_finite_falls_back() {
    let bbox = BoundingBox::sanitize([f64::NAN, 0.1, 0.2, f64::INFINITY]);
    assert_eq!([bbox.x1, bbox.y1, bbox.x2, bbox.y2], FALLBACK_BOX);
}

#[test]
fn test_bbox_json_is_an_array() {
    let bbox: BoundingBox = serde_json::from_str("[0.1, 0.2, 0.3, 0.4]").unwrap();
    assert_eq!(bbox.y1, 0.2);
    assert_eq!(serde_json::to_string(&bbox).unwrap(), "[0.1,0.2,0.3,0.4]");
    assert!(serde_json::from_str::<BoundingBox>("[0.3, 0.2, 0.1, 0.4]").is_err());
}

#[test_case(Some(0.95), ConfidenceTier::High)]
#[test_case(Some(0.8), ConfidenceTier::High)]
#[test_case(Some(0.79), ConfidenceTier::Medium)]
#[test_case(Some(0.6), ConfidenceTier::Medium)]
#[test_case(Some(0.2), ConfidenceTier::Low)]
#[test_case(None, ConfidenceTier::Unknown)]
#[test_case(Some(f64::NAN), ConfidenceTier::Unknown)]
fn test_confidence_tiers(confidence: Option<f64>, tier: ConfidenceTier) {
    assert_eq!(ConfidenceTier::from_confidence(confidence), tier);
}

#[test]
fn test_selected_beats_hovered() {
    assert_eq!(VisualState::resolve(true, true), VisualState::Selected);
    assert_eq!(VisualState::resolve(false, true), VisualState::Hovered);
    assert_eq!(VisualState::resolve(false, false), VisualState::Default);
}

#[test]
fn test_style_per_state() {
    let palette = OverlayPalette::default();
    let selected = BoxStyle::for_box(VisualState::Selected, Some(0.1), &palette);
    assert_eq!(selected.stroke, palette.selected);
    let hovered = BoxStyle::for_box(VisualState::Hovered, None, &palette);
    assert!(selected.line_width > hovered.line_width);

    let default = BoxStyle::for_box(VisualState::Default, Some(0.9), &palette);
    assert_eq!(default.stroke, palette.high);
    assert!(default.fill.starts_with("rgba("));
}

#[test]
fn test_confidence_bar_geometry() {
    let rect = PixelRect {
        x: 10.0,
        y: 20.0,
        width: 200.0,
        height: 50.0,
    };
    let bar = confidence_bar(&rect, Some(0.75)).unwrap();
    assert_eq!((bar.x, bar.y, bar.width, bar.height), (10.0, 72.0, 150.0, 4.0));
    assert_eq!(confidence_bar(&rect, Some(1.7)).unwrap().width, 200.0);
    assert!(confidence_bar(&rect, None).is_none());
}

#[test]
fn test_shapes_paint_selected_last() {
    let mut engine = nested(HitPolicy::FirstInList);
    engine.select(Some("outer"));
    engine.hover(Some("inner"));
    let shapes = engine.shapes(1, CanvasSize::new(1000.0, 1000.0));
    let order: Vec<(&str, VisualState)> = shapes.iter().map(|s| (s.id.as_str(), s.state)).collect();
    assert_eq!(
        order,
        [("inner", VisualState::Hovered), ("outer", VisualState::Selected)]
    );
}

#[test]
fn test_shapes_only_for_requested_page() {
    let engine = nested(HitPolicy::FirstInList);
    let shapes = engine.shapes(2, CanvasSize::new(100.0, 100.0));
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].id, "elsewhere");
    assert!(shapes[0].confidence_bar.is_none());
}

#[test]
fn test_hit_first_in_list() {
    let engine = nested(HitPolicy::FirstInList);
    let canvas = CanvasSize::new(1000.0, 1000.0);
    assert_eq!(engine.hit_test(1, canvas, 450.0, 450.0).unwrap().id, "outer");
    assert!(engine.hit_test(1, canvas, 50.0, 50.0).is_none());
    assert_eq!(engine.hit_test(2, canvas, 50.0, 50.0).unwrap().id, "elsewhere");
}

#[test]
fn test_hit_smallest_area() {
    let engine = nested(HitPolicy::SmallestArea);
    let canvas = CanvasSize::new(1000.0, 1000.0);
    assert_eq!(engine.hit_test(1, canvas, 450.0, 450.0).unwrap().id, "inner");
    assert_eq!(engine.hit_test(1, canvas, 200.0, 200.0).unwrap().id, "outer");
}

#[test]
fn test_smallest_area_tie_keeps_list_order() {
    let mut engine = OverlayEngine::new(HitPolicy::SmallestArea, OverlayPalette::default());
    engine.set_boxes(vec![
        overlay_box("a", 1, [0.1, 0.1, 0.3, 0.3], None),
        overlay_box("b", 1, [0.1, 0.1, 0.3, 0.3], None),
    ]);
    let hit = engine.hit_test(1, CanvasSize::new(100.0, 100.0), 20.0, 20.0);
    assert_eq!(hit.unwrap().id, "a");
}

#[test]
fn test_hit_on_empty_canvas_is_none() {
    let engine = nested(HitPolicy::FirstInList);
    assert!(engine.hit_test(1, CanvasSize::new(0.0, 0.0), 0.0, 0.0).is_none());
}

#[test]
fn test_pointer_move_reports_changes_only() {
    let mut engine = nested(HitPolicy::FirstInList);
    let canvas = CanvasSize::new(1000.0, 1000.0);
    assert!(engine.pointer_move(1, canvas, 200.0, 200.0));
    assert!(!engine.pointer_move(1, canvas, 210.0, 210.0));
    assert_eq!(engine.hovered(), Some("outer"));
    assert!(engine.pointer_move(1, canvas, 10.0, 10.0));
    assert_eq!(engine.hovered(), None);
}

#[test]
fn test_click_on_empty_space_keeps_selection() {
    let mut engine = nested(HitPolicy::FirstInList);
    let canvas = CanvasSize::new(1000.0, 1000.0);
    assert_eq!(engine.pointer_down(1, canvas, 450.0, 450.0).as_deref(), Some("outer"));
    assert_eq!(engine.pointer_down(1, canvas, 5.0, 5.0), None);
    assert_eq!(engine.selected(), Some("outer"));
}

#[test]
fn test_set_boxes_drops_stale_selection() {
    let mut engine = nested(HitPolicy::FirstInList);
    engine.select(Some("inner"));
    engine.hover(Some("outer"));
    engine.set_boxes(vec![overlay_box("outer", 1, [0.1, 0.1, 0.9, 0.9], None)]);
    assert_eq!(engine.selected(), None);
    assert_eq!(engine.hovered(), Some("outer"));
}
