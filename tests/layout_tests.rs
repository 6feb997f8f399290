//! Grid layout and tile planning tests
//!
//! Extent buffering, zoom scaling, visible windows, and tile-origin planning.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use auditview::layout::{plan_tiles, plan_visible, tile_origin, GridLayout, ViewportState};
use auditview::{Address, SheetMeta, ViewerConfig};
use test_case::test_case;

fn big_sheet() -> SheetMeta {
    SheetMeta {
        name: "Data".to_string(),
        rows: 50_000,
        cols: 200,
    }
}

fn viewport(width: f64, height: f64) -> ViewportState {
    let mut vp = ViewportState::new();
    vp.resize(width, height);
    vp
}

#[test]
fn test_extent_adds_buffer() {
    let layout = GridLayout::new(&big_sheet(), &ViewerConfig::default(), 100);
    assert_eq!((layout.rows, layout.cols), (50_010, 210));
    assert_eq!((layout.declared_rows, layout.declared_cols), (50_000, 200));
    assert_eq!(layout.content_width(), 21_000.0);
    assert_eq!(layout.content_height(), 1_200_240.0);
}

#[test]
fn test_empty_sheet_still_has_extent() {
    let meta = SheetMeta {
        name: "Empty".to_string(),
        rows: 0,
        cols: 0,
    };
    let config = ViewerConfig {
        extent_buffer: 0,
        ..ViewerConfig::default()
    };
    let layout = GridLayout::new(&meta, &config, 100);
    assert_eq!((layout.rows, layout.cols), (1, 1));
}

#[test_case(50, 50.0, 12.0, 6.0)]
#[test_case(100, 100.0, 24.0, 12.0)]
#[test_case(200, 200.0, 48.0, 24.0)]
fn test_zoom_scales_cells_and_font(zoom: u32, width: f64, height: f64, font: f64) {
    let layout = GridLayout::new(&big_sheet(), &ViewerConfig::default(), zoom);
    assert_eq!(layout.cell_width, width);
    assert_eq!(layout.cell_height, height);
    assert_eq!(layout.font_size, font);
    assert_eq!(layout.content_width(), 210.0 * width);
}

#[test]
fn test_visible_window_at_origin() {
    let layout = GridLayout::new(&big_sheet(), &ViewerConfig::default(), 100);
    let vp = viewport(800.0, 600.0);
    assert_eq!(layout.visible_rows(&vp), (1, 27));
    assert_eq!(layout.visible_cols(&vp), (1, 10));
}

#[test]
fn test_visible_window_is_padded_and_clamped_at_end() {
    let layout = GridLayout::new(&big_sheet(), &ViewerConfig::default(), 100);
    let mut vp = viewport(800.0, 600.0);
    vp.set_scroll(1e12, 1e12, layout.content_width(), layout.content_height());
    let (first, last) = layout.visible_rows(&vp);
    assert_eq!(last, layout.rows);
    assert!(first < last);
    assert_eq!(layout.visible_cols(&vp).1, layout.cols);
}

#[test]
fn test_cell_at_maps_content_points() {
    let layout = GridLayout::new(&big_sheet(), &ViewerConfig::default(), 100);
    assert_eq!(layout.cell_at(150.0, 30.0), Some(Address { row: 2, col: 2 }));
    assert_eq!(layout.cell_at(-1.0, 0.0), None);
    assert_eq!(layout.cell_at(21_000.0, 0.0), None);
}

#[test]
fn test_cell_rect_and_bbox_agree() {
    let layout = GridLayout::new(&big_sheet(), &ViewerConfig::default(), 100);
    let addr = Address { row: 3, col: 4 };
    let rect = layout.cell_rect(addr);
    assert_eq!((rect.x, rect.y, rect.width, rect.height), (300.0, 48.0, 100.0, 24.0));
    let bbox = layout.cell_bbox(addr).unwrap();
    assert!((bbox.x1 * layout.content_width() - 300.0).abs() < 1e-6);
    assert!(layout.cell_bbox(Address { row: 60_000, col: 1 }).is_none());
}

#[test]
fn test_header_offsets_follow_scroll() {
    let mut vp = viewport(800.0, 600.0);
    vp.set_scroll(120.0, 48.0, 10_000.0, 10_000.0);
    assert_eq!(GridLayout::header_offsets(&vp), (-120.0, -48.0));
}

#[test_case(1, 1000, 1)]
#[test_case(1000, 1000, 1)]
#[test_case(1001, 1000, 1001)]
#[test_case(2500, 1000, 2001)]
#[test_case(251, 250, 251)]
#[test_case(0, 250, 1)]
fn test_tile_origin_alignment(index: u32, stride: u32, origin: u32) {
    assert_eq!(tile_origin(index, stride), origin);
}

#[test]
fn test_plan_single_tile_for_small_window() {
    assert_eq!(plan_tiles((1, 27), (1, 10), 1000, 250, (50_000, 200)), [(1, 1)]);
}

#[test]
fn test_plan_crossing_tile_boundaries() {
    let origins = plan_tiles((990, 1010), (240, 260), 1000, 250, (50_000, 600));
    assert_eq!(origins, [(1, 1), (1, 251), (1001, 1), (1001, 251)]);
}

#[test]
fn test_plan_is_clipped_to_declared_size() {
    assert_eq!(plan_tiles((1, 30), (1, 30), 1000, 250, (10, 5)), [(1, 1)]);
    // Only the buffer rows are visible.
    assert!(plan_tiles((60, 70), (1, 5), 1000, 250, (50, 5)).is_empty());
}

#[test]
fn test_plan_visible_uses_declared_size() {
    let meta = SheetMeta {
        name: "Tiny".to_string(),
        rows: 5,
        cols: 3,
    };
    let layout = GridLayout::new(&meta, &ViewerConfig::default(), 100);
    let origins = plan_visible(&layout, &viewport(800.0, 600.0), 1000, 250);
    assert_eq!(origins, [(1, 1)]);
}

#[test]
fn test_rescale_scroll_keeps_corner_content() {
    let mut vp = viewport(800.0, 600.0);
    vp.set_scroll(1000.0, 240.0, 1e9, 1e9);
    vp.rescale_scroll(100, 200);
    assert_eq!((vp.scroll_left, vp.scroll_top), (2000.0, 480.0));
}

#[test]
fn test_set_scroll_reports_movement() {
    let mut vp = viewport(800.0, 600.0);
    assert!(!vp.set_scroll(0.0, 0.0, 5000.0, 5000.0));
    assert!(vp.set_scroll(100.0, 0.0, 5000.0, 5000.0));
    // Non-finite offsets reset to the origin.
    assert!(vp.set_scroll(f64::NAN, 0.0, 5000.0, 5000.0));
    assert_eq!(vp.scroll_left, 0.0);
}
