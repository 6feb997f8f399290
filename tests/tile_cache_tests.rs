//! Tile cache tests
//!
//! Memoization, lookups by returned bounds, clearing, stale-write guard, and
//! failure-tolerant preloads.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use std::future::Future;
use std::rc::Rc;
use std::task::{Context, Poll};

use auditview::tiles::{MemoryTileSource, TileCache};
use auditview::CellValue;
use common::ScriptedSource;
use futures::executor::block_on;

fn numbered(rows: u32, cols: u32) -> ScriptedSource {
    ScriptedSource::new(MemoryTileSource::new("f").with_generated_sheet(
        "S",
        rows,
        cols,
        |r, c| CellValue::Number(f64::from(r * 1000 + c)),
    ))
}

#[test]
fn test_second_fetch_returns_same_tile_without_request() {
    let source = numbered(3000, 600);
    let cache = TileCache::new(1000, 250);
    let first = block_on(cache.fetch_tile(&source, "f", "S", 1, 1)).unwrap();
    let second = block_on(cache.fetch_tile(&source, "f", "S", 1, 1)).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(source.page_requests(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_get_cell_outside_cached_tiles_is_none() {
    let source = numbered(3000, 600);
    let cache = TileCache::new(1000, 250);
    assert_eq!(cache.get_cell("S", 1, 1), None);
    block_on(cache.fetch_tile(&source, "f", "S", 1, 1)).unwrap();
    assert_eq!(cache.get_cell("S", 1001, 1), None);
    assert_eq!(cache.get_cell("S", 1, 251), None);
    assert_eq!(cache.get_cell("S", 1000, 250), Some(CellValue::Number(1_000_250.0)));
}

#[test]
fn test_narrow_tile_uses_returned_bounds() {
    let source = numbered(10, 5);
    let cache = TileCache::new(1000, 250);
    let tile = block_on(cache.fetch_tile(&source, "f", "S", 1, 1)).unwrap();
    assert_eq!((tile.r1, tile.c1), (10, 5));
    assert_eq!(cache.get_cell("S", 10, 5), Some(CellValue::Number(10_005.0)));
    // Requested but not returned.
    assert_eq!(cache.get_cell("S", 11, 1), None);
    assert_eq!(cache.get_cell("S", 1, 6), None);
}

#[test]
fn test_lookup_is_scoped_by_sheet() {
    let source = MemoryTileSource::new("f")
        .with_generated_sheet("A", 5, 5, |_, _| CellValue::from("a"))
        .with_generated_sheet("B", 5, 5, |_, _| CellValue::from("b"));
    let cache = TileCache::new(1000, 250);
    block_on(cache.fetch_tile(&source, "f", "A", 1, 1)).unwrap();
    assert_eq!(cache.get_cell("B", 1, 1), None);
    block_on(cache.fetch_tile(&source, "f", "B", 1, 1)).unwrap();
    assert_eq!(cache.get_cell("B", 1, 1), Some(CellValue::from("b")));
    assert_eq!(cache.get_cell("A", 1, 1), Some(CellValue::from("a")));
}

#[test]
fn test_clear_forgets_everything() {
    let source = numbered(100, 10);
    let cache = TileCache::new(1000, 250);
    block_on(cache.fetch_tile(&source, "f", "S", 1, 1)).unwrap();
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.get_cell("S", 1, 1), None);
    block_on(cache.fetch_tile(&source, "f", "S", 1, 1)).unwrap();
    assert_eq!(source.page_requests(), 2);
}

#[test]
fn test_fetch_started_before_clear_is_not_stored() {
    let source = numbered(100, 10).yielding();
    let cache = TileCache::new(1000, 250);
    let waker = futures::task::noop_waker();
    let mut cx = Context::from_waker(&waker);

    let mut fetch = Box::pin(cache.fetch_tile(&source, "f", "S", 1, 1));
    assert!(fetch.as_mut().poll(&mut cx).is_pending());
    cache.clear();
    match fetch.as_mut().poll(&mut cx) {
        Poll::Ready(Ok(tile)) => assert_eq!(tile.r1, 100),
        other => panic!("expected a tile, got {other:?}"),
    }
    drop(fetch);
    assert!(cache.is_empty());
    assert_eq!(cache.get_cell("S", 1, 1), None);
}

#[test]
fn test_preload_tolerates_failures() {
    let source = numbered(3000, 10);
    source.fail_window("S", 1001, 1);
    let cache = TileCache::new(1000, 250);
    let report = block_on(cache.preload(&source, "f", "S", &[(1, 1), (1001, 1), (2001, 1)]));
    assert_eq!(report.requested, 3);
    assert_eq!(report.loaded, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!((report.failed[0].r0, report.failed[0].c0), (1001, 1));
    assert!(!report.is_complete());

    assert_eq!(cache.get_cell("S", 1500, 1), None);
    assert_eq!(cache.get_cell("S", 2500, 1), Some(CellValue::Number(2_500_001.0)));
    assert!(cache.contains("S", 2001, 1));
    assert!(!cache.contains("S", 1001, 1));
}

#[test]
fn test_unknown_file_is_an_error_and_not_cached() {
    let source = numbered(10, 10);
    let cache = TileCache::new(1000, 250);
    assert!(block_on(cache.fetch_tile(&source, "other", "S", 1, 1)).is_err());
    assert!(cache.is_empty());
}

#[test]
fn test_key_format() {
    assert_eq!(TileCache::key_for("P&L", 1001, 251), "P&L:1001:251");
}
