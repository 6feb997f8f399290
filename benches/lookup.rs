//! Benchmarks for the hot lookup paths: address codec, cell lookup in the
//! tile cache, and frame building for a visible window.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use futures::executor::block_on;

use auditview::cell_ref::{column_to_label, parse_address};
use auditview::config::OverlayPalette;
use auditview::layout::{GridLayout, ViewportState};
use auditview::references::parse_multi_cell;
use auditview::render::{build_frame, GridParams};
use auditview::tiles::{MemoryTileSource, TileCache};
use auditview::{CellValue, SheetMeta, ViewerConfig};

fn bench_codec(c: &mut Criterion) {
    c.bench_function("column_to_label", |b| {
        b.iter(|| {
            for col in (1..18_278).step_by(97) {
                black_box(column_to_label(black_box(col)));
            }
        })
    });

    c.bench_function("parse_address", |b| {
        b.iter(|| parse_address(black_box("XFD1048576")).expect("valid address"))
    });

    c.bench_function("parse_multi_cell", |b| {
        b.iter(|| parse_multi_cell(black_box("O10!B5!C3!bad!AA120!ZZ9")))
    });
}

/// A cache holding `tiles` row-stacked tiles of 1000 x 50.
fn filled_cache(tiles: u32) -> TileCache {
    let source = MemoryTileSource::new("f").with_generated_sheet("S", tiles * 1000, 50, |r, c| {
        CellValue::Number(f64::from(r) + f64::from(c) / 1000.0)
    });
    let cache = TileCache::new(1000, 50);
    let origins: Vec<(u32, u32)> = (0..tiles).map(|t| (t * 1000 + 1, 1)).collect();
    block_on(cache.preload(&source, "f", "S", &origins));
    cache
}

fn bench_get_cell(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_cell");
    for tiles in [1u32, 4, 16] {
        let cache = filled_cache(tiles);
        let last_row = tiles * 1000;
        group.bench_with_input(BenchmarkId::from_parameter(tiles), &last_row, |b, &row| {
            b.iter(|| cache.get_cell("S", black_box(row), black_box(25)))
        });
    }
    group.finish();
}

fn bench_build_frame(c: &mut Criterion) {
    let meta = SheetMeta {
        name: "S".to_string(),
        rows: 4000,
        cols: 250,
    };
    let config = ViewerConfig::default();
    let cache = filled_cache(4);
    let palette = OverlayPalette::default();
    let mut group = c.benchmark_group("build_frame");
    for zoom in [50u32, 100, 200] {
        let layout = GridLayout::new(&meta, &config, zoom);
        let mut viewport = ViewportState::new();
        viewport.resize(1600.0, 900.0);
        viewport.zoom_percent = zoom;
        viewport.set_scroll(5000.0, 40_000.0, layout.content_width(), layout.content_height());
        group.bench_with_input(BenchmarkId::from_parameter(zoom), &viewport, |b, vp| {
            b.iter(|| {
                build_frame(&GridParams {
                    layout: &layout,
                    viewport: vp,
                    cache: &cache,
                    sheet: "S",
                    highlights: &[],
                    active_finding: None,
                    palette: &palette,
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_codec, bench_get_cell, bench_build_frame);
criterion_main!(benches);
