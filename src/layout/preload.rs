//! Which tiles a visible region needs.
//!
//! Origins are aligned to the tile grid (`1 + k * tile_rows`,
//! `1 + k * tile_cols`) so that neighbouring viewports share cache keys and
//! a region never asks for the same tile twice.

use super::{GridLayout, ViewportState};

/// Origin of the tile containing a 1-based `index` for a given stride.
pub fn tile_origin(index: u32, stride: u32) -> u32 {
    let stride = stride.max(1);
    (index.max(1) - 1) / stride * stride + 1
}

/// Tile origins covering the 1-based inclusive `rows` x `cols` region,
/// clipped to the declared sheet size, in row-major order.
pub fn plan_tiles(
    rows: (u32, u32),
    cols: (u32, u32),
    tile_rows: u32,
    tile_cols: u32,
    declared: (u32, u32),
) -> Vec<(u32, u32)> {
    let (declared_rows, declared_cols) = declared;
    let row_end = rows.1.min(declared_rows);
    let col_end = cols.1.min(declared_cols);
    if rows.0 > row_end || cols.0 > col_end {
        return Vec::new();
    }
    let (tile_rows, tile_cols) = (tile_rows.max(1), tile_cols.max(1));

    let mut origins = Vec::new();
    let mut r = tile_origin(rows.0, tile_rows);
    while r <= row_end {
        let mut c = tile_origin(cols.0, tile_cols);
        while c <= col_end {
            origins.push((r, c));
            c = match c.checked_add(tile_cols) {
                Some(next) => next,
                None => break,
            };
        }
        r = match r.checked_add(tile_rows) {
            Some(next) => next,
            None => break,
        };
    }
    origins
}

/// Tile origins for everything `viewport` currently shows of `layout`.
pub fn plan_visible(
    layout: &GridLayout,
    viewport: &ViewportState,
    tile_rows: u32,
    tile_cols: u32,
) -> Vec<(u32, u32)> {
    plan_tiles(
        layout.visible_rows(viewport),
        layout.visible_cols(viewport),
        tile_rows,
        tile_cols,
        (layout.declared_rows, layout.declared_cols),
    )
}
