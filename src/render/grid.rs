//! Builds the paintable frame for the visible window of the grid.
//!
//! Only rows and columns inside the viewport (plus padding) are visited.
//! Cell text comes from the tile cache; a position no tile covers renders as
//! empty text.

use serde::Serialize;

use crate::config::OverlayPalette;
use crate::layout::{GridLayout, ViewportState};
use crate::overlay::{CanvasSize, PixelRect};
use crate::tiles::TileCache;
use crate::types::{Address, HighlightSpec};

/// One cell to paint, in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellPaint {
    pub address: Address,
    pub rect: PixelRect,
    pub text: String,
}

/// One header label. `offset` is the position along the strip, already
/// shifted by the header offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderPaint {
    pub index: u32,
    pub label: String,
    pub offset: f64,
    pub size: f64,
}

/// A highlighted cell, in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightPaint {
    pub finding_id: String,
    pub address: Address,
    pub rect: PixelRect,
    pub color: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridFrame {
    pub sheet: String,
    /// Visible rows, 1-based inclusive.
    pub rows: (u32, u32),
    /// Visible columns, 1-based inclusive.
    pub cols: (u32, u32),
    pub cells: Vec<CellPaint>,
    pub col_headers: Vec<HeaderPaint>,
    pub row_headers: Vec<HeaderPaint>,
    pub highlights: Vec<HighlightPaint>,
    /// Translation of the (column, row) header strips.
    pub header_offset: (f64, f64),
    pub cell_width: f64,
    pub cell_height: f64,
    pub font_size: f64,
    pub content_size: (f64, f64),
    pub viewport_size: (f64, f64),
}

impl GridFrame {
    /// Text painted at `addr`, if it is inside the frame.
    pub fn text_at(&self, addr: Address) -> Option<&str> {
        self.cells
            .iter()
            .find(|c| c.address == addr)
            .map(|c| c.text.as_str())
    }
}

pub struct GridParams<'a> {
    pub layout: &'a GridLayout,
    pub viewport: &'a ViewportState,
    pub cache: &'a TileCache,
    pub sheet: &'a str,
    pub highlights: &'a [HighlightSpec],
    pub active_finding: Option<&'a str>,
    pub palette: &'a OverlayPalette,
}

pub fn build_frame(params: &GridParams) -> GridFrame {
    let GridParams {
        layout,
        viewport,
        cache,
        sheet,
        ..
    } = *params;
    let rows = layout.visible_rows(viewport);
    let cols = layout.visible_cols(viewport);
    let header_offset = GridLayout::header_offsets(viewport);

    let to_screen = |rect: PixelRect| {
        let (x, y) = viewport.to_screen(rect.x, rect.y);
        PixelRect { x, y, ..rect }
    };

    let mut cells = Vec::new();
    for row in rows.0..=rows.1 {
        for col in cols.0..=cols.1 {
            let address = Address { row, col };
            let r = layout.cell_rect(address);
            let text = cache
                .get_cell(sheet, row, col)
                .map(|v| v.to_string())
                .unwrap_or_default();
            cells.push(CellPaint {
                address,
                rect: to_screen(PixelRect {
                    x: r.x,
                    y: r.y,
                    width: r.width,
                    height: r.height,
                }),
                text,
            });
        }
    }

    let col_headers = (cols.0..=cols.1)
        .map(|col| HeaderPaint {
            index: col,
            label: crate::cell_ref::column_to_label(col),
            offset: f64::from(col - 1) * layout.cell_width + header_offset.0,
            size: layout.cell_width,
        })
        .collect();
    let row_headers = (rows.0..=rows.1)
        .map(|row| HeaderPaint {
            index: row,
            label: row.to_string(),
            offset: f64::from(row - 1) * layout.cell_height + header_offset.1,
            size: layout.cell_height,
        })
        .collect();

    let content = CanvasSize::new(layout.content_width(), layout.content_height());
    let highlights = params
        .highlights
        .iter()
        .filter(|h| h.sheet == sheet)
        .filter(|h| {
            (rows.0..=rows.1).contains(&h.cell.row) && (cols.0..=cols.1).contains(&h.cell.col)
        })
        .filter_map(|h| {
            let bbox = layout.cell_bbox(h.cell)?;
            let active = params.active_finding == Some(h.finding_id.as_str());
            let color = if active {
                &params.palette.active_cell_highlight
            } else {
                &params.palette.cell_highlight
            };
            Some(HighlightPaint {
                finding_id: h.finding_id.clone(),
                address: h.cell,
                rect: to_screen(bbox.project(content)),
                color: color.clone(),
                active,
            })
        })
        .collect();

    GridFrame {
        sheet: sheet.to_string(),
        rows,
        cols,
        cells,
        col_headers,
        row_headers,
        highlights,
        header_offset,
        cell_width: layout.cell_width,
        cell_height: layout.cell_height,
        font_size: layout.font_size,
        content_size: (content.width, content.height),
        viewport_size: (viewport.width, viewport.height),
    }
}
