//! The backend seam: anything that can answer `meta`, `page`, and `spotlight`.

use std::io::Read;

use crate::error::{AuditViewError, Result};
use crate::types::{Address, CellValue, MetaResponse, PageRequest, SheetMeta, Spotlight, Tile};

/// Source of sheet metadata and tiles.
///
/// Futures are not required to be `Send`: everything runs on the single UI
/// event loop.
#[allow(async_fn_in_trait)]
pub trait TileSource {
    /// Sheet list and declared dimensions for a file.
    async fn meta(&self, file_id: &str) -> Result<MetaResponse>;

    /// Inclusive window of cells. The returned bounds may be narrower than
    /// requested at the sheet edges.
    async fn page(&self, file_id: &str, request: &PageRequest) -> Result<Tile>;

    /// Row/col of a single cell, clamped to the sheet.
    async fn spotlight(&self, file_id: &str, sheet: &str, cell: Address) -> Result<Spotlight>;
}

struct MemorySheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl MemorySheet {
    fn row_count(&self) -> u32 {
        u32::try_from(self.rows.len()).unwrap_or(u32::MAX).max(1)
    }

    fn col_count(&self) -> u32 {
        let widest = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        u32::try_from(widest).unwrap_or(u32::MAX).max(1)
    }

    fn value(&self, row: u32, col: u32) -> CellValue {
        self.rows
            .get((row - 1) as usize)
            .and_then(|r| r.get((col - 1) as usize))
            .cloned()
            .unwrap_or_else(|| CellValue::Text(String::new()))
    }
}

/// In-memory workbook with the backend's clamping rules.
///
/// Used by the CLI for local CSV files and by tests.
pub struct MemoryTileSource {
    file_id: String,
    sheets: Vec<MemorySheet>,
}

impl MemoryTileSource {
    pub fn new(file_id: &str) -> Self {
        Self {
            file_id: file_id.to_string(),
            sheets: Vec::new(),
        }
    }

    /// Add a sheet from row-major values.
    pub fn with_sheet(mut self, name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        self.sheets.push(MemorySheet {
            name: name.to_string(),
            rows,
        });
        self
    }

    /// Add a sheet generated from a function of (row, col), both 1-based.
    pub fn with_generated_sheet(
        self,
        name: &str,
        rows: u32,
        cols: u32,
        f: impl Fn(u32, u32) -> CellValue,
    ) -> Self {
        let data = (1..=rows)
            .map(|r| (1..=cols).map(|c| f(r, c)).collect())
            .collect();
        self.with_sheet(name, data)
    }

    /// Add a sheet read from headerless CSV. Numeric fields become numbers.
    pub fn with_csv_sheet(self, name: &str, reader: impl Read) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|field| {
                    let field = field.trim();
                    match field.parse::<f64>() {
                        Ok(n) if n.is_finite() => CellValue::Number(n),
                        _ => CellValue::Text(field.to_string()),
                    }
                })
                .collect();
            rows.push(row);
        }
        Ok(self.with_sheet(name, rows))
    }

    fn check_file(&self, file_id: &str) -> Result<()> {
        if file_id == self.file_id {
            Ok(())
        } else {
            Err(AuditViewError::Http {
                status: 404,
                url: format!("memory://{file_id}"),
            })
        }
    }

    fn sheet(&self, name: &str) -> Result<&MemorySheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| AuditViewError::UnknownSheet(name.to_string()))
    }
}

impl TileSource for MemoryTileSource {
    async fn meta(&self, file_id: &str) -> Result<MetaResponse> {
        self.check_file(file_id)?;
        Ok(MetaResponse {
            file_id: file_id.to_string(),
            sheets: self
                .sheets
                .iter()
                .map(|s| SheetMeta {
                    name: s.name.clone(),
                    rows: s.row_count(),
                    cols: s.col_count(),
                })
                .collect(),
        })
    }

    async fn page(&self, file_id: &str, request: &PageRequest) -> Result<Tile> {
        self.check_file(file_id)?;
        let inverted = request.r1 < request.r0 || request.c1 < request.c0;
        if inverted || request.r0 == 0 || request.c0 == 0 {
            return Err(AuditViewError::Http {
                status: 400,
                url: format!("memory://{file_id}/page"),
            });
        }
        let sheet = self.sheet(&request.sheet)?;
        let (max_r, max_c) = (sheet.row_count(), sheet.col_count());
        let r0 = request.r0.clamp(1, max_r);
        let r1 = request.r1.clamp(1, max_r);
        let c0 = request.c0.clamp(1, max_c);
        let c1 = request.c1.clamp(1, max_c);
        let data = (r0..=r1)
            .map(|r| (c0..=c1).map(|c| sheet.value(r, c)).collect())
            .collect();
        Ok(Tile {
            sheet: request.sheet.clone(),
            r0,
            r1,
            c0,
            c1,
            data,
        })
    }

    async fn spotlight(&self, file_id: &str, sheet: &str, cell: Address) -> Result<Spotlight> {
        self.check_file(file_id)?;
        let s = self.sheet(sheet)?;
        Ok(Spotlight {
            sheet: sheet.to_string(),
            row: cell.row.clamp(1, s.row_count()),
            col: cell.col.clamp(1, s.col_count()),
        })
    }
}
