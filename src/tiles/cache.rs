//! Session-scoped tile cache.
//!
//! Tiles are keyed by the origin that was *requested* but looked up by the
//! bounds the server *returned*, so a value is never read from a position the
//! server did not send. Entries live until [`TileCache::clear`]; there is no
//! eviction.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::join_all;

use super::TileSource;
use crate::config::ViewerConfig;
use crate::error::{AuditViewError, Result};
use crate::types::{CellValue, PageRequest, Tile};

/// A tile that could not be loaded during a preload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFailure {
    pub r0: u32,
    pub c0: u32,
    pub message: String,
}

/// Outcome of a batch preload. Partial success is normal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub requested: usize,
    pub loaded: usize,
    pub failed: Vec<TileFailure>,
}

impl PreloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.loaded == self.requested
    }
}

pub struct TileCache {
    tile_rows: u32,
    tile_cols: u32,
    entries: RefCell<HashMap<String, Rc<Tile>>>,
    /// Insertion order of `entries`, the scan order of [`TileCache::get_cell`].
    order: RefCell<Vec<String>>,
    /// Bumped by `clear()`; fetches started under an older generation don't store.
    generation: Cell<u64>,
}

impl TileCache {
    pub fn new(tile_rows: u32, tile_cols: u32) -> Self {
        Self {
            tile_rows: tile_rows.max(1),
            tile_cols: tile_cols.max(1),
            entries: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
            generation: Cell::new(0),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.tile_rows, config.tile_cols)
    }

    pub fn tile_rows(&self) -> u32 {
        self.tile_rows
    }

    pub fn tile_cols(&self) -> u32 {
        self.tile_cols
    }

    /// Cache key for a requested origin: `"{sheet}:{r0}:{c0}"`.
    pub fn key_for(sheet: &str, r0: u32, c0: u32) -> String {
        format!("{sheet}:{r0}:{c0}")
    }

    /// The tile stored for a requested origin, if any.
    pub fn get(&self, sheet: &str, r0: u32, c0: u32) -> Option<Rc<Tile>> {
        self.entries
            .borrow()
            .get(&Self::key_for(sheet, r0, c0))
            .map(Rc::clone)
    }

    pub fn contains(&self, sheet: &str, r0: u32, c0: u32) -> bool {
        self.entries
            .borrow()
            .contains_key(&Self::key_for(sheet, r0, c0))
    }

    /// Return the tile for (sheet, r0, c0), fetching it on a miss.
    ///
    /// Concurrent calls for the same key are not deduplicated here; callers
    /// batch their requests instead.
    pub async fn fetch_tile<S: TileSource>(
        &self,
        source: &S,
        file_id: &str,
        sheet: &str,
        r0: u32,
        c0: u32,
    ) -> Result<Rc<Tile>> {
        let key = Self::key_for(sheet, r0, c0);
        let cached = self.entries.borrow().get(&key).map(Rc::clone);
        if let Some(tile) = cached {
            tracing::trace!(%key, "tile cache hit");
            return Ok(tile);
        }

        let generation = self.generation.get();
        let request = PageRequest::window(sheet, r0, c0, self.tile_rows, self.tile_cols);
        tracing::debug!(
            %key,
            r1 = request.r1,
            c1 = request.c1,
            "fetching tile"
        );
        let tile = source.page(file_id, &request).await?;
        if !tile.has_valid_bounds() {
            return Err(AuditViewError::Fetch(format!(
                "tile {key} returned inverted bounds {}..{} x {}..{}",
                tile.r0, tile.r1, tile.c0, tile.c1
            )));
        }
        let tile = Rc::new(tile);

        if self.generation.get() != generation {
            tracing::debug!(%key, "dropping tile fetched before cache clear");
            return Ok(tile);
        }
        self.insert(key, Rc::clone(&tile));
        Ok(tile)
    }

    fn insert(&self, key: String, tile: Rc<Tile>) {
        let mut entries = self.entries.borrow_mut();
        if !entries.contains_key(&key) {
            self.order.borrow_mut().push(key.clone());
        }
        entries.insert(key, tile);
    }

    /// Value at a 1-based (row, col) of `sheet`, from the first cached tile
    /// whose returned bounds contain it. `None` when no cached tile covers it.
    pub fn get_cell(&self, sheet: &str, row: u32, col: u32) -> Option<CellValue> {
        let entries = self.entries.borrow();
        self.order
            .borrow()
            .iter()
            .filter_map(|key| entries.get(key))
            .find(|tile| tile.sheet == sheet && tile.contains(row, col))
            .and_then(|tile| tile.value(row, col).cloned())
    }

    /// Fetch every origin concurrently; failures are reported, not raised.
    pub async fn preload<S: TileSource>(
        &self,
        source: &S,
        file_id: &str,
        sheet: &str,
        origins: &[(u32, u32)],
    ) -> PreloadReport {
        let fetches = origins.iter().map(|&(r0, c0)| async move {
            let result = self.fetch_tile(source, file_id, sheet, r0, c0).await;
            (r0, c0, result)
        });
        let results = join_all(fetches).await;

        let mut report = PreloadReport {
            requested: origins.len(),
            ..PreloadReport::default()
        };
        for (r0, c0, result) in results {
            match result {
                Ok(_) => report.loaded += 1,
                Err(e) => {
                    tracing::warn!(sheet, r0, c0, "tile fetch failed: {e}");
                    report.failed.push(TileFailure {
                        r0,
                        c0,
                        message: e.to_string(),
                    });
                }
            }
        }
        tracing::debug!(
            sheet,
            requested = report.requested,
            loaded = report.loaded,
            failed = report.failed.len(),
            "preload finished"
        );
        report
    }

    /// Discard every entry. In-flight fetches started before this call will
    /// not be stored.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.order.borrow_mut().clear();
        self.generation.set(self.generation.get() + 1);
    }

    /// Number of cached tiles.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }
}
