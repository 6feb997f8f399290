//! The controller for one audit view.
//!
//! `AuditSession` owns the tile cache, the viewport, the overlay and the
//! findings of one file. Every state change goes through a method here and
//! ends in a single synchronous [`AuditSession::redraw`].
//!
//! Network work is handed out as jobs ([`OpenJob`], [`PreloadJob`]) that own
//! `Rc` handles to the source and cache. A job runs without borrowing the
//! session, and its outcome is fed back through `finish_open` /
//! `finish_preload`. In the browser this lets a `spawn_local` task await a
//! fetch while the session sits in a `RefCell` that event handlers keep
//! borrowing. Natively, [`AuditSession::open`], [`AuditSession::drive`] and
//! [`AuditSession::focus_finding`] chain the phases for you.

use std::collections::HashSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::error::{AuditViewError, Result};
use crate::layout::{
    plan_visible, tile_origin, GridLayout, ScrollCoordinator, ScrollTarget, ViewportState,
};
use crate::overlay::{BoundingBox, CanvasSize, OverlayBox, OverlayEngine, OverlayShape};
use crate::references::{classify, highlights, Eligibility};
use crate::render::{build_frame, GridFrame, GridParams, RenderBackend};
use crate::tiles::{PreloadReport, TileCache, TileSource};
use crate::types::{
    find_sheet, Address, AuditSummary, FindingRecord, HighlightSpec, MetaResponse, SheetMeta,
    Spotlight,
};

/// Default size of the paired raster page panel.
const DEFAULT_PAGE_VIEW: (f64, f64) = (800.0, 600.0);

/// Lifecycle of the view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Idle,
    Loading { file_id: String },
    Ready,
    /// `terminal` errors are not retried.
    Failed { message: String, terminal: bool },
}

/// Why a redraw happened. Every mutator names exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedrawReason {
    Zoom,
    Scroll,
    Resize,
    Selection,
    Hover,
    Page,
    DataArrival,
    Sheet,
    Findings,
}

/// A finding with its eligibility against the loaded sheets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindingEntry {
    pub record: FindingRecord,
    pub eligibility: Eligibility,
}

/// Natural size of a raster page at 100% zoom, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Everything the last redraw produced.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub reason: RedrawReason,
    pub grid: Option<GridFrame>,
    pub page: u32,
    pub page_canvas: Option<CanvasSize>,
    pub overlay: Vec<OverlayShape>,
    pub page_scroll: ScrollTarget,
}

/// Metadata request for a file.
pub struct OpenJob<S> {
    source: Rc<S>,
    file_id: String,
    seq: u64,
}

pub struct OpenOutcome {
    file_id: String,
    seq: u64,
    result: Result<MetaResponse>,
}

impl<S: TileSource> OpenJob<S> {
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub async fn run(self) -> OpenOutcome {
        let result = self.source.meta(&self.file_id).await;
        OpenOutcome {
            file_id: self.file_id,
            seq: self.seq,
            result,
        }
    }
}

/// A batch of tile fetches for one sheet.
pub struct PreloadJob<S> {
    source: Rc<S>,
    cache: Rc<TileCache>,
    file_id: String,
    sheet: String,
    origins: Vec<(u32, u32)>,
    generation: u64,
}

pub struct PreloadOutcome {
    cache: Rc<TileCache>,
    sheet: String,
    origins: Vec<(u32, u32)>,
    generation: u64,
    pub report: PreloadReport,
}

impl<S: TileSource> PreloadJob<S> {
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn origins(&self) -> &[(u32, u32)] {
        &self.origins
    }

    pub async fn run(self) -> PreloadOutcome {
        let report = self
            .cache
            .preload(&*self.source, &self.file_id, &self.sheet, &self.origins)
            .await;
        PreloadOutcome {
            cache: self.cache,
            sheet: self.sheet,
            origins: self.origins,
            generation: self.generation,
            report,
        }
    }
}

/// A cell waiting for its tiles before the grid scrolls to it.
#[derive(Debug, Clone)]
struct PendingReveal {
    sheet: String,
    cell: Address,
    origins: Vec<(u32, u32)>,
}

pub struct AuditSession<S> {
    config: ViewerConfig,
    source: Rc<S>,
    cache: Rc<TileCache>,
    file_id: Option<String>,
    open_seq: u64,
    state: ViewState,
    sheets: Vec<SheetMeta>,
    active_sheet: usize,
    layout: Option<GridLayout>,
    viewport: ViewportState,
    findings: Vec<FindingEntry>,
    overlay: OverlayEngine,
    pages: Vec<PageSize>,
    page_view: (f64, f64),
    page_scroll: ScrollTarget,
    in_flight: HashSet<(u32, u32)>,
    pending_reveal: Option<PendingReveal>,
    renderer: Option<Box<dyn RenderBackend>>,
    frame: Option<Frame>,
    redraw_count: u64,
    last_preload: Option<PreloadReport>,
}

impl<S: TileSource> AuditSession<S> {
    pub fn new(config: ViewerConfig, source: S) -> Self {
        let cache = Rc::new(TileCache::from_config(&config));
        let overlay = OverlayEngine::new(config.hit_policy, config.palette.clone());
        Self {
            config,
            source: Rc::new(source),
            cache,
            file_id: None,
            open_seq: 0,
            state: ViewState::Idle,
            sheets: Vec::new(),
            active_sheet: 0,
            layout: None,
            viewport: ViewportState::new(),
            findings: Vec::new(),
            overlay,
            pages: Vec::new(),
            page_view: DEFAULT_PAGE_VIEW,
            page_scroll: ScrollTarget::default(),
            in_flight: HashSet::new(),
            pending_reveal: None,
            renderer: None,
            frame: None,
            redraw_count: 0,
            last_preload: None,
        }
    }

    /// Paint every future redraw with `renderer`.
    pub fn set_renderer(&mut self, renderer: Box<dyn RenderBackend>) {
        self.renderer = Some(renderer);
    }

    pub fn renderer(&self) -> Option<&dyn RenderBackend> {
        self.renderer.as_deref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut (dyn RenderBackend + 'static)> {
        self.renderer.as_deref_mut()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn sheets(&self) -> &[SheetMeta] {
        &self.sheets
    }

    pub fn active_sheet(&self) -> Option<&SheetMeta> {
        self.sheets.get(self.active_sheet)
    }

    pub fn layout(&self) -> Option<&GridLayout> {
        self.layout.as_ref()
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn findings(&self) -> &[FindingEntry] {
        &self.findings
    }

    pub fn overlay(&self) -> &OverlayEngine {
        &self.overlay
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraw_count
    }

    pub fn last_redraw(&self) -> Option<RedrawReason> {
        self.frame.as_ref().map(|f| f.reason)
    }

    pub fn last_preload(&self) -> Option<&PreloadReport> {
        self.last_preload.as_ref()
    }

    pub fn page_scroll(&self) -> ScrollTarget {
        self.page_scroll
    }

    /// Tile origins requested but not yet answered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn active_sheet_name(&self) -> Option<&str> {
        self.active_sheet().map(|s| s.name.as_str())
    }

    // ----- open / sheet / file -----

    /// Start loading `file_id`. An empty id is a terminal failure.
    pub fn begin_open(&mut self, file_id: &str) -> Result<OpenJob<S>> {
        self.open_seq += 1;
        let file_id = file_id.trim();
        if file_id.is_empty() {
            self.file_id = None;
            let err = AuditViewError::MissingFile;
            self.fail(&err);
            return Err(err);
        }
        tracing::info!(file_id, "opening file");
        self.file_id = Some(file_id.to_string());
        self.state = ViewState::Loading {
            file_id: file_id.to_string(),
        };
        Ok(OpenJob {
            source: Rc::clone(&self.source),
            file_id: file_id.to_string(),
            seq: self.open_seq,
        })
    }

    /// Apply loaded metadata. Returns the initial preload.
    ///
    /// An outcome for an open that has since been superseded is ignored.
    pub fn finish_open(&mut self, outcome: OpenOutcome) -> Result<Option<PreloadJob<S>>> {
        if outcome.seq != self.open_seq {
            tracing::debug!(file_id = %outcome.file_id, "ignoring superseded metadata");
            return Ok(None);
        }
        let meta = match outcome.result {
            Ok(meta) if meta.sheets.is_empty() => {
                Err(AuditViewError::Metadata("file has no sheets".to_string()))
            }
            Ok(meta) => Ok(meta),
            Err(e) => Err(AuditViewError::Metadata(e.to_string())),
        };
        let meta = match meta {
            Ok(meta) => meta,
            Err(err) => {
                tracing::warn!(file_id = %outcome.file_id, "metadata failed: {err}");
                self.fail(&err);
                return Err(err);
            }
        };
        tracing::info!(
            file_id = %outcome.file_id,
            sheets = meta.sheets.len(),
            "metadata loaded"
        );
        self.sheets = meta.sheets;
        self.state = ViewState::Ready;
        self.reclassify();
        Ok(self.activate_sheet(0))
    }

    fn fail(&mut self, err: &AuditViewError) {
        self.state = ViewState::Failed {
            message: err.to_string(),
            terminal: err.is_terminal(),
        };
        self.sheets.clear();
        self.layout = None;
        self.in_flight.clear();
        self.pending_reveal = None;
        self.reclassify();
        self.redraw(RedrawReason::Sheet);
    }

    /// Clear the cache and reset the viewport for the sheet at `index`.
    fn reset_sheet(&mut self, index: usize) {
        self.cache.clear();
        self.in_flight.clear();
        self.pending_reveal = None;
        self.active_sheet = index;
        self.viewport.reset();
        self.page_scroll = ScrollTarget::default();
        self.layout = self
            .sheets
            .get(index)
            .map(|meta| GridLayout::new(meta, &self.config, self.viewport.zoom_percent));
        self.redraw(RedrawReason::Sheet);
    }

    fn activate_sheet(&mut self, index: usize) -> Option<PreloadJob<S>> {
        self.reset_sheet(index);
        self.plan_preload()
    }

    pub fn switch_sheet(&mut self, name: &str) -> Result<Option<PreloadJob<S>>> {
        let (index, _) = find_sheet(&self.sheets, name)
            .ok_or_else(|| AuditViewError::UnknownSheet(name.to_string()))?;
        tracing::info!(sheet = name, "switching sheet");
        Ok(self.activate_sheet(index))
    }

    /// Drop everything tied to the current file and open another one.
    pub fn switch_file(&mut self, file_id: &str) -> Result<OpenJob<S>> {
        self.cache = Rc::new(TileCache::from_config(&self.config));
        self.in_flight.clear();
        self.pending_reveal = None;
        self.sheets.clear();
        self.layout = None;
        self.viewport.reset();
        self.begin_open(file_id)
    }

    // ----- viewport -----

    fn content_size(&self) -> Option<(f64, f64)> {
        self.layout
            .as_ref()
            .map(|l| (l.content_width(), l.content_height()))
    }

    pub fn set_zoom(&mut self, percent: u32) -> Option<PreloadJob<S>> {
        let next = self.config.clamp_zoom(percent);
        let prev = self.viewport.zoom_percent;
        if next == prev {
            return None;
        }
        self.viewport.zoom_percent = next;
        self.viewport.rescale_scroll(prev, next);
        if let Some(layout) = self.layout.as_mut() {
            layout.set_zoom(next);
        }
        if let Some((w, h)) = self.content_size() {
            self.viewport.clamp_scroll(w, h);
        }
        self.redraw(RedrawReason::Zoom);
        self.plan_preload()
    }

    pub fn zoom_in(&mut self) -> Option<PreloadJob<S>> {
        let target = self
            .viewport
            .zoom_percent
            .saturating_add(self.config.zoom_step);
        self.set_zoom(target)
    }

    pub fn zoom_out(&mut self) -> Option<PreloadJob<S>> {
        let target = self
            .viewport
            .zoom_percent
            .saturating_sub(self.config.zoom_step);
        self.set_zoom(target)
    }

    /// Scroll the grid to absolute offsets. Newly visible tiles are returned
    /// as a preload.
    pub fn scroll_to(&mut self, left: f64, top: f64) -> Option<PreloadJob<S>> {
        let (w, h) = self.content_size()?;
        if !self.viewport.set_scroll(left, top, w, h) {
            return None;
        }
        self.redraw(RedrawReason::Scroll);
        self.plan_preload()
    }

    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> Option<PreloadJob<S>> {
        self.scroll_to(self.viewport.scroll_left + dx, self.viewport.scroll_top + dy)
    }

    /// Size of the grid's content area, excluding header strips.
    pub fn resize(&mut self, width: f64, height: f64) -> Option<PreloadJob<S>> {
        self.viewport.resize(width, height);
        if let Some((w, h)) = self.content_size() {
            self.viewport.clamp_scroll(w, h);
        }
        self.redraw(RedrawReason::Resize);
        self.plan_preload()
    }

    /// Size of the raster page panel.
    pub fn resize_page_view(&mut self, width: f64, height: f64) {
        self.page_view = (width.max(0.0), height.max(0.0));
        self.redraw(RedrawReason::Resize);
    }

    // ----- pages -----

    pub fn set_pages(&mut self, pages: Vec<PageSize>) {
        self.pages = pages;
        let last = u32::try_from(self.pages.len()).unwrap_or(u32::MAX).max(1);
        self.viewport.current_page = self.viewport.current_page.clamp(1, last);
        self.redraw(RedrawReason::Page);
    }

    pub fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    /// Show page `page` (1-based, clamped to the page list).
    pub fn set_page(&mut self, page: u32) {
        let last = self.page_count().max(1);
        let page = page.clamp(1, last);
        if page == self.viewport.current_page {
            return;
        }
        self.viewport.current_page = page;
        self.page_scroll = ScrollTarget::default();
        self.redraw(RedrawReason::Page);
    }

    /// Pixel size of the current page at the current zoom.
    pub fn page_canvas(&self) -> Option<CanvasSize> {
        let index = usize::try_from(self.viewport.current_page.checked_sub(1)?).ok()?;
        let page = self.pages.get(index)?;
        let scale = self.viewport.scale();
        Some(CanvasSize::new(page.width * scale, page.height * scale))
    }

    // ----- findings -----

    pub fn set_findings(&mut self, records: Vec<FindingRecord>) {
        self.findings = records
            .into_iter()
            .map(|record| FindingEntry {
                eligibility: classify(&record, &self.sheets),
                record,
            })
            .collect();
        let boxes = self
            .findings
            .iter()
            .filter_map(|entry| {
                let record = &entry.record;
                Some(OverlayBox {
                    id: record.id.clone(),
                    page: record.page?,
                    bbox: BoundingBox::sanitize(record.bounding_box?),
                    confidence: record.confidence,
                })
            })
            .collect();
        self.overlay.set_boxes(boxes);
        tracing::debug!(
            findings = self.findings.len(),
            boxes = self.overlay.boxes().len(),
            "findings loaded"
        );
        self.redraw(RedrawReason::Findings);
    }

    fn reclassify(&mut self) {
        for entry in &mut self.findings {
            entry.eligibility = classify(&entry.record, &self.sheets);
        }
    }

    pub fn finding(&self, id: &str) -> Option<&FindingEntry> {
        self.findings.iter().find(|e| e.record.id == id)
    }

    pub fn summary(&self) -> AuditSummary {
        let non_interactive = self
            .findings
            .iter()
            .filter(|e| !e.eligibility.is_interactive())
            .count();
        AuditSummary::tally(self.findings.iter().map(|e| &e.record), non_interactive)
    }

    /// Every highlighted cell of every interactive finding.
    pub fn highlights(&self) -> Vec<HighlightSpec> {
        self.findings
            .iter()
            .flat_map(|e| highlights(&e.record.id, &e.eligibility))
            .collect()
    }

    /// Select an interactive finding: switch to its sheet, show its page,
    /// then scroll the grid to its first cell once the tiles covering its
    /// cells are loaded.
    pub fn begin_focus(&mut self, id: &str) -> Result<Option<PreloadJob<S>>> {
        let entry = self
            .finding(id)
            .ok_or_else(|| AuditViewError::UnknownFinding(id.to_string()))?;
        let (sheet, cells) = match &entry.eligibility {
            Eligibility::Interactive { sheet, cells } => (sheet.clone(), cells.clone()),
            Eligibility::NonInteractive { reason } => {
                return Err(AuditViewError::NotInteractive {
                    id: id.to_string(),
                    reason: reason.to_string(),
                })
            }
        };
        let page = entry.record.page;
        let target = cells
            .first()
            .copied()
            .ok_or_else(|| AuditViewError::NotInteractive {
                id: id.to_string(),
                reason: "no cells".to_string(),
            })?;

        if self.active_sheet_name() != Some(sheet.as_str()) {
            let (index, _) = find_sheet(&self.sheets, &sheet)
                .ok_or_else(|| AuditViewError::UnknownSheet(sheet.clone()))?;
            tracing::info!(sheet = %sheet, finding = id, "switching sheet for finding");
            self.reset_sheet(index);
        }

        self.overlay.select(Some(id));
        if let Some(page) = page {
            let last = self.page_count().max(1);
            self.viewport.current_page = page.clamp(1, last);
        }
        self.center_page_on(id);
        self.redraw(RedrawReason::Selection);

        Ok(self.reveal(&sheet, target, &cells))
    }

    /// Clamp `cell` through the backend's spotlight endpoint, then scroll to it.
    pub async fn spotlight(&mut self, cell: Address) -> Result<Spotlight> {
        let file_id = self.file_id.clone().ok_or(AuditViewError::MissingFile)?;
        let sheet = self
            .active_sheet_name()
            .ok_or_else(|| AuditViewError::Metadata("no sheet loaded".to_string()))?
            .to_string();
        let spot = self.source.spotlight(&file_id, &sheet, cell).await?;
        let target = Address::new(spot.row, spot.col).unwrap_or(cell);
        let job = self.reveal(&sheet, target, &[target]);
        self.drive(job).await;
        Ok(spot)
    }

    fn center_page_on(&mut self, id: &str) {
        let Some(canvas) = self.page_canvas() else {
            return;
        };
        let Some(b) = self.overlay.get(id) else {
            return;
        };
        if b.page != self.viewport.current_page {
            return;
        }
        let (vw, vh) = self.page_view;
        self.page_scroll = ScrollCoordinator::to_box(&b.bbox, canvas, vw, vh);
    }

    /// Register `target` as pending and fetch the tiles covering `cells`.
    fn reveal(&mut self, sheet: &str, target: Address, cells: &[Address]) -> Option<PreloadJob<S>> {
        let (declared_rows, declared_cols) = self
            .layout
            .as_ref()
            .map_or((0, 0), |l| (l.declared_rows, l.declared_cols));
        let mut origins: Vec<(u32, u32)> = cells
            .iter()
            .filter(|c| c.row <= declared_rows && c.col <= declared_cols)
            .map(|c| {
                (
                    tile_origin(c.row, self.cache.tile_rows()),
                    tile_origin(c.col, self.cache.tile_cols()),
                )
            })
            .collect();
        origins.sort_unstable();
        origins.dedup();

        self.pending_reveal = Some(PendingReveal {
            sheet: sheet.to_string(),
            cell: target,
            origins: origins.clone(),
        });

        let missing: Vec<(u32, u32)> = origins
            .into_iter()
            .filter(|&(r, c)| {
                !self.cache.contains(sheet, r, c) && !self.in_flight.contains(&(r, c))
            })
            .collect();
        if missing.is_empty() && !self.reveal_waiting() {
            return self.complete_reveal();
        }
        self.job(missing)
    }

    fn reveal_waiting(&self) -> bool {
        self.pending_reveal
            .as_ref()
            .is_some_and(|p| p.origins.iter().any(|o| self.in_flight.contains(o)))
    }

    fn complete_reveal(&mut self) -> Option<PreloadJob<S>> {
        let pending = self.pending_reveal.take()?;
        if self.active_sheet_name() != Some(pending.sheet.as_str()) {
            return None;
        }
        let layout = self.layout.as_ref()?;
        let target = ScrollCoordinator::to_cell(layout, &self.viewport, pending.cell);
        let (w, h) = (layout.content_width(), layout.content_height());
        tracing::debug!(
            cell = %pending.cell,
            left = target.left,
            top = target.top,
            "centering cell"
        );
        self.viewport.set_scroll(target.left, target.top, w, h);
        self.redraw(RedrawReason::Scroll);
        self.plan_preload()
    }

    // ----- pointer -----

    /// Hover from a pointer position on the page overlay.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let Some(canvas) = self.page_canvas() else {
            return false;
        };
        let page = self.viewport.current_page;
        let changed = self.overlay.pointer_move(page, canvas, x, y);
        if changed {
            self.redraw(RedrawReason::Hover);
        }
        changed
    }

    /// Select the box under the pointer. Returns its finding id; callers
    /// follow up with [`AuditSession::begin_focus`] to bring the grid along.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<String> {
        let canvas = self.page_canvas()?;
        let page = self.viewport.current_page;
        let id = self.overlay.pointer_down(page, canvas, x, y)?;
        self.redraw(RedrawReason::Selection);
        Some(id)
    }

    // ----- preload -----

    fn job(&mut self, origins: Vec<(u32, u32)>) -> Option<PreloadJob<S>> {
        if origins.is_empty() {
            return None;
        }
        let file_id = self.file_id.clone()?;
        let sheet = self.active_sheet_name()?.to_string();
        self.in_flight.extend(origins.iter().copied());
        tracing::debug!(sheet = %sheet, tiles = origins.len(), "planned preload");
        Some(PreloadJob {
            source: Rc::clone(&self.source),
            cache: Rc::clone(&self.cache),
            file_id,
            sheet,
            origins,
            generation: self.cache.generation(),
        })
    }

    /// Tiles the visible region needs that are neither cached nor in flight.
    pub fn plan_preload(&mut self) -> Option<PreloadJob<S>> {
        if self.state != ViewState::Ready {
            return None;
        }
        let layout = self.layout.as_ref()?;
        let sheet = self.active_sheet_name()?;
        let origins: Vec<(u32, u32)> = plan_visible(
            layout,
            &self.viewport,
            self.cache.tile_rows(),
            self.cache.tile_cols(),
        )
        .into_iter()
        .filter(|&(r, c)| !self.cache.contains(sheet, r, c) && !self.in_flight.contains(&(r, c)))
        .collect();
        self.job(origins)
    }

    /// Apply a finished preload. Outcomes for a cleared cache, a replaced
    /// cache or another sheet are dropped.
    pub fn finish_preload(&mut self, outcome: PreloadOutcome) -> Option<PreloadJob<S>> {
        let current = Rc::ptr_eq(&outcome.cache, &self.cache)
            && outcome.generation == self.cache.generation()
            && self.active_sheet_name() == Some(outcome.sheet.as_str());
        if !current {
            tracing::debug!(sheet = %outcome.sheet, "discarding stale preload");
            return None;
        }
        for origin in &outcome.origins {
            self.in_flight.remove(origin);
        }
        self.last_preload = Some(outcome.report);
        self.redraw(RedrawReason::DataArrival);

        if self.pending_reveal.is_some() && !self.reveal_waiting() {
            return self.complete_reveal();
        }
        None
    }

    // ----- redraw -----

    /// Rebuild the frame and paint it. The only place that renders.
    pub fn redraw(&mut self, reason: RedrawReason) {
        self.redraw_count += 1;
        let highlights = self.highlights();
        let grid = match (&self.state, &self.layout, self.sheets.get(self.active_sheet)) {
            (ViewState::Ready, Some(layout), Some(meta)) => Some(build_frame(&GridParams {
                layout,
                viewport: &self.viewport,
                cache: &self.cache,
                sheet: &meta.name,
                highlights: &highlights,
                active_finding: self.overlay.selected(),
                palette: &self.config.palette,
            })),
            _ => None,
        };
        let page = self.viewport.current_page;
        let page_canvas = self.page_canvas();
        let overlay = page_canvas
            .map(|canvas| self.overlay.shapes(page, canvas))
            .unwrap_or_default();

        if let Some(renderer) = self.renderer.as_mut() {
            if let Some(grid) = &grid {
                if let Err(e) = renderer.draw_grid(grid) {
                    tracing::warn!("grid paint failed: {e}");
                }
            }
            if let Some(canvas) = page_canvas {
                if let Err(e) = renderer.draw_overlay(page, canvas, &overlay) {
                    tracing::warn!("overlay paint failed: {e}");
                }
            }
        }
        tracing::trace!(?reason, "redraw");
        self.frame = Some(Frame {
            reason,
            grid,
            page,
            page_canvas,
            overlay,
            page_scroll: self.page_scroll,
        });
    }

    // ----- native drivers -----

    /// Open `file_id` and load the tiles of the initial viewport.
    pub async fn open(&mut self, file_id: &str) -> Result<()> {
        let job = self.begin_open(file_id)?;
        let outcome = job.run().await;
        let preload = self.finish_open(outcome)?;
        self.drive(preload).await;
        Ok(())
    }

    /// Run a preload and every follow-up it triggers.
    pub async fn drive(&mut self, mut job: Option<PreloadJob<S>>) {
        while let Some(next) = job.take() {
            let outcome = next.run().await;
            job = self.finish_preload(outcome);
        }
    }

    pub async fn focus_finding(&mut self, id: &str) -> Result<()> {
        let job = self.begin_focus(id)?;
        self.drive(job).await;
        Ok(())
    }
}
