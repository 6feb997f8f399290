//! `AuditViewer` - the browser entry point.
//!
//! Wraps an [`AuditSession`] over HTTP tiles in `Rc<RefCell<..>>` so DOM
//! event handlers and `spawn_local` tasks can share it. A borrow is never
//! held across an `.await`: tasks run a job, then borrow once to apply it.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

use super::session::{AuditSession, OpenJob, PageSize, PreloadJob};
use crate::config::ViewerConfig;
use crate::error::{AuditViewError, Result};
use crate::overlay::{CanvasSize, OverlayShape};
use crate::render::{CanvasRenderer, GridFrame, RenderBackend};
use crate::tiles::{Endpoints, HttpTileSource};
use crate::types::FindingRecord;

type Shared = Rc<RefCell<AuditSession<HttpTileSource>>>;

/// Grid canvas plus the optional overlay canvas above the raster page.
struct PanelRenderer {
    grid: CanvasRenderer,
    overlay: Option<CanvasRenderer>,
}

impl RenderBackend for PanelRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        self.grid.resize(width, height);
    }

    fn draw_grid(&mut self, frame: &GridFrame) -> Result<()> {
        self.grid.draw_grid(frame)
    }

    fn draw_overlay(
        &mut self,
        page: u32,
        canvas: CanvasSize,
        shapes: &[OverlayShape],
    ) -> Result<()> {
        match self.overlay.as_mut() {
            Some(overlay) => overlay.draw_overlay(page, canvas, shapes),
            None => Ok(()),
        }
    }

    fn width(&self) -> u32 {
        self.grid.width()
    }

    fn height(&self) -> u32 {
        self.grid.height()
    }
}

fn spawn_preload(session: &Shared, job: Option<PreloadJob<HttpTileSource>>) {
    let Some(job) = job else {
        return;
    };
    let session = Rc::clone(session);
    spawn_local(async move {
        let outcome = job.run().await;
        let next = session.borrow_mut().finish_preload(outcome);
        spawn_preload(&session, next);
    });
}

fn spawn_open(session: &Shared, job: OpenJob<HttpTileSource>) {
    let session = Rc::clone(session);
    spawn_local(async move {
        let outcome = job.run().await;
        let result = session.borrow_mut().finish_open(outcome);
        match result {
            Ok(preload) => spawn_preload(&session, preload),
            Err(e) => web_sys::console::warn_1(&JsValue::from_str(&e.to_string())),
        }
    });
}

fn to_js<T: serde::Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn pointer_position(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (
        f64::from(event.client_x()) - rect.left(),
        f64::from(event.client_y()) - rect.top(),
    )
}

#[wasm_bindgen]
pub struct AuditViewer {
    session: Shared,
    grid_canvas: HtmlCanvasElement,
    row_header_width: f64,
    col_header_height: f64,
    overlay_canvas: Option<HtmlCanvasElement>,
    closures: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)>,
    wheel_closure: Option<Closure<dyn FnMut(WheelEvent)>>,
}

#[wasm_bindgen]
impl AuditViewer {
    /// Create a viewer painting the grid on `grid_canvas` and the finding
    /// boxes on `overlay_canvas` (stacked over the host's page image).
    /// `config` may be `undefined` or any subset of the viewer config.
    #[wasm_bindgen(constructor)]
    pub fn new(
        grid_canvas: HtmlCanvasElement,
        overlay_canvas: Option<HtmlCanvasElement>,
        config: JsValue,
    ) -> std::result::Result<AuditViewer, JsValue> {
        console_error_panic_hook::set_once();

        let config: ViewerConfig = if config.is_undefined() || config.is_null() {
            ViewerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| AuditViewError::Config(e.to_string()))?
        };
        config.validate()?;

        let origin = web_sys::window()
            .ok_or_else(|| AuditViewError::Render("no window".to_string()))?
            .location()
            .origin()
            .map_err(|_| AuditViewError::Render("no location origin".to_string()))?;
        let source = HttpTileSource::new(Endpoints::resolve(&origin, &config.api_base)?);

        let (row_header_width, col_header_height) =
            (config.row_header_width, config.col_header_height);
        let grid = CanvasRenderer::new(grid_canvas.clone(), row_header_width, col_header_height)?;
        let overlay = match overlay_canvas.as_ref() {
            Some(canvas) => Some(CanvasRenderer::new(canvas.clone(), 0.0, 0.0)?),
            None => None,
        };

        let mut session = AuditSession::new(config, source);
        session.set_renderer(Box::new(PanelRenderer { grid, overlay }));
        let (w, h) = (
            f64::from(grid_canvas.width()) - row_header_width,
            f64::from(grid_canvas.height()) - col_header_height,
        );
        let _ = session.resize(w, h);
        let session = Rc::new(RefCell::new(session));

        let mut closures: Vec<(&'static str, Closure<dyn FnMut(MouseEvent)>)> = Vec::new();
        if let Some(canvas) = overlay_canvas.as_ref() {
            // Hover
            {
                let session = Rc::clone(&session);
                let target = canvas.clone();
                let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                    let (x, y) = pointer_position(&target, &event);
                    session.borrow_mut().pointer_move(x, y);
                }) as Box<dyn FnMut(MouseEvent)>);
                canvas
                    .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())
                    .ok();
                closures.push(("mousemove", closure));
            }
            // Select + focus
            {
                let session = Rc::clone(&session);
                let target = canvas.clone();
                let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                    let (x, y) = pointer_position(&target, &event);
                    let job = {
                        let mut s = session.borrow_mut();
                        s.pointer_down(x, y)
                            .and_then(|id| s.begin_focus(&id).ok())
                            .flatten()
                    };
                    spawn_preload(&session, job);
                }) as Box<dyn FnMut(MouseEvent)>);
                canvas
                    .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())
                    .ok();
                closures.push(("mousedown", closure));
            }
        }

        let wheel_closure = {
            let session = Rc::clone(&session);
            let closure = Closure::wrap(Box::new(move |event: WheelEvent| {
                event.prevent_default();
                let job = session
                    .borrow_mut()
                    .scroll_by(event.delta_x(), event.delta_y());
                spawn_preload(&session, job);
            }) as Box<dyn FnMut(WheelEvent)>);
            grid_canvas
                .add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())
                .ok();
            Some(closure)
        };

        Ok(AuditViewer {
            session,
            grid_canvas,
            overlay_canvas,
            row_header_width,
            col_header_height,
            closures,
            wheel_closure,
        })
    }

    /// Load a file's metadata and its first sheet.
    #[wasm_bindgen]
    pub fn open(&self, file_id: &str) -> std::result::Result<(), JsValue> {
        let job = self.session.borrow_mut().begin_open(file_id)?;
        spawn_open(&self.session, job);
        Ok(())
    }

    #[wasm_bindgen(js_name = "switchFile")]
    pub fn switch_file(&self, file_id: &str) -> std::result::Result<(), JsValue> {
        let job = self.session.borrow_mut().switch_file(file_id)?;
        spawn_open(&self.session, job);
        Ok(())
    }

    #[wasm_bindgen(js_name = "switchSheet")]
    pub fn switch_sheet(&self, name: &str) -> std::result::Result<(), JsValue> {
        let job = self.session.borrow_mut().switch_sheet(name)?;
        spawn_preload(&self.session, job);
        Ok(())
    }

    #[wasm_bindgen(js_name = "sheetNames")]
    pub fn sheet_names(&self) -> Vec<String> {
        self.session
            .borrow()
            .sheets()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    /// Current view state (`{state: "ready"}`, `{state: "failed", ...}`).
    #[wasm_bindgen]
    pub fn state(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(self.session.borrow().state())
    }

    #[wasm_bindgen(js_name = "setZoom")]
    pub fn set_zoom(&self, percent: u32) {
        let job = self.session.borrow_mut().set_zoom(percent);
        spawn_preload(&self.session, job);
    }

    #[wasm_bindgen(js_name = "zoomIn")]
    pub fn zoom_in(&self) {
        let job = self.session.borrow_mut().zoom_in();
        spawn_preload(&self.session, job);
    }

    #[wasm_bindgen(js_name = "zoomOut")]
    pub fn zoom_out(&self) {
        let job = self.session.borrow_mut().zoom_out();
        spawn_preload(&self.session, job);
    }

    #[wasm_bindgen]
    pub fn zoom(&self) -> u32 {
        self.session.borrow().viewport().zoom_percent
    }

    #[wasm_bindgen(js_name = "scrollTo")]
    pub fn scroll_to(&self, left: f64, top: f64) {
        let job = self.session.borrow_mut().scroll_to(left, top);
        spawn_preload(&self.session, job);
    }

    /// Resize the grid canvas (physical pixels, headers included).
    #[wasm_bindgen]
    pub fn resize(&self, width: u32, height: u32) {
        let job = {
            let mut s = self.session.borrow_mut();
            if let Some(renderer) = s.renderer_mut() {
                renderer.resize(width, height);
            }
            s.resize(
                f64::from(width) - self.row_header_width,
                f64::from(height) - self.col_header_height,
            )
        };
        spawn_preload(&self.session, job);
    }

    /// Size of the panel showing the raster page.
    #[wasm_bindgen(js_name = "resizePageView")]
    pub fn resize_page_view(&self, width: f64, height: f64) {
        self.session.borrow_mut().resize_page_view(width, height);
    }

    /// `[{width, height}, ...]` natural page sizes at 100% zoom.
    #[wasm_bindgen(js_name = "setPages")]
    pub fn set_pages(&self, pages: JsValue) -> std::result::Result<(), JsValue> {
        let pages: Vec<PageSize> = serde_wasm_bindgen::from_value(pages)?;
        self.session.borrow_mut().set_pages(pages);
        Ok(())
    }

    #[wasm_bindgen(js_name = "setPage")]
    pub fn set_page(&self, page: u32) {
        self.session.borrow_mut().set_page(page);
    }

    #[wasm_bindgen]
    pub fn page(&self) -> u32 {
        self.session.borrow().viewport().current_page
    }

    /// Scroll offsets that center the selected box in the page panel.
    #[wasm_bindgen(js_name = "pageScroll")]
    pub fn page_scroll(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.session.borrow().page_scroll())
    }

    #[wasm_bindgen(js_name = "setFindings")]
    pub fn set_findings(&self, findings: JsValue) -> std::result::Result<(), JsValue> {
        let records: Vec<FindingRecord> = serde_wasm_bindgen::from_value(findings)?;
        self.session.borrow_mut().set_findings(records);
        Ok(())
    }

    /// Findings with their eligibility, in input order.
    #[wasm_bindgen]
    pub fn findings(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.session.borrow().findings())
    }

    #[wasm_bindgen]
    pub fn summary(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.session.borrow().summary())
    }

    #[wasm_bindgen(js_name = "focusFinding")]
    pub fn focus_finding(&self, id: &str) -> std::result::Result<(), JsValue> {
        let job = self.session.borrow_mut().begin_focus(id)?;
        spawn_preload(&self.session, job);
        Ok(())
    }

    #[wasm_bindgen(js_name = "selectedFinding")]
    pub fn selected_finding(&self) -> Option<String> {
        self.session.borrow().overlay().selected().map(str::to_string)
    }

    /// Detach DOM listeners.
    #[wasm_bindgen]
    pub fn destroy(&mut self) {
        if let Some(closure) = self.wheel_closure.take() {
            let _ = self
                .grid_canvas
                .remove_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
        }
        for (event, closure) in self.closures.drain(..) {
            if let Some(canvas) = self.overlay_canvas.as_ref() {
                let _ = canvas
                    .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            }
        }
    }
}
