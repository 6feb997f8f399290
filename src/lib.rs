//! auditview - audit viewer for very large spreadsheets
//!
//! Cross-references cells of a huge workbook against findings extracted
//! from a paginated document:
//! - Demand-driven tile cache over a paginated backend (`meta`, `page`, `spotlight`)
//! - Virtualized grid that only builds the visible window, at 50-200% zoom
//! - Bidirectional "AA12" address codec and multi-cell `"O10!B5!C3"` references
//! - Overlay of normalized bounding boxes with hover, selection and hit testing
//!
//! The core is target-independent and runs natively (see the
//! `auditview_cli` binary); on `wasm32` it paints to Canvas 2D and fetches
//! tiles with the browser `fetch` API.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { AuditViewer } from 'auditview';
//! await init();
//! const viewer = new AuditViewer(gridCanvas, overlayCanvas, { api_base: '/api/excel' });
//! viewer.open(fileId);
//! viewer.setFindings(findings);
//! viewer.focusFinding('F-12');
//! ```

pub mod cell_ref;
pub mod config;
pub mod error;
pub mod layout;
pub mod overlay;
pub mod references;
pub mod render;
pub mod tiles;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use viewer::AuditViewer;

pub use config::ViewerConfig;
pub use error::{AuditViewError, Result};
pub use types::*;
pub use viewer::AuditSession;

/// Cell labels ("B5") of every valid address in a `!`-joined reference.
#[wasm_bindgen(js_name = "parseReference")]
pub fn parse_reference(raw: &str) -> Vec<String> {
    references::parse_multi_cell(raw)
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Column letters for a 1-based column index ("" for 0).
#[wasm_bindgen(js_name = "columnLabel")]
pub fn column_label(col: u32) -> String {
    cell_ref::column_to_label(col)
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
