//! The audit view controller and its browser wrapper.

mod session;
#[cfg(target_arch = "wasm32")]
mod wasm;

pub use session::{
    AuditSession, FindingEntry, Frame, OpenJob, OpenOutcome, PageSize, PreloadJob, PreloadOutcome,
    RedrawReason, ViewState,
};
#[cfg(target_arch = "wasm32")]
pub use wasm::AuditViewer;
