//! Demand-driven tile fetching.
//!
//! This module handles:
//! - The [`TileSource`] seam to the spreadsheet backend
//! - Memoizing fetched tiles per session ([`TileCache`])
//! - Batch preloads that tolerate individual tile failures
//! - Endpoint URL construction and the browser `fetch` source

mod cache;
pub mod http;
mod source;

pub use cache::{PreloadReport, TileCache, TileFailure};
pub use http::Endpoints;
#[cfg(target_arch = "wasm32")]
pub use http::HttpTileSource;
pub use source::{MemoryTileSource, TileSource};
