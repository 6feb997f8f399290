//! Shared test sources.
//!
//! `ScriptedSource` wraps the in-memory workbook with request counting,
//! scripted window failures, and an optional yield so tests can interleave
//! work with an in-flight fetch.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use auditview::tiles::{MemoryTileSource, TileSource};
use auditview::{Address, AuditViewError, MetaResponse, PageRequest, Result, Spotlight, Tile};

pub struct ScriptedSource {
    inner: MemoryTileSource,
    page_requests: Cell<usize>,
    failing: RefCell<HashSet<(String, u32, u32)>>,
    yield_once: bool,
}

impl ScriptedSource {
    pub fn new(inner: MemoryTileSource) -> Self {
        Self {
            inner,
            page_requests: Cell::new(0),
            failing: RefCell::new(HashSet::new()),
            yield_once: false,
        }
    }

    /// Every `page` future returns `Pending` once before resolving.
    pub fn yielding(mut self) -> Self {
        self.yield_once = true;
        self
    }

    /// Fail any later request whose window starts at (r0, c0) on `sheet`.
    pub fn fail_window(&self, sheet: &str, r0: u32, c0: u32) {
        self.failing.borrow_mut().insert((sheet.to_string(), r0, c0));
    }

    /// `page` requests answered or failed so far.
    pub fn page_requests(&self) -> usize {
        self.page_requests.get()
    }
}

impl TileSource for ScriptedSource {
    async fn meta(&self, file_id: &str) -> Result<MetaResponse> {
        self.inner.meta(file_id).await
    }

    async fn page(&self, file_id: &str, request: &PageRequest) -> Result<Tile> {
        self.page_requests.set(self.page_requests.get() + 1);
        if self.yield_once {
            YieldOnce::default().await;
        }
        let key = (request.sheet.clone(), request.r0, request.c0);
        if self.failing.borrow().contains(&key) {
            return Err(AuditViewError::Fetch(format!(
                "{}:{}:{} unavailable",
                request.sheet, request.r0, request.c0
            )));
        }
        self.inner.page(file_id, request).await
    }

    async fn spotlight(&self, file_id: &str, sheet: &str, cell: Address) -> Result<Spotlight> {
        self.inner.spotlight(file_id, sheet, cell).await
    }
}

/// `Pending` on the first poll (waking itself), `Ready` afterwards.
#[derive(Default)]
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}
