//! Structured error types for auditview.
//!
//! Every failure is scoped to the view that raised it; nothing here is fatal
//! to the host application.

/// All errors that can occur while loading, fetching, and rendering a view.
#[derive(Debug, thiserror::Error)]
pub enum AuditViewError {
    /// The backend answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The request never produced a response (network, CORS, aborted).
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Response body could not be decoded.
    #[error("JSON decoding: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// A sheet name that is not part of the loaded metadata.
    #[error("Sheet not found: {0}")]
    UnknownSheet(String),

    /// The session has no backing file id.
    #[error("No file is linked to this view")]
    MissingFile,

    /// Metadata could not be loaded; the grid has no known dimensions.
    #[error("Metadata unavailable: {0}")]
    Metadata(String),

    /// No finding with this id is loaded.
    #[error("Unknown finding: {0}")]
    UnknownFinding(String),

    /// The finding is listed but cannot be highlighted.
    #[error("Finding {id} is not interactive: {reason}")]
    NotInteractive { id: String, reason: String },

    /// Invalid cell reference.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// Invalid viewer configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Canvas or DOM setup failed.
    #[error("Render error: {0}")]
    Render(String),

    /// CSV input for the local tile source.
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AuditViewError>;

impl AuditViewError {
    /// Whether retrying the same operation could ever succeed.
    ///
    /// A view without a file id stays broken until the host links one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::MissingFile)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<AuditViewError> for wasm_bindgen::JsValue {
    fn from(e: AuditViewError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
