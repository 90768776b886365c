//! Viewer error taxonomy

/// Errors a viewer session can surface
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    /// The render backend could not be initialised. Fatal until reload.
    #[error("render backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The locator could not be opened or is not a supported document
    #[error("failed to open {locator}: {reason}")]
    DocumentOpenFailed { locator: String, reason: String },

    /// A single page failed to paint. Never fatal to the session.
    #[error("page {page} failed to render: {reason}")]
    PageRenderFailed { page: usize, reason: String },
}

impl ViewerError {
    /// Whether this error puts the whole session into the error state
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ViewerError::PageRenderFailed { .. })
    }
}

/// Low-level failures reported by backend bindings
#[derive(Debug, thiserror::Error)]
pub enum BackendFault {
    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("{detail}")]
    Generic { detail: String },
}

impl BackendFault {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}
