//! Worker request and response types

use super::error::ViewerError;
use super::renderer::{RenderParams, RenderResult};

/// Token identifying one open or render pass.
///
/// Issued in strictly increasing order; a result is only applied while its
/// token is still the latest one of its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One slot of a render pass
#[derive(Clone, Debug)]
pub struct PageJob {
    /// Position on screen, 0 = left
    pub slot: usize,
    pub page: usize,
    pub params: RenderParams,
}

/// Request sent to the render worker
#[derive(Debug)]
pub enum WorkerRequest {
    /// Bring up the backend if needed, then open a document, replacing any
    /// previously opened one. `retry_backend` clears a remembered backend
    /// initialisation failure first.
    Open {
        id: RequestId,
        locator: String,
        retry_backend: bool,
    },

    /// Render every slot of the current view
    Render { id: RequestId, jobs: Vec<PageJob> },

    /// Drop the open document and stop
    Shutdown,
}

/// Response from the render worker
#[derive(Debug)]
pub enum WorkerResponse {
    /// Phase one of an open finished: the backend is usable
    BackendReady { id: RequestId },

    /// Phase two finished: the document is open
    DocumentOpened { id: RequestId, page_count: usize },

    /// An open failed in either phase
    Failed { id: RequestId, error: ViewerError },

    /// One rendered slot
    Page {
        id: RequestId,
        slot: usize,
        result: RenderResult,
    },

    /// A render pass was skipped because a newer one superseded it
    Cancelled(RequestId),
}

impl WorkerResponse {
    pub fn id(&self) -> RequestId {
        match self {
            WorkerResponse::BackendReady { id }
            | WorkerResponse::DocumentOpened { id, .. }
            | WorkerResponse::Failed { id, .. }
            | WorkerResponse::Page { id, .. } => *id,
            WorkerResponse::Cancelled(id) => *id,
        }
    }
}
