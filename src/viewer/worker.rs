//! Render worker - runs in a separate thread and owns the opened document

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use flume::{Receiver, Sender};

use super::backend::{BackendGate, PageSource, RenderBackend};
use super::error::ViewerError;
use super::renderer::PageRenderer;
use super::request::{PageJob, RequestId, WorkerRequest, WorkerResponse};

/// Main worker function - runs in a dedicated thread.
///
/// `latest_render` holds the id of the newest render pass; anything older is
/// skipped without touching the backend.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Values moved into thread, need ownership"
)]
pub fn render_worker(
    backend: Arc<dyn RenderBackend>,
    renderer: PageRenderer,
    requests: Receiver<WorkerRequest>,
    responses: Sender<WorkerResponse>,
    latest_render: Arc<AtomicU64>,
) {
    let mut gate = BackendGate::new(backend);
    let mut source: Option<Box<dyn PageSource>> = None;

    for request in requests {
        let delivered = match request {
            WorkerRequest::Open {
                id,
                locator,
                retry_backend,
            } => {
                // The previous document is released before the next one opens
                source = None;
                if retry_backend {
                    gate.reset();
                }
                handle_open(&mut gate, id, &locator, &responses, &mut source)
            }

            WorkerRequest::Render { id, jobs } => {
                handle_render(&renderer, source.as_deref(), id, jobs, &responses, &latest_render)
            }

            WorkerRequest::Shutdown => break,
        };

        if !delivered {
            log::debug!("Render worker lost its receiver, exiting");
            break;
        }
    }
}

/// Returns false once the response channel is closed
fn handle_open(
    gate: &mut BackendGate,
    id: RequestId,
    locator: &str,
    responses: &Sender<WorkerResponse>,
    source: &mut Option<Box<dyn PageSource>>,
) -> bool {
    if let Err(reason) = gate.ensure_ready() {
        let error = ViewerError::BackendUnavailable(reason);
        return responses.send(WorkerResponse::Failed { id, error }).is_ok();
    }
    if responses.send(WorkerResponse::BackendReady { id }).is_err() {
        return false;
    }

    let opened = gate.backend().open(locator);
    let response = match opened {
        Ok(doc) if doc.page_count() == 0 => WorkerResponse::Failed {
            id,
            error: ViewerError::DocumentOpenFailed {
                locator: locator.to_string(),
                reason: "document has no pages".to_string(),
            },
        },
        Ok(doc) => {
            let page_count = doc.page_count();
            *source = Some(doc);
            WorkerResponse::DocumentOpened { id, page_count }
        }
        Err(e) => WorkerResponse::Failed {
            id,
            error: ViewerError::DocumentOpenFailed {
                locator: locator.to_string(),
                reason: e.to_string(),
            },
        },
    };
    responses.send(response).is_ok()
}

fn handle_render(
    renderer: &PageRenderer,
    source: Option<&dyn PageSource>,
    id: RequestId,
    jobs: Vec<PageJob>,
    responses: &Sender<WorkerResponse>,
    latest_render: &AtomicU64,
) -> bool {
    let Some(source) = source else {
        log::debug!("Render {id} without an open document");
        return responses.send(WorkerResponse::Cancelled(id)).is_ok();
    };

    for job in jobs {
        // Checked per slot so a superseded spread stops midway
        if is_superseded(id, latest_render) {
            log::debug!("Render {id} superseded, skipping remaining slots");
            return responses.send(WorkerResponse::Cancelled(id)).is_ok();
        }

        let result = renderer.render(source, job.page, &job.params);
        let response = WorkerResponse::Page {
            id,
            slot: job.slot,
            result,
        };
        if responses.send(response).is_err() {
            return false;
        }
    }
    true
}

fn is_superseded(id: RequestId, latest_render: &AtomicU64) -> bool {
    id.0 < latest_render.load(Ordering::Acquire)
}
