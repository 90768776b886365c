//! Render service - owns the worker thread and its channels

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use flume::{Receiver, Sender};

use super::backend::RenderBackend;
use super::renderer::PageRenderer;
use super::request::{PageJob, RequestId, WorkerRequest, WorkerResponse};
use super::worker::render_worker;

/// Handle to the background render worker.
///
/// Issues request tokens in increasing order and publishes the newest render
/// token so the worker can skip passes nobody is waiting for any more.
pub struct RenderService {
    request_tx: Sender<WorkerRequest>,
    response_rx: Receiver<WorkerResponse>,
    next_request_id: u64,
    latest_render: Arc<AtomicU64>,
    shut_down: bool,
}

impl RenderService {
    #[must_use]
    pub fn new(backend: Arc<dyn RenderBackend>, renderer: PageRenderer) -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();
        let latest_render = Arc::new(AtomicU64::new(0));

        let watermark = latest_render.clone();
        std::thread::spawn(move || {
            render_worker(backend, renderer, request_rx, response_tx, watermark);
        });

        Self {
            request_tx,
            response_rx,
            next_request_id: 1,
            latest_render,
            shut_down: false,
        }
    }

    /// Ask the worker to open `locator`
    pub fn open(&mut self, locator: &str, retry_backend: bool) -> RequestId {
        let id = self.next_id();
        let _ = self.request_tx.send(WorkerRequest::Open {
            id,
            locator: locator.to_string(),
            retry_backend,
        });
        id
    }

    /// Queue a render pass, superseding every earlier one
    pub fn render(&mut self, jobs: Vec<PageJob>) -> RequestId {
        let id = self.next_id();
        self.latest_render.store(id.0, Ordering::Release);
        let _ = self.request_tx.send(WorkerRequest::Render { id, jobs });
        id
    }

    /// Drain every response that is already available
    pub fn poll_responses(&mut self) -> Vec<WorkerResponse> {
        let mut responses = vec![];
        while let Ok(response) = self.response_rx.try_recv() {
            responses.push(response);
        }
        responses
    }

    /// Block for the next response, up to `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerResponse> {
        self.response_rx.recv_timeout(timeout).ok()
    }

    /// Stop the worker. Passes still queued are skipped.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.latest_render.store(u64::MAX, Ordering::Release);
        let _ = self.request_tx.send(WorkerRequest::Shutdown);
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
