//! Viewer controller
//!
//! Single entry point for a viewer instance. Every mutating operation goes
//! through [`ViewerState::apply`]; the returned effects open documents, tear
//! them down or start a render pass on the worker. Completions are picked up
//! by [`pump`](ViewerController::pump) on the caller's thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::backend::RenderBackend;
use super::commands::ViewerCommand;
use super::error::ViewerError;
use super::frame::Frame;
use super::renderer::PageRenderer;
use super::request::WorkerResponse;
use super::service::RenderService;
use super::session::{DocumentSession, SessionPhase};
use super::state::{Command, Effect, ViewerState};
use super::types::{NavigationState, PageStep, SurfaceSize, Viewport};
use crate::settings::ViewerSettings;

/// Coarse state for a status line or loading indicator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerStatus {
    Idle,
    Loading,
    Ready,
    Error(ViewerError),
    Closed,
}

pub struct ViewerController {
    backend: Arc<dyn RenderBackend>,
    renderer: PageRenderer,
    service: Option<RenderService>,
    session: DocumentSession,
    state: ViewerState,
    frame: Option<Frame>,
}

impl ViewerController {
    #[must_use]
    pub fn new(backend: Arc<dyn RenderBackend>, settings: &ViewerSettings) -> Self {
        Self::with_viewport(backend, settings, Viewport::default())
    }

    #[must_use]
    pub fn with_viewport(
        backend: Arc<dyn RenderBackend>,
        settings: &ViewerSettings,
        viewport: Viewport,
    ) -> Self {
        let mut settings = settings.clone();
        settings.normalize();
        Self {
            backend,
            renderer: PageRenderer::new(settings.fullscreen_boost),
            service: None,
            session: DocumentSession::new(),
            state: ViewerState::new(&settings, viewport),
            frame: None,
        }
    }

    // -- operations --------------------------------------------------------

    pub fn open(&mut self, locator: &str) {
        self.apply(Command::Open(locator.to_string()));
    }

    /// Abandon everything in flight and release the document
    pub fn close(&mut self) {
        self.apply(Command::Close);
    }

    /// Discard the document and open the same locator again
    pub fn reload(&mut self) {
        if self.session.reload_target().is_none() || self.service.is_none() {
            log::debug!("Nothing to reload");
            return;
        }
        self.apply(Command::Reload);
    }

    pub fn next(&mut self) {
        self.apply(Command::Next);
    }

    pub fn prev(&mut self) {
        self.apply(Command::Prev);
    }

    pub fn go_to(&mut self, page: usize) {
        self.apply(Command::GoToPage(page));
    }

    pub fn go_to_last(&mut self) {
        self.apply(Command::GoToLast);
    }

    /// Multiply the zoom factor, clamped to the configured bounds
    pub fn zoom(&mut self, factor: f32) {
        self.apply(Command::ZoomBy(factor));
    }

    pub fn zoom_in(&mut self) {
        self.apply(Command::ZoomIn);
    }

    pub fn zoom_out(&mut self) {
        self.apply(Command::ZoomOut);
    }

    pub fn reset_zoom(&mut self) {
        self.apply(Command::ResetZoom);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.apply(Command::SetViewport { width, height });
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.apply(Command::SetFullscreen(fullscreen));
    }

    pub fn toggle_fullscreen(&mut self) {
        self.set_fullscreen(!self.state.fullscreen());
    }

    pub fn toggle_page_step(&mut self) {
        self.apply(Command::TogglePageStep);
    }

    pub fn dispatch(&mut self, command: ViewerCommand) {
        log::debug!("Dispatching {command:?}");
        match command {
            ViewerCommand::Next => self.next(),
            ViewerCommand::Prev => self.prev(),
            ViewerCommand::GoTo(page) => self.go_to(page),
            ViewerCommand::Last => self.go_to_last(),
            ViewerCommand::ZoomIn => self.zoom_in(),
            ViewerCommand::ZoomOut => self.zoom_out(),
            ViewerCommand::Zoom(factor) => self.zoom(factor),
            ViewerCommand::ResetZoom => self.reset_zoom(),
            ViewerCommand::ToggleFullscreen => self.toggle_fullscreen(),
            ViewerCommand::ExitFullscreen => self.set_fullscreen(false),
            ViewerCommand::TogglePageStep => self.toggle_page_step(),
            ViewerCommand::Reload => self.reload(),
            ViewerCommand::Close => self.close(),
        }
    }

    fn apply(&mut self, cmd: Command) {
        let effects = self.state.apply(cmd);
        self.execute_effects(effects);
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenDocument(locator) => {
                    self.frame = None;
                    let backend = self.backend.clone();
                    let renderer = self.renderer;
                    let service = self
                        .service
                        .get_or_insert_with(|| RenderService::new(backend, renderer));
                    let id = service.open(&locator, false);
                    self.session.begin_open(&locator, id);
                }

                Effect::ReloadDocument => {
                    self.frame = None;
                    let target = self.session.reload_target().map(str::to_string);
                    if let (Some(locator), Some(service)) = (target, self.service.as_mut()) {
                        let id = service.open(&locator, true);
                        self.session.begin_reload(id);
                    }
                }

                Effect::CloseDocument => {
                    self.frame = None;
                    self.session.close();
                    if let Some(mut service) = self.service.take() {
                        service.shutdown();
                    }
                }

                Effect::RenderCurrentView => self.render_current_view(),
            }
        }
    }

    fn render_current_view(&mut self) {
        if !self.session.is_ready() {
            log::debug!("Render suppressed, document not ready");
            return;
        }
        let Some(service) = self.service.as_mut() else {
            return;
        };

        let jobs = self.state.render_jobs();
        if jobs.is_empty() {
            return;
        }
        let pages: Vec<usize> = jobs.iter().map(|job| job.page).collect();
        let id = service.render(jobs);
        if let Some(previous) = &self.frame {
            if !previous.is_complete() {
                log::debug!("Render {} superseded by {id}", previous.id());
            }
        }
        log::debug!("Render {id} for pages {pages:?}");
        self.frame = Some(Frame::new(id, &pages));
    }

    // -- completions -------------------------------------------------------

    /// Apply every completion that has already arrived. Returns true if
    /// anything visible changed.
    pub fn pump(&mut self) -> bool {
        let Some(service) = self.service.as_mut() else {
            return false;
        };
        let responses = service.poll_responses();
        let mut changed = false;
        for response in responses {
            changed |= self.handle_response(response);
        }
        changed
    }

    /// Block until the document is open and the current frame is complete,
    /// or the timeout passes. Returns true if the viewer is idle.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if !self.is_busy() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let Some(service) = self.service.as_ref() else {
                return !self.is_busy();
            };
            if let Some(response) = service.recv_timeout(deadline - now) {
                self.handle_response(response);
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.session.is_loading()
            || (self.session.is_ready() && self.frame.as_ref().is_some_and(|f| !f.is_complete()))
    }

    fn handle_response(&mut self, response: WorkerResponse) -> bool {
        match response {
            WorkerResponse::BackendReady { id } => self.session.on_backend_ready(id),

            WorkerResponse::DocumentOpened { id, page_count } => {
                if !self.session.on_opened(id, page_count) {
                    log::debug!("Ignoring stale open {id}");
                    return false;
                }
                self.apply(Command::DocumentReady(page_count));
                true
            }

            WorkerResponse::Failed { id, error } => {
                if !self.session.on_failed(id, error) {
                    log::debug!("Ignoring stale failure {id}");
                    return false;
                }
                self.frame = None;
                true
            }

            WorkerResponse::Page { id, slot, result } => match self.frame.as_mut() {
                Some(frame) => frame.apply(id, slot, result),
                None => {
                    log::debug!("Discarding result {id}, no frame on screen");
                    false
                }
            },

            WorkerResponse::Cancelled(id) => {
                log::debug!("Render {id} cancelled by worker");
                false
            }
        }
    }

    // -- queries -----------------------------------------------------------

    pub fn status(&self) -> ViewerStatus {
        match self.session.phase() {
            SessionPhase::Idle => ViewerStatus::Idle,
            SessionPhase::AwaitingBackend | SessionPhase::LoadingDocument => ViewerStatus::Loading,
            SessionPhase::Ready => ViewerStatus::Ready,
            SessionPhase::Failed(err) => ViewerStatus::Error(err.clone()),
            SessionPhase::Closed => ViewerStatus::Closed,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    pub fn is_closed(&self) -> bool {
        self.session.phase() == &SessionPhase::Closed
    }

    pub fn error(&self) -> Option<&ViewerError> {
        self.session.error()
    }

    pub fn page_count(&self) -> usize {
        self.session.page_count()
    }

    pub fn navigation(&self) -> NavigationState {
        self.state.navigation()
    }

    pub fn page_step(&self) -> PageStep {
        self.state.navigator.step()
    }

    /// Pages on screen; empty until the document is ready
    pub fn displayed_pages(&self) -> Vec<usize> {
        if !self.session.is_ready() {
            return Vec::new();
        }
        self.state.navigator.displayed_pages()
    }

    /// Current frame, possibly still partly pending
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// User zoom factor
    pub fn scale(&self) -> f32 {
        self.state.zoom.factor()
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    pub fn is_fullscreen(&self) -> bool {
        self.state.fullscreen()
    }

    /// Frame size of one displayed page
    pub fn surface_size(&self) -> SurfaceSize {
        self.state.surface_size()
    }

    pub fn page_label(&self) -> String {
        self.state.navigator.label()
    }

    /// One-line summary for a toolbar or the CLI
    pub fn status_line(&self) -> String {
        match self.status() {
            ViewerStatus::Idle => "No document".to_string(),
            ViewerStatus::Loading => "Loading...".to_string(),
            ViewerStatus::Closed => "Closed".to_string(),
            ViewerStatus::Error(err) => format!("Error: {err} (press r to retry)"),
            ViewerStatus::Ready => format!(
                "{} | {} | {}{}",
                self.page_label(),
                self.state.zoom.percent_label(),
                self.page_step(),
                if self.is_fullscreen() { " | fullscreen" } else { "" }
            ),
        }
    }
}

impl Drop for ViewerController {
    fn drop(&mut self) {
        if let Some(mut service) = self.service.take() {
            service.shutdown();
        }
    }
}
