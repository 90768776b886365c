//! Viewer state management

use super::layout::LayoutPolicy;
use super::navigation::Navigator;
use super::renderer::RenderParams;
use super::request::PageJob;
use super::types::{NavigationState, PageStep, SurfaceSize, Viewport};
use super::zoom::Zoom;
use crate::settings::ViewerSettings;

/// Everything that must survive across re-renders of an open viewer
#[derive(Clone, Debug)]
pub struct ViewerState {
    pub navigator: Navigator,
    pub zoom: Zoom,
    pub viewport: Viewport,
    pub layout: LayoutPolicy,
    page_step: PageStep,
    zoom_in_factor: f32,
    zoom_out_factor: f32,
}

impl ViewerState {
    #[must_use]
    pub fn new(settings: &ViewerSettings, viewport: Viewport) -> Self {
        Self {
            navigator: Navigator::new(settings.page_step),
            zoom: Zoom::with_bounds(settings.min_scale, settings.max_scale),
            viewport,
            layout: settings.layout,
            page_step: settings.page_step,
            zoom_in_factor: settings.zoom_in_factor,
            zoom_out_factor: settings.zoom_out_factor,
        }
    }

    pub fn fullscreen(&self) -> bool {
        self.viewport.fullscreen
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigator.state()
    }

    /// Drop per-document zoom and stepping. Viewport and fullscreen persist.
    fn reset_session(&mut self) {
        let (min_scale, max_scale) = self.zoom.bounds();
        self.zoom = Zoom::with_bounds(min_scale, max_scale);
        self.navigator.set_step(self.page_step);
        self.navigator.reset(0);
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::Open(locator) => {
                self.reset_session();
                vec![Effect::OpenDocument(locator)]
            }

            Command::DocumentReady(page_count) => {
                self.navigator.reset(page_count);
                vec![Effect::RenderCurrentView]
            }

            Command::Reload => {
                self.navigator.reset(0);
                vec![Effect::ReloadDocument]
            }

            Command::Close => {
                self.reset_session();
                vec![Effect::CloseDocument]
            }

            Command::Next => render_if(self.navigator.next()),
            Command::Prev => render_if(self.navigator.prev()),
            Command::GoToPage(page) => render_if(self.navigator.go_to(page)),
            Command::GoToLast => {
                let last = self.navigator.page_count();
                render_if(self.navigator.go_to(last))
            }
            Command::TogglePageStep => render_if(self.navigator.toggle_step()),

            Command::ZoomBy(factor) => render_if(self.zoom.apply(factor)),
            Command::ZoomIn => render_if(self.zoom.apply(self.zoom_in_factor)),
            Command::ZoomOut => render_if(self.zoom.apply(self.zoom_out_factor)),
            Command::SetZoom(factor) => render_if(self.zoom.set(factor)),
            Command::ResetZoom => render_if(self.zoom.reset()),

            Command::SetViewport { width, height } => {
                if self.viewport.width != width || self.viewport.height != height {
                    self.viewport.width = width;
                    self.viewport.height = height;
                    vec![Effect::RenderCurrentView]
                } else {
                    vec![]
                }
            }

            Command::SetFullscreen(fullscreen) => {
                if self.viewport.fullscreen != fullscreen {
                    self.viewport.fullscreen = fullscreen;
                    vec![Effect::RenderCurrentView]
                } else {
                    vec![]
                }
            }
        }
    }

    /// Frame geometry of one displayed page for the current mode
    #[must_use]
    pub fn surface_size(&self) -> SurfaceSize {
        self.layout
            .surface_size(&self.viewport, self.navigator.mode(), self.fullscreen())
    }

    /// Render parameters for the current mode, viewport and zoom
    #[must_use]
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            surface: self.layout.render_target(
                &self.viewport,
                self.navigator.mode(),
                self.fullscreen(),
            ),
            zoom: self.zoom.factor(),
            fullscreen: self.fullscreen(),
        }
    }

    /// One job per slot of the current view, left to right
    #[must_use]
    pub fn render_jobs(&self) -> Vec<PageJob> {
        let params = self.render_params();
        self.navigator
            .render_slots()
            .into_iter()
            .enumerate()
            .map(|(slot, page)| PageJob { slot, page, params })
            .collect()
    }
}

fn render_if(changed: bool) -> Vec<Effect> {
    if changed {
        vec![Effect::RenderCurrentView]
    } else {
        vec![]
    }
}

/// Commands that modify viewer state
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Start a new session on a locator
    Open(String),
    /// The session finished opening a document with this many pages
    DocumentReady(usize),
    Reload,
    Close,
    Next,
    Prev,
    GoToPage(usize),
    GoToLast,
    TogglePageStep,
    /// Multiply the zoom factor
    ZoomBy(f32),
    ZoomIn,
    ZoomOut,
    SetZoom(f32),
    ResetZoom,
    SetViewport { width: u32, height: u32 },
    SetFullscreen(bool),
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Recompute layout and render the displayed page(s)
    RenderCurrentView,
    OpenDocument(String),
    /// Re-open the current locator
    ReloadDocument,
    CloseDocument,
}
