//! Paginated document viewer engine
//!
//! Cover + spread navigation, surface sizing, zoom and asynchronous page
//! rendering behind a swappable [`RenderBackend`].

pub mod backend;
pub mod commands;
pub mod controller;
pub mod error;
pub mod frame;
pub mod image_backend;
pub mod layout;
#[cfg(feature = "pdf")]
pub mod mupdf_backend;
pub mod navigation;
pub mod renderer;
pub mod request;
pub mod service;
pub mod session;
pub mod state;
pub mod types;
pub mod worker;
pub mod zoom;

pub use backend::{PageSource, RenderBackend};
pub use commands::{ViewerCommand, command_for_key};
pub use controller::{ViewerController, ViewerStatus};
pub use error::{BackendFault, ViewerError};
pub use image_backend::ImageBackend;
pub use layout::{LayoutPolicy, compute_surface_size};
#[cfg(feature = "pdf")]
pub use mupdf_backend::MupdfBackend;
pub use renderer::{PageRenderer, RenderResult};
pub use types::{NavigationState, PageSize, PageStep, SurfaceSize, ViewMode, Viewport};
