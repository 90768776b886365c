//! Page renderer
//!
//! Resolves the effective scale for one page, asks the backend to paint it and
//! turns every failure into a placeholder surface. Rendering never fails as a
//! whole: a broken page becomes a tile, and its spread sibling is unaffected.

use image::{Rgba, RgbaImage};

use super::backend::PageSource;
use super::error::ViewerError;
use super::types::{PageSize, SurfaceSize};

/// Fill for a slot with no page behind it
pub const MISSING_FILL: Rgba<u8> = Rgba([0xf8, 0xf9, 0xfa, 0xff]);
/// Fill for a page the backend failed to paint
pub const FAILED_FILL: Rgba<u8> = Rgba([0xfe, 0xf2, 0xf2, 0xff]);

/// Upper bound on either side of any page bitmap, painted or placeholder
pub const MAX_PAGE_DIMENSION: u32 = 8192;

pub const DEFAULT_FULLSCREEN_BOOST: f32 = 1.2;

/// Inputs for one page render
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    /// Surface the page is fitted into
    pub surface: SurfaceSize,
    /// User zoom factor
    pub zoom: f32,
    pub fullscreen: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlaceholderKind {
    /// Slot index outside `[1, page_count]`
    Missing,
    /// Backend could not size or paint the page
    Failed(ViewerError),
}

impl PlaceholderKind {
    pub fn fill(&self) -> Rgba<u8> {
        match self {
            PlaceholderKind::Missing => MISSING_FILL,
            PlaceholderKind::Failed(_) => FAILED_FILL,
        }
    }
}

/// Outcome of rendering one slot
#[derive(Clone)]
pub enum RenderResult {
    Painted {
        page: usize,
        image: RgbaImage,
        effective_scale: f32,
    },
    Placeholder {
        page: usize,
        kind: PlaceholderKind,
        image: RgbaImage,
    },
}

impl RenderResult {
    pub fn page(&self) -> usize {
        match self {
            RenderResult::Painted { page, .. } | RenderResult::Placeholder { page, .. } => *page,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        match self {
            RenderResult::Painted { image, .. } | RenderResult::Placeholder { image, .. } => image,
        }
    }

    pub fn is_painted(&self) -> bool {
        matches!(self, RenderResult::Painted { .. })
    }

    /// Page error carried by a failed placeholder
    pub fn error(&self) -> Option<&ViewerError> {
        match self {
            RenderResult::Placeholder {
                kind: PlaceholderKind::Failed(err),
                ..
            } => Some(err),
            _ => None,
        }
    }

    /// Text a presentation layer should draw on a placeholder tile
    pub fn label(&self) -> Option<String> {
        match self {
            RenderResult::Painted { .. } => None,
            RenderResult::Placeholder {
                kind: PlaceholderKind::Missing,
                ..
            } => Some("No page".to_string()),
            RenderResult::Placeholder {
                page,
                kind: PlaceholderKind::Failed(_),
                ..
            } => Some(format!("Page {page} failed to load")),
        }
    }
}

impl std::fmt::Debug for RenderResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderResult::Painted {
                page,
                image,
                effective_scale,
            } => f
                .debug_struct("Painted")
                .field("page", page)
                .field("size", &image.dimensions())
                .field("effective_scale", effective_scale)
                .finish(),
            RenderResult::Placeholder { page, kind, image } => f
                .debug_struct("Placeholder")
                .field("page", page)
                .field("kind", kind)
                .field("size", &image.dimensions())
                .finish(),
        }
    }
}

/// Stateless page renderer
#[derive(Clone, Copy, Debug)]
pub struct PageRenderer {
    fullscreen_boost: f32,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_FULLSCREEN_BOOST)
    }
}

impl PageRenderer {
    pub fn new(fullscreen_boost: f32) -> Self {
        let fullscreen_boost = if fullscreen_boost.is_finite() && fullscreen_boost > 0.0 {
            fullscreen_boost
        } else {
            DEFAULT_FULLSCREEN_BOOST
        };
        Self { fullscreen_boost }
    }

    /// Fit-to-surface scale times zoom, boosted in fullscreen
    pub fn effective_scale(&self, native: PageSize, params: &RenderParams) -> f32 {
        let fit = (params.surface.width as f32 / native.width)
            .min(params.surface.height as f32 / native.height);
        let boost = if params.fullscreen {
            self.fullscreen_boost
        } else {
            1.0
        };
        fit * params.zoom * boost
    }

    pub fn render(&self, source: &dyn PageSource, page: usize, params: &RenderParams) -> RenderResult {
        if page == 0 || page > source.page_count() {
            return placeholder(page, PlaceholderKind::Missing, params.surface);
        }

        let native = match source.native_size(page) {
            Ok(size) if size.is_usable() => size,
            Ok(size) => {
                return failed(
                    page,
                    format!("unusable page size {}x{}", size.width, size.height),
                    params.surface,
                );
            }
            Err(e) => return failed(page, e.to_string(), params.surface),
        };

        let scale = self.effective_scale(native, params);
        if !scale.is_finite() || scale <= 0.0 {
            return failed(page, "surface too small to paint".to_string(), params.surface);
        }

        match source.render(page, scale) {
            Ok(image) => RenderResult::Painted {
                page,
                image,
                effective_scale: scale,
            },
            Err(e) => failed(page, e.to_string(), params.surface),
        }
    }
}

fn failed(page: usize, reason: String, surface: SurfaceSize) -> RenderResult {
    log::warn!("Page {page} failed to render: {reason}");
    placeholder(
        page,
        PlaceholderKind::Failed(ViewerError::PageRenderFailed { page, reason }),
        surface,
    )
}

fn placeholder(page: usize, kind: PlaceholderKind, surface: SurfaceSize) -> RenderResult {
    let width = surface.width.clamp(1, MAX_PAGE_DIMENSION);
    let height = surface.height.clamp(1, MAX_PAGE_DIMENSION);
    let image = RgbaImage::from_pixel(width, height, kind.fill());
    RenderResult::Placeholder { page, kind, image }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::error::BackendFault;

    struct TwoPages;

    impl PageSource for TwoPages {
        fn page_count(&self) -> usize {
            2
        }

        fn native_size(&self, page: usize) -> Result<PageSize, BackendFault> {
            match page {
                1 => Ok(PageSize::new(100.0, 200.0)),
                _ => Ok(PageSize::new(0.0, 0.0)),
            }
        }

        fn render(&self, _page: usize, scale: f32) -> Result<RgbaImage, BackendFault> {
            let w = (100.0 * scale).round() as u32;
            let h = (200.0 * scale).round() as u32;
            Ok(RgbaImage::new(w, h))
        }
    }

    fn params(zoom: f32, fullscreen: bool) -> RenderParams {
        RenderParams {
            surface: SurfaceSize::new(300, 300),
            zoom,
            fullscreen,
        }
    }

    #[test]
    fn effective_scale_fits_then_zooms() {
        let renderer = PageRenderer::default();
        let native = PageSize::new(100.0, 200.0);
        // min(300/100, 300/200) = 1.5
        assert!((renderer.effective_scale(native, &params(1.0, false)) - 1.5).abs() < 1e-6);
        assert!((renderer.effective_scale(native, &params(2.0, false)) - 3.0).abs() < 1e-6);
        assert!((renderer.effective_scale(native, &params(1.0, true)) - 1.8).abs() < 1e-5);
    }

    #[test]
    fn painted_surface_grows_to_content() {
        let result = PageRenderer::default().render(&TwoPages, 1, &params(2.0, false));
        assert!(result.is_painted());
        assert_eq!(result.image().dimensions(), (300, 600));
        assert_eq!(result.label(), None);
    }

    #[test]
    fn out_of_range_pages_are_missing_placeholders() {
        for page in [0, 3, 99] {
            let result = PageRenderer::default().render(&TwoPages, page, &params(1.0, false));
            match &result {
                RenderResult::Placeholder {
                    kind: PlaceholderKind::Missing,
                    image,
                    ..
                } => {
                    assert_eq!(image.dimensions(), (300, 300));
                    assert_eq!(*image.get_pixel(0, 0), MISSING_FILL);
                }
                other => panic!("expected missing placeholder, got {other:?}"),
            }
            assert_eq!(result.label().as_deref(), Some("No page"));
        }
    }

    #[test]
    fn degenerate_page_becomes_failed_placeholder() {
        let result = PageRenderer::default().render(&TwoPages, 2, &params(1.0, false));
        assert_eq!(*result.image().get_pixel(0, 0), FAILED_FILL);
        assert!(matches!(
            result.error(),
            Some(ViewerError::PageRenderFailed { page: 2, .. })
        ));
        assert_eq!(result.label().as_deref(), Some("Page 2 failed to load"));
    }

    #[test]
    fn empty_surface_fails_softly() {
        let params = RenderParams {
            surface: SurfaceSize::new(0, 0),
            zoom: 1.0,
            fullscreen: false,
        };
        let result = PageRenderer::default().render(&TwoPages, 1, &params);
        assert!(result.error().is_some());
        assert_eq!(result.image().dimensions(), (1, 1));
    }

    #[test]
    fn oversized_surface_caps_placeholder() {
        let params = RenderParams {
            surface: SurfaceSize::new(1_000_000, 20),
            zoom: 1.0,
            fullscreen: false,
        };
        let result = PageRenderer::default().render(&TwoPages, 5, &params);
        assert_eq!(result.image().dimensions(), (MAX_PAGE_DIMENSION, 20));
    }
}
