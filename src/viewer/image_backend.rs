//! Backend over scanned page images
//!
//! A locator is either a directory, whose image files sorted by name become
//! pages 1..N, or a single image file treated as a one-page document.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use image::imageops::FilterType;
use log::{debug, warn};

use super::backend::{PageSource, RenderBackend};
use super::error::BackendFault;
use super::renderer::MAX_PAGE_DIMENSION;
use super::types::PageSize;

const PAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"];

#[derive(Debug, Default)]
pub struct ImageBackend;

impl ImageBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for ImageBackend {
    fn name(&self) -> &'static str {
        "images"
    }

    fn open(&self, locator: &str) -> Result<Box<dyn PageSource>, BackendFault> {
        let path = Path::new(locator);
        let pages = if path.is_dir() {
            collect_pages(path)?
        } else if path.is_file() {
            if !has_page_extension(path) {
                return Err(BackendFault::generic(format!(
                    "unsupported page image: {}",
                    path.display()
                )));
            }
            vec![path.to_path_buf()]
        } else {
            return Err(BackendFault::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file or directory: {locator}"),
            )));
        };

        debug!("Opened image document {locator} with {} pages", pages.len());
        Ok(Box::new(ImageDocument { pages }))
    }
}

fn has_page_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| PAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn collect_pages(dir: &Path) -> Result<Vec<PathBuf>, BackendFault> {
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_page_extension(&path) {
            pages.push(path);
        }
    }
    pages.sort();

    if pages.is_empty() {
        return Err(BackendFault::generic(format!(
            "no page images in {}",
            dir.display()
        )));
    }
    Ok(pages)
}

struct ImageDocument {
    pages: Vec<PathBuf>,
}

impl ImageDocument {
    fn page_path(&self, page: usize) -> Result<&Path, BackendFault> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .map(PathBuf::as_path)
            .ok_or_else(|| BackendFault::generic(format!("page {page} out of range")))
    }
}

impl PageSource for ImageDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn native_size(&self, page: usize) -> Result<PageSize, BackendFault> {
        let path = self.page_path(page)?;
        // Header-only probe, the pixels are not decoded here
        match imagesize::size(path) {
            Ok(size) => Ok(PageSize::new(size.width as f32, size.height as f32)),
            Err(e) => {
                warn!("Failed to read size of {path:?}: {e}");
                Err(BackendFault::generic(format!(
                    "unreadable page image {}: {e}",
                    path.display()
                )))
            }
        }
    }

    fn render(&self, page: usize, scale: f32) -> Result<RgbaImage, BackendFault> {
        let path = self.page_path(page)?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(BackendFault::generic(format!("invalid scale {scale}")));
        }

        let img = image::open(path)?.to_rgba8();
        let (src_width, src_height) = img.dimensions();
        let max_side = MAX_PAGE_DIMENSION as f32;
        let width = (src_width as f32 * scale).round().clamp(1.0, max_side) as u32;
        let height = (src_height as f32 * scale).round().clamp(1.0, max_side) as u32;

        if (width, height) == (src_width, src_height) {
            return Ok(img);
        }
        debug!("Resizing page {page} from {src_width}x{src_height} to {width}x{height}");
        Ok(image::imageops::resize(&img, width, height, FilterType::Triangle))
    }
}
