//! PDF backend via MuPDF

use image::RgbaImage;
use mupdf::{Colorspace, Document, Matrix, Pixmap};

use super::backend::{PageSource, RenderBackend};
use super::error::BackendFault;
use super::renderer::MAX_PAGE_DIMENSION;
use super::types::PageSize;

#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBackend for MupdfBackend {
    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn open(&self, locator: &str) -> Result<Box<dyn PageSource>, BackendFault> {
        let doc = Document::open(locator)?;
        let page_count = doc.page_count()?;
        let page_count = usize::try_from(page_count)
            .map_err(|_| BackendFault::generic(format!("invalid page count {page_count}")))?;
        log::debug!("Opened PDF {locator} with {page_count} pages");
        Ok(Box::new(PdfDocument { doc, page_count }))
    }
}

struct PdfDocument {
    doc: Document,
    page_count: usize,
}

impl PdfDocument {
    fn load(&self, page: usize) -> Result<mupdf::Page, BackendFault> {
        if page == 0 || page > self.page_count {
            return Err(BackendFault::generic(format!("page {page} out of range")));
        }
        Ok(self.doc.load_page((page - 1) as i32)?)
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn native_size(&self, page: usize) -> Result<PageSize, BackendFault> {
        let bounds = self.load(page)?.bounds()?;
        Ok(PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
    }

    fn render(&self, page: usize, scale: f32) -> Result<RgbaImage, BackendFault> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(BackendFault::generic(format!("invalid scale {scale}")));
        }
        let page_handle = self.load(page)?;
        let bounds = page_handle.bounds()?;
        let longest = (bounds.x1 - bounds.x0).max(bounds.y1 - bounds.y0) * scale;
        let max_side = MAX_PAGE_DIMENSION as f32;
        let mag = if longest > max_side {
            scale * max_side / longest
        } else {
            scale
        };

        let rgb = Colorspace::device_rgb();
        let pixmap = page_handle.to_pixmap(&Matrix::new_scale(mag, mag), &rgb, false, false)?;
        pixmap_to_rgba(&pixmap)
    }
}

fn pixmap_to_rgba(pixmap: &Pixmap) -> Result<RgbaImage, BackendFault> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(BackendFault::generic(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    let expected_min = stride.saturating_mul(height);
    if samples.len() < expected_min || row_bytes > stride {
        return Err(BackendFault::generic("Pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let row_start = y * stride;
        let row = &samples[row_start..row_start + row_bytes];
        for px in row.chunks_exact(n) {
            out.extend_from_slice(&px[..3]);
            out.push(if n > 3 { px[3] } else { 0xFF });
        }
    }

    RgbaImage::from_raw(pixmap.width(), pixmap.height(), out)
        .ok_or_else(|| BackendFault::generic("Pixmap dimensions overflow"))
}
