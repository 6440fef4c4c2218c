//! External PDF codec contracts
//!
//! Rasterization needs a real PDF renderer (PDFium, Poppler) and stays
//! a caller-supplied collaborator, mirroring the OCR seam. Assembly is
//! implementable in-crate; `LopdfAssembler` is the stock choice.

use async_trait::async_trait;
use image::RgbImage;

use crate::error::Result;

/// Renders PDF pages to raster images for recognition.
#[async_trait]
pub trait PdfRasterizer: Send + Sync {
    async fn page_count(&self, pdf: &[u8]) -> Result<usize>;

    /// Rasterize one page at the given resolution.
    async fn rasterize(&self, pdf: &[u8], page_index: usize, dpi: u32) -> Result<RgbImage>;
}

/// Re-encodes processed page images into a single output document,
/// preserving page order.
#[async_trait]
pub trait PdfAssembler: Send + Sync {
    async fn assemble(&self, pages: &[RgbImage], dpi: u32) -> Result<Vec<u8>>;
}
