//! External OCR collaborator contract
//!
//! The engine does not implement recognition itself; callers inject an
//! implementation (Tesseract wrapper, cloud service, test double) and
//! the pipeline consumes it through this trait object.

use async_trait::async_trait;
use image::RgbImage;

use crate::error::Result;
use crate::types::BoundingBox;

/// One token as recognized on a raster page
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedWord {
    pub text: String,
    pub bbox: BoundingBox,
    /// Recognition confidence, 0..1
    pub confidence: f32,
    /// Reading-order line the word sits on
    pub line: u32,
}

impl RecognizedWord {
    pub fn new(text: impl Into<String>, bbox: BoundingBox, confidence: f32, line: u32) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence,
            line,
        }
    }
}

/// Recognition capability consumed by the pipeline.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize a rasterized page into words with pixel geometry, in
    /// reading order.
    async fn recognize(&self, page: &RgbImage) -> Result<Vec<RecognizedWord>>;
}
