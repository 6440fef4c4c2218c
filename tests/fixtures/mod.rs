//! Shared test fixtures: scripted OCR engines, canned rasterizers and
//! synthetic word layouts.
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use phi_redactor::error::{RecognitionError, Result};
use phi_redactor::ocr::{OcrEngine, RecognizedWord};
use phi_redactor::pdf::PdfRasterizer;
use phi_redactor::types::BoundingBox;

/// The canonical clinical note used across the suite.
pub const CANONICAL_NOTE: &str = "Patient: John Smith\nDOB: 01/15/1980\nSex: Male\nMRN: 12345678";

pub const CHAR_WIDTH: u32 = 12;
pub const LINE_HEIGHT: u32 = 24;
pub const PAGE_WIDTH_BASE: u32 = 800;
pub const PAGE_HEIGHT: u32 = 1000;

/// Lay `text` out as recognized words on a fixed grid, one text line
/// per page line, every word at the given confidence.
pub fn layout_words(text: &str, confidence: f32) -> Vec<RecognizedWord> {
    let mut words = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        let mut x = 0u32;
        for token in line.split_whitespace() {
            let width = token.len() as u32 * CHAR_WIDTH;
            words.push(RecognizedWord::new(
                token,
                BoundingBox::new(x, line_index as u32 * LINE_HEIGHT, width, LINE_HEIGHT - 8),
                confidence,
                line_index as u32,
            ));
            x += width + CHAR_WIDTH;
        }
    }
    words
}

/// White page whose width encodes the page index, so a scripted OCR
/// engine can tell rasterized pages apart.
pub fn page_image(index: usize) -> RgbImage {
    RgbImage::from_pixel(
        PAGE_WIDTH_BASE + index as u32,
        PAGE_HEIGHT,
        Rgb([255, 255, 255]),
    )
}

/// OCR double scripted per page (keyed by image width). Pages without
/// a script recognize as empty; an optional slow page sleeps past any
/// reasonable timeout.
#[derive(Default)]
pub struct MockOcrEngine {
    scripts: HashMap<u32, Vec<RecognizedWord>>,
    slow_widths: Vec<u32>,
    failing_widths: Vec<u32>,
}

impl MockOcrEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, index: usize, words: Vec<RecognizedWord>) -> Self {
        self.scripts.insert(PAGE_WIDTH_BASE + index as u32, words);
        self
    }

    pub fn with_slow_page(mut self, index: usize) -> Self {
        self.slow_widths.push(PAGE_WIDTH_BASE + index as u32);
        self
    }

    pub fn with_failing_page(mut self, index: usize) -> Self {
        self.failing_widths.push(PAGE_WIDTH_BASE + index as u32);
        self
    }
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    async fn recognize(&self, page: &RgbImage) -> Result<Vec<RecognizedWord>> {
        if self.slow_widths.contains(&page.width()) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing_widths.contains(&page.width()) {
            return Err(RecognitionError::Engine("scripted failure".into()).into());
        }
        Ok(self.scripts.get(&page.width()).cloned().unwrap_or_default())
    }
}

/// Rasterizer double returning index-tagged white pages.
pub struct MockRasterizer {
    pub pages: usize,
}

#[async_trait]
impl PdfRasterizer for MockRasterizer {
    async fn page_count(&self, _pdf: &[u8]) -> Result<usize> {
        Ok(self.pages)
    }

    async fn rasterize(&self, _pdf: &[u8], page_index: usize, _dpi: u32) -> Result<RgbImage> {
        Ok(page_image(page_index))
    }
}
