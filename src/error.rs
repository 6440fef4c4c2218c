//! Error types and handling for the PHI redaction engine

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for redaction operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for redaction operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Processing cancelled before completion")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// -------------------- Sub-Error Categories --------------------

/// Fatal construction-time errors. The engine must not start with a
/// broken pattern library or a half-wired pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[error("Invalid pattern for {category}: {source}")]
    InvalidPattern {
        category: &'static str,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("Pattern for {0} can match a zero-length span")]
    ZeroWidthPattern(&'static str),

    #[error("Name gazetteer is empty")]
    EmptyGazetteer,

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("No OCR engine wired; image and PDF inputs need one")]
    MissingOcrEngine,

    #[error("No PDF rasterizer wired; PDF inputs need one")]
    MissingRasterizer,

    #[error("No PDF assembler wired; PDF inputs need one")]
    MissingAssembler,
}

/// Per-page recognition failures. Recoverable: the affected page is kept
/// unredacted and flagged in the manifest, never silently dropped.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RecognitionError {
    #[error("Page {page}: mean OCR confidence {confidence:.2} below threshold {threshold:.2}")]
    LowConfidence {
        page: usize,
        confidence: f32,
        threshold: f32,
    },

    #[error("Page {page}: recognition timed out after {timeout_ms}ms")]
    Timeout { page: usize, timeout_ms: u64 },

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("PDF codec failed: {0}")]
    Codec(String),
}

/// Output artifact generation failures.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RenderError {
    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Image encode failed: {0}")]
    Encode(String),

    #[error("PDF assembly failed: {0}")]
    Assembly(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Render(RenderError::Decode(err.to_string()))
    }
}
