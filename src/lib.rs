//! PHI Redaction Engine
//! Locates Protected Health Information in clinical documents (plain
//! text, scanned images and PDFs) and produces redacted output that
//! preserves layout while destroying the sensitive content.

// Configuration and Core Pipeline
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Stage 1: Pattern Library, Gazetteer & Text Detection
pub mod detect;

// Stage 2: Optical Recognition & Coordinate Mapping
pub mod ocr;

// Stage 3: Redaction Rendering
pub mod render;

// Stage 4: PDF Codec Collaborators
pub mod pdf;

// Shared Utilities
pub mod utils;

// Re-exports for crate consumers
pub use config::RedactionConfig;
pub use detect::{Match, NameGazetteer, PatternLibrary, PhiCategory, TextDetector};
pub use error::{ConfigurationError, Error, RecognitionError, RenderError, Result};
pub use ocr::{ImageTextLocator, LocatedPage, OcrEngine, RecognizedWord};
pub use pdf::{LopdfAssembler, PdfAssembler, PdfRasterizer};
pub use pipeline::{CancelFlag, RedactionPipeline};
pub use render::ImageRenderer;
pub use types::{
    BoundingBox, Document, DocumentKind, Manifest, ManifestEntry, PageStatus, RedactedArtifact,
    RedactionOutcome, RedactionRegion, WordBox,
};
pub use utils::{Metrics, init_logging};
