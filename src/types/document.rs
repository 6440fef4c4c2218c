//! Document, manifest and outcome types

use std::path::Path;

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detect::PhiCategory;
use crate::error::{Error, Result};

/// Input document flavor, decided from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Text,
    Image,
    Pdf,
}

impl DocumentKind {
    /// Map a path's extension onto a supported kind.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "txt" | "text" => Ok(DocumentKind::Text),
            "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" | "gif" => Ok(DocumentKind::Image),
            "pdf" => Ok(DocumentKind::Pdf),
            other => Err(Error::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// An input document: id, kind and raw bytes. Consumed exactly once by
/// the pipeline; the engine never mutates it in place.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            bytes,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let kind = DocumentKind::from_path(path)?;
        let bytes = std::fs::read(path)?;
        Ok(Self::new(kind, bytes))
    }
}

/// Per-page disposition recorded in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageStatus {
    /// PHI was found and obscured
    Redacted,
    /// The page was read successfully and held no detectable PHI
    NoPhiFound,
    /// Recognition was unusable; the page is passed through unredacted
    RecognitionFailed,
}

/// One manifest row per page, in page order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub page_index: usize,
    pub status: PageStatus,
    /// Categories redacted on this page, deduplicated, in priority order
    pub categories: Vec<PhiCategory>,
    pub redaction_count: usize,
}

/// Status report accompanying every redacted artifact. A page that
/// failed recognition is flagged here rather than silently passed off
/// as a success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub document_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(document_id: Uuid) -> Self {
        Self {
            document_id,
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    pub fn total_redactions(&self) -> usize {
        self.entries.iter().map(|e| e.redaction_count).sum()
    }

    pub fn failed_pages(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|e| e.status == PageStatus::RecognitionFailed)
            .map(|e| e.page_index)
            .collect()
    }
}

/// The redacted artifact, same flavor as the input
#[derive(Debug, Clone)]
pub enum RedactedArtifact {
    Text(String),
    Image(RgbImage),
    Pdf(Vec<u8>),
}

impl RedactedArtifact {
    /// Persist the artifact next to wherever the caller wants it.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        match self {
            RedactedArtifact::Text(text) => std::fs::write(path, text)?,
            RedactedArtifact::Image(img) => img.save(path)?,
            RedactedArtifact::Pdf(bytes) => std::fs::write(path, bytes)?,
        }
        Ok(())
    }
}

/// Everything a pipeline invocation hands back to the caller
#[derive(Debug, Clone)]
pub struct RedactionOutcome {
    pub artifact: RedactedArtifact,
    pub manifest: Manifest,
    /// Placeholder-substituted text of the document; multi-page input
    /// joins page texts under `--- Page N ---` banners. For image and
    /// PDF inputs this is the reconstructed OCR buffer after redaction.
    pub redacted_text: String,
}
