//! Configuration types and validation for the redaction pipeline

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Global pipeline execution config. Immutable once handed to the
/// pipeline; independent documents can share one by cloning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Opaque RGB fill painted over image regions
    pub fill_color: [u8; 3],
    /// Pixels of padding added around each redaction box
    pub box_padding: u32,
    /// Rasterization resolution for PDF pages
    pub dpi: u32,
    /// Minimum confidence a match must carry to be redacted (0..1)
    pub min_match_confidence: f32,
    /// Mean word confidence below which a page counts as unrecognizable (0..1)
    pub min_page_confidence: f32,
    /// Redact more liberally: extra patterns, lower confidence floor
    pub aggressive: bool,
    /// Carry name tokens discovered on one page to every other page
    pub propagate_names: bool,
    /// Per-page budget for rasterization plus recognition
    #[serde(skip)]
    pub page_timeout: Option<Duration>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            fill_color: [0, 0, 0],
            box_padding: 2,
            dpi: 300,
            min_match_confidence: 0.7,
            min_page_confidence: 0.35,
            aggressive: false,
            propagate_names: true,
            page_timeout: None,
        }
    }
}

impl RedactionConfig {
    /// Confidence floor actually applied, accounting for aggressive mode
    pub fn confidence_floor(&self) -> f32 {
        if self.aggressive {
            0.5
        } else {
            self.min_match_confidence
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi < 72 || self.dpi > 1200 {
            return Err(ConfigurationError::InvalidValue(format!(
                "dpi {} outside 72..=1200",
                self.dpi
            ))
            .into());
        }
        if !(0.0..=1.0).contains(&self.min_match_confidence) {
            return Err(ConfigurationError::InvalidValue(
                "min_match_confidence outside 0..=1".into(),
            )
            .into());
        }
        if !(0.0..=1.0).contains(&self.min_page_confidence) {
            return Err(ConfigurationError::InvalidValue(
                "min_page_confidence outside 0..=1".into(),
            )
            .into());
        }
        if self.box_padding > 64 {
            return Err(ConfigurationError::InvalidValue(
                "box_padding larger than 64px".into(),
            )
            .into());
        }
        Ok(())
    }
}
