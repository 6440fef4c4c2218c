//! Maps recognized words to a text buffer and matches back to pixels
//!
//! Recognition yields discrete word boxes; detection wants one text
//! buffer with stable offsets. The locator owns both directions of
//! that mapping, which is the easiest place in the engine to get
//! subtly wrong at line and word boundaries, so it lives in its own
//! unit with its own synthetic-fixture tests.

use tracing::{debug, warn};

use crate::detect::Match;
use crate::types::{BoundingBox, RedactionRegion, WordBox};

use super::engine::RecognizedWord;

/// A page's reconstructed text plus the word geometry behind it.
/// `text` is the words joined with single spaces within a line and a
/// newline between lines; every `WordBox` records its byte span in it.
#[derive(Debug, Clone, Default)]
pub struct LocatedPage {
    pub text: String,
    pub words: Vec<WordBox>,
}

impl LocatedPage {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Pure coordinate-mapping layer between the OCR collaborator and the
/// renderer.
#[derive(Debug, Clone, Copy)]
pub struct ImageTextLocator {
    min_page_confidence: f32,
}

impl ImageTextLocator {
    pub fn new(min_page_confidence: f32) -> Self {
        Self {
            min_page_confidence,
        }
    }

    /// Build the page buffer and word boxes from raw recognition
    /// output. A page whose mean confidence is below the usable
    /// threshold comes back empty; the caller must flag it as a
    /// recognition failure rather than report a clean pass.
    pub fn locate(&self, recognized: &[RecognizedWord]) -> LocatedPage {
        let mut usable: Vec<&RecognizedWord> = recognized
            .iter()
            .filter(|w| !w.text.trim().is_empty() && w.confidence >= 0.0)
            .collect();

        if usable.is_empty() {
            warn!("recognition produced no usable words");
            return LocatedPage::default();
        }

        let mean = usable.iter().map(|w| w.confidence).sum::<f32>() / usable.len() as f32;
        if mean < self.min_page_confidence {
            warn!(
                mean_confidence = mean,
                threshold = self.min_page_confidence,
                "page below usable recognition confidence"
            );
            return LocatedPage::default();
        }

        usable.sort_by(|a, b| a.line.cmp(&b.line).then(a.bbox.x.cmp(&b.bbox.x)));

        let mut text = String::new();
        let mut words = Vec::with_capacity(usable.len());
        let mut previous_line: Option<u32> = None;

        for word in usable {
            match previous_line {
                Some(line) if line != word.line => text.push('\n'),
                Some(_) => text.push(' '),
                None => {}
            }
            let token = word.text.trim();
            let char_start = text.len();
            text.push_str(token);
            words.push(WordBox {
                text: token.to_string(),
                bbox: word.bbox,
                line: word.line,
                char_start,
                char_end: text.len(),
            });
            previous_line = Some(word.line);
        }

        debug!(words = words.len(), chars = text.len(), "page located");
        LocatedPage { text, words }
    }

    /// Project matches onto pixel regions. Intersecting word boxes are
    /// unioned per line, so a match wrapping across lines produces one
    /// region per line instead of a block that would swallow unrelated
    /// text between them. Regions are padded and clipped to the page.
    pub fn resolve(
        &self,
        matches: &[Match],
        words: &[WordBox],
        page_width: u32,
        page_height: u32,
        padding: u32,
    ) -> Vec<RedactionRegion> {
        let mut regions = Vec::new();

        for m in matches {
            let mut current: Option<(u32, BoundingBox)> = None;
            for word in words.iter().filter(|w| w.overlaps_span(m.start, m.end)) {
                current = Some(match current {
                    Some((line, along)) if line == word.line => (line, along.union(&word.bbox)),
                    Some((_, along)) => {
                        regions.push(RedactionRegion {
                            bbox: along.padded_and_clamped(padding, page_width, page_height),
                            category: m.category,
                        });
                        (word.line, word.bbox)
                    }
                    None => (word.line, word.bbox),
                });
            }
            if let Some((_, along)) = current {
                regions.push(RedactionRegion {
                    bbox: along.padded_and_clamped(padding, page_width, page_height),
                    category: m.category,
                });
            }
        }

        regions.retain(|r| !r.bbox.is_empty());
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::PhiCategory;

    fn word(text: &str, x: u32, line: u32, confidence: f32) -> RecognizedWord {
        RecognizedWord::new(text, BoundingBox::new(x, line * 20, 40, 12), confidence, line)
    }

    #[test]
    fn reconstruction_offsets_line_up_with_tokens() {
        let locator = ImageTextLocator::new(0.35);
        let page = locator.locate(&[
            word("Patient:", 0, 0, 0.9),
            word("John", 50, 0, 0.9),
            word("Smith", 100, 0, 0.9),
            word("MRN:", 0, 1, 0.9),
            word("12345678", 50, 1, 0.9),
        ]);
        assert_eq!(page.text, "Patient: John Smith\nMRN: 12345678");
        for w in &page.words {
            assert_eq!(&page.text[w.char_start..w.char_end], w.text);
        }
    }

    #[test]
    fn low_confidence_page_locates_empty() {
        let locator = ImageTextLocator::new(0.35);
        let page = locator.locate(&[word("blurry", 0, 0, 0.1), word("scan", 50, 0, 0.2)]);
        assert!(page.is_empty());
        assert!(page.text.is_empty());
    }

    #[test]
    fn garbage_words_are_dropped_before_scoring() {
        let locator = ImageTextLocator::new(0.35);
        let page = locator.locate(&[
            word("   ", 0, 0, 0.9),
            word("legible", 40, 0, 0.9),
        ]);
        assert_eq!(page.text, "legible");
        assert_eq!(page.words.len(), 1);
    }

    #[test]
    fn match_spanning_lines_yields_one_region_per_line() {
        let locator = ImageTextLocator::new(0.35);
        let page = locator.locate(&[
            word("John", 200, 0, 0.9),
            word("Smith", 0, 1, 0.9),
        ]);
        assert_eq!(page.text, "John\nSmith");
        let m = Match {
            category: PhiCategory::Name,
            start: 0,
            end: page.text.len(),
            text: page.text.clone(),
            confidence: 0.9,
            priority: 0,
        };
        let regions = locator.resolve(&[m], &page.words, 400, 100, 0);
        assert_eq!(regions.len(), 2);
        // No region bridges the horizontal gap between the two lines.
        assert!(regions.iter().all(|r| r.bbox.width <= 40));
    }

    #[test]
    fn regions_stay_inside_the_page() {
        let locator = ImageTextLocator::new(0.35);
        let page = locator.locate(&[word("edge", 380, 0, 0.9)]);
        let m = Match {
            category: PhiCategory::Name,
            start: 0,
            end: 4,
            text: "edge".into(),
            confidence: 0.9,
            priority: 0,
        };
        let regions = locator.resolve(&[m], &page.words, 400, 50, 8);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].bbox.contained_in(400, 50));
    }

    #[test]
    fn resolve_with_no_words_emits_no_regions() {
        let locator = ImageTextLocator::new(0.35);
        let m = Match {
            category: PhiCategory::Mrn,
            start: 0,
            end: 8,
            text: "12345678".into(),
            confidence: 0.9,
            priority: 0,
        };
        assert!(locator.resolve(&[m], &[], 400, 50, 2).is_empty());
    }
}
