//! Text detector: raw pattern matches in, conflict-free match sequence out

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument};

use crate::config::RedactionConfig;
use crate::error::Result;

use super::{
    category::PhiCategory, gazetteer::NameGazetteer, library::PatternLibrary, Match,
};

lazy_static! {
    static ref NAME_TOKEN_RE: Regex = Regex::new(r"[A-Z][A-Za-z']+").unwrap();
}

/// Priority slot assigned to propagated name matches; they rank behind
/// every table matcher when raw matches are ordered.
const PROPAGATED_PRIORITY: u16 = u16::MAX;

/// Turns a text buffer into a non-overlapping, offset-sorted sequence
/// of matches ready for rendering.
pub struct TextDetector {
    library: PatternLibrary,
    gazetteer: NameGazetteer,
    confidence_floor: f32,
}

impl TextDetector {
    pub fn new(config: &RedactionConfig) -> Result<Self> {
        let gazetteer = NameGazetteer::new();
        Ok(Self {
            library: PatternLibrary::compile(config, gazetteer)?,
            gazetteer,
            confidence_floor: config.confidence_floor(),
        })
    }

    /// Detect PHI in `text`. Empty input is an empty result, not an error.
    pub fn detect(&self, text: &str) -> Vec<Match> {
        self.detect_with_known_names(text, &HashSet::new())
    }

    /// Detect PHI, additionally redacting `known_names` tokens found
    /// bare in the buffer. The PDF pipeline feeds names discovered on
    /// other pages through here so a patient labeled on page one is
    /// still caught unlabeled on page three.
    #[instrument(skip(self, text, known_names), fields(len = text.len()))]
    pub fn detect_with_known_names(
        &self,
        text: &str,
        known_names: &HashSet<String>,
    ) -> Vec<Match> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut raw = self.library.match_all(text);
        raw.retain(|m| self.keep(m));

        let mut pool = self.name_tokens_of(&raw);
        pool.extend(known_names.iter().cloned());
        self.propagate_names(text, &pool, &mut raw);

        raw.sort_by(|a, b| a.start.cmp(&b.start).then(a.priority.cmp(&b.priority)));
        let reconciled = reconcile(raw);
        debug!(matches = reconciled.len(), "detection complete");
        reconciled
    }

    /// Name tokens worth carrying to other pages of the same document.
    pub fn extract_name_tokens(&self, matches: &[Match]) -> HashSet<String> {
        self.name_tokens_of(matches)
    }

    fn keep(&self, m: &Match) -> bool {
        if m.confidence < self.confidence_floor {
            return false;
        }
        if matches!(m.category, PhiCategory::Name | PhiCategory::PossibleName)
            && self.gazetteer.is_non_name_phrase(&m.text)
        {
            return false;
        }
        true
    }

    fn name_tokens_of(&self, matches: &[Match]) -> HashSet<String> {
        let mut tokens = HashSet::new();
        for m in matches {
            if m.category != PhiCategory::Name {
                continue;
            }
            for token in NAME_TOKEN_RE.find_iter(&m.text) {
                let token = token.as_str();
                if token.len() >= 2 && !self.gazetteer.is_label_word(token) {
                    tokens.insert(token.to_string());
                }
            }
        }
        tokens
    }

    /// Names discovered behind a label are also redacted where they
    /// appear bare ("KJ is approximately...").
    fn propagate_names(&self, text: &str, tokens: &HashSet<String>, raw: &mut Vec<Match>) {
        for token in tokens {
            let pattern = format!(r"\b{}\b", regex::escape(token));
            let Ok(re) = Regex::new(&pattern) else {
                continue;
            };
            for hit in re.find_iter(text) {
                raw.push(Match {
                    category: PhiCategory::Name,
                    start: hit.start(),
                    end: hit.end(),
                    text: hit.as_str().to_string(),
                    confidence: 0.85,
                    priority: PROPAGATED_PRIORITY,
                });
            }
        }
    }
}

/// Resolve overlapping candidates into a single non-overlapping set.
/// Walking left to right: a match starting before the previous kept
/// match's end loses to higher category priority, then to the longer
/// span. The surviving span is always one of the originals.
fn reconcile(sorted: Vec<Match>) -> Vec<Match> {
    let mut kept: Vec<Match> = Vec::with_capacity(sorted.len());
    for m in sorted {
        match kept.last() {
            Some(prev) if m.start < prev.end => {
                let replace = m.category.priority() < prev.category.priority()
                    || (m.category.priority() == prev.category.priority()
                        && m.len() > prev.len());
                if replace {
                    kept.pop();
                    kept.push(m);
                }
            }
            _ => kept.push(m),
        }
    }

    // Invariant: offsets monotonically increasing and non-overlapping.
    debug_assert!(kept.windows(2).all(|w| w[0].end <= w[1].start));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> TextDetector {
        TextDetector::new(&RedactionConfig::default()).unwrap()
    }

    #[test]
    fn empty_buffer_is_empty_result() {
        assert!(detector().detect("").is_empty());
    }

    #[test]
    fn output_is_sorted_and_non_overlapping() {
        let text = "Patient: John Smith, DOB: 01/15/1980, SSN 123-45-6789, lives at \
                    123 Main Street, Springfield, IL 62704. Contact: j.smith@mail.example";
        let matches = detector().detect(text);
        assert!(!matches.is_empty());
        for pair in matches.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn overlap_keeps_one_original_span() {
        let a = Match {
            category: PhiCategory::Date,
            start: 0,
            end: 10,
            text: "x".repeat(10),
            confidence: 0.9,
            priority: 5,
        };
        let b = Match {
            category: PhiCategory::Mrn,
            start: 5,
            end: 15,
            text: "x".repeat(10),
            confidence: 0.9,
            priority: 7,
        };
        let kept = reconcile(vec![a.clone(), b.clone()]);
        assert_eq!(kept.len(), 1);
        // MRN outranks DATE; the surviving span is b's, not a blend.
        assert_eq!((kept[0].start, kept[0].end), (b.start, b.end));
    }

    #[test]
    fn equal_priority_overlap_keeps_longer_span() {
        let short = Match {
            category: PhiCategory::Name,
            start: 9,
            end: 13,
            text: "John".into(),
            confidence: 0.8,
            priority: 9,
        };
        let long = Match {
            category: PhiCategory::Name,
            start: 0,
            end: 19,
            text: "Patient: John Smith".into(),
            confidence: 0.95,
            priority: 1,
        };
        let kept = reconcile(vec![long.clone(), short]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].len(), long.len());
    }

    #[test]
    fn labeled_names_propagate_to_bare_mentions() {
        let text = "Patient: Kramer Zebulon\nZebulon tolerated the procedure well.";
        let matches = detector().detect(text);
        let bare = matches
            .iter()
            .find(|m| m.start > text.find('\n').unwrap())
            .expect("bare mention redacted");
        assert_eq!(bare.category, PhiCategory::Name);
        assert_eq!(bare.text, "Zebulon");
    }

    #[test]
    fn known_names_from_other_pages_are_redacted() {
        let mut known = HashSet::new();
        known.insert("Burmaster".to_string());
        let matches = detector()
            .detect_with_known_names("Burmaster presented for follow-up.", &known);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].category, PhiCategory::Name);
    }

    #[test]
    fn clinical_phrases_are_not_names() {
        let matches = detector().detect("Referred to Internal Medicine for evaluation.");
        assert!(matches
            .iter()
            .all(|m| !matches!(m.category, PhiCategory::Name | PhiCategory::PossibleName)));
    }
}
