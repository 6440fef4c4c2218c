//! Typed matcher variants behind one polymorphic interface
//!
//! Three closed variants cover every detection style the engine uses:
//! compiled pattern, label-anchored pattern, and gazetteer lookup. New
//! categories are added by registering a matcher, never by editing a
//! monolithic classifier function.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ConfigurationError, Result};

use super::{category::PhiCategory, gazetteer::NameGazetteer, Match};

/// One detection strategy. `try_match` returns the first match starting
/// at or after `offset`, letting the library drain a buffer matcher by
/// matcher without rescanning from the top.
pub trait PhiMatcher: Send + Sync {
    fn name(&self) -> &'static str;
    fn category(&self) -> PhiCategory;
    fn try_match(&self, text: &str, offset: usize) -> Option<Match>;
}

/// Compile a pattern, failing fast on syntax errors and on patterns
/// that can match a zero-length span (those would loop the scanner).
fn compile(name: &'static str, pattern: &str) -> Result<Regex> {
    let regex = Regex::new(pattern).map_err(|e| ConfigurationError::InvalidPattern {
        category: name,
        source: Box::new(e),
    })?;
    if regex.find("").is_some() {
        return Err(ConfigurationError::ZeroWidthPattern(name).into());
    }
    Ok(regex)
}

/// Plain compiled pattern: the shape of the text alone identifies the
/// category (SSN grouping, email syntax, NANP phone).
#[derive(Debug)]
pub struct PatternMatcher {
    name: &'static str,
    regex: Regex,
    category: PhiCategory,
    confidence: f32,
}

impl PatternMatcher {
    pub fn new(
        name: &'static str,
        pattern: &str,
        category: PhiCategory,
        confidence: f32,
    ) -> Result<Self> {
        Ok(Self {
            name,
            regex: compile(name, pattern)?,
            category,
            confidence,
        })
    }
}

impl PhiMatcher for PatternMatcher {
    fn name(&self) -> &'static str {
        self.name
    }

    fn category(&self) -> PhiCategory {
        self.category
    }

    fn try_match(&self, text: &str, offset: usize) -> Option<Match> {
        let found = self.regex.find_at(text, offset)?;
        Some(Match {
            category: self.category,
            start: found.start(),
            end: found.end(),
            text: found.as_str().to_string(),
            confidence: self.confidence,
            priority: 0,
        })
    }
}

/// Label-anchored pattern: a clinical label ("MRN:", "DOB:",
/// "Patient:") anchors a value that would be ambiguous bare. The whole
/// span, label included, is redacted.
pub struct LabelMatcher {
    inner: PatternMatcher,
}

impl LabelMatcher {
    pub fn new(
        name: &'static str,
        pattern: &str,
        category: PhiCategory,
        confidence: f32,
    ) -> Result<Self> {
        Ok(Self {
            inner: PatternMatcher::new(name, pattern, category, confidence)?,
        })
    }
}

impl PhiMatcher for LabelMatcher {
    fn name(&self) -> &'static str {
        self.inner.name
    }

    fn category(&self) -> PhiCategory {
        self.inner.category
    }

    fn try_match(&self, text: &str, offset: usize) -> Option<Match> {
        self.inner.try_match(text, offset)
    }
}

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"\b[A-Z][a-z]+\b").unwrap();
}

/// Gazetteer lookup over capitalized tokens. Adjacent First-Last
/// bigrams read as NAME; lone tokens read as POSSIBLE_NAME, and
/// ambiguous word-names need a clinical label nearby unless the
/// library was compiled in aggressive mode.
pub struct LookupMatcher {
    gazetteer: NameGazetteer,
    aggressive: bool,
}

impl LookupMatcher {
    pub fn new(gazetteer: NameGazetteer, aggressive: bool) -> Self {
        Self {
            gazetteer,
            aggressive,
        }
    }

    fn token_is_name(&self, text: &str, token: &str, position: usize) -> Option<f32> {
        if self.gazetteer.contains(token) {
            return Some(if self.aggressive { 0.6 } else { 0.7 });
        }
        if self.gazetteer.is_ambiguous(token) {
            if self.aggressive {
                return Some(0.6);
            }
            if self.gazetteer.has_name_context(text, position) {
                return Some(0.7);
            }
        }
        None
    }

    /// "First Last" where both tokens are gazetteer members
    fn bigram_at(&self, text: &str, first: &regex::Match<'_>) -> Option<Match> {
        if !self.gazetteer.contains(first.as_str()) {
            return None;
        }
        if text.as_bytes().get(first.end()) != Some(&b' ') {
            return None;
        }
        let second = TOKEN_RE.find_at(text, first.end() + 1)?;
        if second.start() != first.end() + 1 || !self.gazetteer.contains(second.as_str()) {
            return None;
        }
        Some(Match {
            category: PhiCategory::Name,
            start: first.start(),
            end: second.end(),
            text: text[first.start()..second.end()].to_string(),
            confidence: 0.8,
            priority: 0,
        })
    }

    fn single_at(&self, text: &str, token: &regex::Match<'_>) -> Option<Match> {
        let confidence = self.token_is_name(text, token.as_str(), token.start())?;
        Some(Match {
            category: PhiCategory::PossibleName,
            start: token.start(),
            end: token.end(),
            text: token.as_str().to_string(),
            confidence,
            priority: 0,
        })
    }
}

impl PhiMatcher for LookupMatcher {
    fn name(&self) -> &'static str {
        "NAME_GAZETTEER"
    }

    fn category(&self) -> PhiCategory {
        PhiCategory::Name
    }

    fn try_match(&self, text: &str, offset: usize) -> Option<Match> {
        let mut search = offset;
        while search <= text.len() {
            let token = TOKEN_RE.find_at(text, search)?;
            if let Some(m) = self.bigram_at(text, &token) {
                return Some(m);
            }
            if let Some(m) = self.single_at(text, &token) {
                return Some(m);
            }
            search = token.end();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_patterns_are_rejected_at_compile_time() {
        let err = PatternMatcher::new("BAD", r"(?:x)*", PhiCategory::Date, 0.9).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Configuration(ConfigurationError::ZeroWidthPattern("BAD"))
        ));
    }

    #[test]
    fn malformed_patterns_are_rejected_at_compile_time() {
        let err = PatternMatcher::new("BAD", r"(unclosed", PhiCategory::Date, 0.9).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Configuration(ConfigurationError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn pattern_matcher_walks_forward_from_offset() {
        let matcher =
            PatternMatcher::new("SSN_BARE", r"\b\d{3}-\d{2}-\d{4}\b", PhiCategory::Ssn, 0.9)
                .unwrap();
        let text = "ssn 123-45-6789 and 987-65-4321";
        let first = matcher.try_match(text, 0).unwrap();
        assert_eq!(&text[first.start..first.end], "123-45-6789");
        let second = matcher.try_match(text, first.start + 1).unwrap();
        assert_eq!(&text[second.start..second.end], "987-65-4321");
        assert!(matcher.try_match(text, second.start + 1).is_none());
    }

    #[test]
    fn lookup_matcher_prefers_bigrams() {
        let matcher = LookupMatcher::new(NameGazetteer::new(), false);
        let m = matcher.try_match("seen by John Smith today", 0).unwrap();
        assert_eq!(m.category, PhiCategory::Name);
        assert_eq!(m.text, "John Smith");
    }

    #[test]
    fn ambiguous_token_needs_context() {
        let matcher = LookupMatcher::new(NameGazetteer::new(), false);
        assert!(matcher.try_match("The Hunter gatherer diet", 0).is_none());
        let m = matcher
            .try_match("Patient: Hunter reports pain", 0)
            .unwrap();
        assert_eq!(m.text, "Hunter");
        assert_eq!(m.category, PhiCategory::PossibleName);
    }
}
