//! Compiled, ordered PHI pattern library
//!
//! The table is fixed at compile time but validated at construction:
//! a malformed or zero-width pattern is a configuration error and the
//! engine refuses to start. Matchers are evaluated in table order, so
//! specific identifier shapes (SSN, MRN) sit ahead of the looser
//! grammars (dates, phones, names) that could shadow them.

use tracing::debug;

use crate::config::RedactionConfig;
use crate::error::{ConfigurationError, Result};

use super::{
    category::PhiCategory,
    gazetteer::NameGazetteer,
    matcher::{LabelMatcher, LookupMatcher, PatternMatcher, PhiMatcher},
    Match,
};

struct PatternSpec {
    name: &'static str,
    category: PhiCategory,
    confidence: f32,
    label_anchored: bool,
    pattern: &'static str,
}

const fn label(
    name: &'static str,
    category: PhiCategory,
    confidence: f32,
    pattern: &'static str,
) -> PatternSpec {
    PatternSpec {
        name,
        category,
        confidence,
        label_anchored: true,
        pattern,
    }
}

const fn shape(
    name: &'static str,
    category: PhiCategory,
    confidence: f32,
    pattern: &'static str,
) -> PatternSpec {
    PatternSpec {
        name,
        category,
        confidence,
        label_anchored: false,
        pattern,
    }
}

/// Always-on patterns, most specific shapes first.
const CORE_PATTERNS: &[PatternSpec] = &[
    label(
        "SSN_LABEL",
        PhiCategory::Ssn,
        0.99,
        r"\b(?i:SSN|Social\s*Security)[\s:#]*\d{3}[\s\-.]?\d{2}[\s\-.]?\d{4}\b",
    ),
    shape(
        "SSN_BARE",
        PhiCategory::Ssn,
        0.9,
        r"\b\d{3}[\s\-]\d{2}[\s\-]\d{4}\b",
    ),
    shape(
        "EMAIL",
        PhiCategory::Email,
        0.98,
        r"\b[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}\b",
    ),
    shape(
        "URL",
        PhiCategory::Url,
        0.98,
        r#"\bhttps?://[^\s<>"{}|\\^\x60\[\]]+"#,
    ),
    shape(
        "IPV4",
        PhiCategory::IpAddress,
        0.9,
        r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\b",
    ),
    label(
        "DOB_LABEL",
        PhiCategory::DateOfBirth,
        0.98,
        r"\b(?i:DOB|Date\s*of\s*Birth|Birth\s*Date|Birthdate)[\s:]*[\d/.\-]+\b",
    ),
    label(
        "SERVICE_DATE_LABEL",
        PhiCategory::ServiceDate,
        0.95,
        r"\b(?i:Admission|Admit|Discharge|DOS|Date\s*of\s*Service)[\s:]+[\d/.\-]+\b",
    ),
    label(
        "MRN_LABEL",
        PhiCategory::Mrn,
        0.95,
        r"\b(?i:MRN|Medical\s*Record\s*(?:Number|No|#)?|Patient\s*ID|Pt\s*ID|Chart\s*(?:Number|No|#)|Personal\s*Health\s*(?:Number|No|#)?|PHN|Health\s*(?:Card|ID)\s*(?:Number|No|#)?)[\s:#]*[A-Z0-9][A-Z0-9\-]{3,}\b",
    ),
    label(
        "INSURANCE_LABEL",
        PhiCategory::InsuranceId,
        0.95,
        r"\b(?i:Insurance\s*ID|Member\s*ID|Beneficiary\s*(?:ID|Number)|Policy\s*(?:Number|No|#)|Group\s*(?:Number|No|#))[\s:#]*[A-Z0-9][A-Z0-9\-]*\b",
    ),
    label(
        "INSURANCE_CARRIER",
        PhiCategory::InsuranceId,
        0.9,
        r"\b(?i:Primary\s+Carrier|Insurance\s+(?:Company|Provider|Carrier)|Health\s+Plan|Payer)[\s:]+[^\n]+",
    ),
    label(
        "ACCOUNT_LABEL",
        PhiCategory::Account,
        0.95,
        r"\b(?i:Account\s*(?:Number|No|#)|Acct\s*(?:Number|No|#)?)[\s:#]*[A-Z0-9][A-Z0-9\-]*\b",
    ),
    label(
        "LICENSE_LABEL",
        PhiCategory::License,
        0.95,
        r"\b(?i:License\s*(?:Number|No|#)?|NPI|DEA\s*(?:Number|No|#)?)[\s:#]*[A-Z0-9][A-Z0-9\-]*\b",
    ),
    label(
        "FAX_LABEL",
        PhiCategory::Fax,
        0.95,
        r"\b(?i:Fax|Facsimile)[\s:#]*\(?\d[\d\s().\-]*\d\b",
    ),
    label(
        "PHONE_LABEL",
        PhiCategory::Phone,
        0.95,
        r"\b(?i:Phone|Tel|Telephone|Cell|Mobile|Ph)[\s:#]*\(?\d[\d\s().\-]*\d\b",
    ),
    shape(
        "PHONE_NANP",
        PhiCategory::Phone,
        0.9,
        r"\b(?:\+?1[\s\-.]?)?\(?[2-9]\d{2}\)?[\s\-.]?[2-9]\d{2}[\s\-.]?\d{4}\b",
    ),
    shape(
        "DATE_NUMERIC",
        PhiCategory::Date,
        0.95,
        r"\b(?:0?[1-9]|1[0-2])[/\-.](?:0?[1-9]|[12]\d|3[01])[/\-.](?:19|20)\d{2}\b",
    ),
    shape(
        "DATE_ISO",
        PhiCategory::Date,
        0.95,
        r"\b(?:19|20)\d{2}[/\-.](?:0?[1-9]|1[0-2])[/\-.](?:0?[1-9]|[12]\d|3[01])\b",
    ),
    shape(
        "DATE_WRITTEN",
        PhiCategory::Date,
        0.95,
        r"\b(?i:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\.?\s+\d{1,2}(?i:st|nd|rd|th)?,?\s*(?:19|20)\d{2}\b",
    ),
    shape(
        "ADDRESS_STREET",
        PhiCategory::Address,
        0.95,
        r"\b\d{1,5}\s+(?:(?:N|S|E|W|NE|NW|SE|SW|North|South|East|West)\s+)?(?:(?:[A-Z][a-z]+|\d+(?:st|nd|rd|th))\s*)+(?i:Street|St|Avenue|Ave|Boulevard|Blvd|Road|Rd|Drive|Dr|Lane|Ln|Way|Court|Ct|Circle|Cir|Place|Pl|Terrace|Ter|Parkway|Pkwy|Highway|Hwy)\b\.?",
    ),
    label(
        "ADDRESS_LABEL",
        PhiCategory::Address,
        0.95,
        r"\b(?i:Address)[\s:]+[^\n]+",
    ),
    shape(
        "ADDRESS_CITY_STATE_ZIP",
        PhiCategory::Address,
        0.95,
        r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*,?\s*(?:AL|AK|AZ|AR|CA|CO|CT|DE|FL|GA|HI|ID|IL|IN|IA|KS|KY|LA|ME|MD|MA|MI|MN|MS|MO|MT|NE|NV|NH|NJ|NM|NY|NC|ND|OH|OK|OR|PA|RI|SC|SD|TN|TX|UT|VT|VA|WA|WV|WI|WY)\s*,?\s*\d{5}(?:-\d{4})?\b",
    ),
    label(
        "ZIP_LABEL",
        PhiCategory::ZipCode,
        0.9,
        r"\b(?i:ZIP|Zip\s*Code|Postal\s*Code)[\s:#]*\d{5}(?:-\d{4})?\b",
    ),
    label(
        "NAME_TITLE",
        PhiCategory::Name,
        0.95,
        r"\b(?:Dr\.?|Mr\.?|Mrs\.?|Ms\.?|Miss|Prof\.?|Professor)[ \t]+[A-Z][A-Za-z']*\.?(?:[ \t]+[A-Z][A-Za-z']*\.?)*",
    ),
    label(
        "NAME_LABEL",
        PhiCategory::Name,
        0.95,
        r"\b(?:Patient|Provider|Physician|Attending|Referring|From|To|Name)[ \t:]+[A-Z][A-Za-z']*\.?(?:[ \t]+[A-Z][A-Za-z']*\.?)*",
    ),
    label(
        "NAME_ALIAS",
        PhiCategory::Name,
        0.95,
        r"\b(?i:Legal(?:[ \t]+Name)?|Preferred(?:[ \t]+Name)?|Birth[ \t]+Name|AKA|Also[ \t]+Known[ \t]+As|Maiden[ \t]+Name|Former[ \t]+Name)[ \t:]+[A-Z][A-Za-z']*(?:[ \t]+[A-Z][A-Za-z']*)*",
    ),
    label(
        "NAME_ROLE",
        PhiCategory::Name,
        0.95,
        r"\b(?:PCP|Referring[ \t]+Physician|Surgeon|Therapist|Nurse[ \t]+Practitioner|Physician[ \t]+Assistant|PA-C|NP|Guarantor|Emergency[ \t]+Contact|Next[ \t]+of[ \t]+Kin|Guardian|Caregiver|Responsible[ \t]+Party|Admitting[ \t]+(?:Physician|Doctor)|Consulting[ \t]+(?:Physician|Doctor)|Ordering[ \t]+(?:Physician|Provider))[ \t:]+[A-Z][A-Za-z']*\.?(?:[ \t]+[A-Z][A-Za-z']*\.?)*",
    ),
    label(
        "NAME_SIGNED_BY",
        PhiCategory::Name,
        0.95,
        r"\b(?i:(?:signed|authenticated|verified|cosigned|reviewed|approved|dictated|transcribed)[ \t]+by)[ \t:]+[A-Z][A-Za-z']*(?:[ \t]+[A-Z][A-Za-z']*)*",
    ),
    shape(
        "NAME_CREDENTIALED",
        PhiCategory::Name,
        0.9,
        r"\b[A-Z][A-Za-z']*(?:[ \t]+[A-Z][A-Za-z']*)*,?[ \t]+(?:MD|M\.D\.|DO|D\.O\.|DPT|D\.P\.T\.|PT|OT|PA-?C|APRN|NP|RN|BSN|MSN|DNP|PhD|Ph\.D\.|PharmD|OD|DDS|DMD|LCSW|LMFT|LPC|PsyD|FAAOS|FACP|FACS|FACEP)\b",
    ),
    label(
        "GENDER_LABEL",
        PhiCategory::Gender,
        0.9,
        r"\b(?i:Sex|Gender)[ \t:]+(?i:Male|Female|M|F|Non[\- ]?binary|Transgender|Trans|Other)\b",
    ),
    label(
        "PRONOUNS_LABEL",
        PhiCategory::Pronouns,
        0.95,
        r"\b(?i:Pronouns?)[ \t:]+[A-Za-z]+(?:[ \t]*/[ \t]*[A-Za-z]+)*",
    ),
    shape(
        "AGE_90PLUS",
        PhiCategory::Age90Plus,
        0.95,
        r"\b(?i:aged?|years?[ \t]*old)[ \t:]*(?:9\d|1\d{2})\b",
    ),
    shape(
        "AGE_PHRASE",
        PhiCategory::Age,
        0.8,
        r"\b\d{1,3}[ \t\-]?(?i:years?|yr|y/?o)[ \t\-]?(?i:old|of[ \t]*age)?\b",
    ),
    label(
        "OCCUPATION_LABEL",
        PhiCategory::Occupation,
        0.85,
        r"\b(?i:Occupation|Employer|Place[ \t]+of[ \t]+(?:Work|Employment))[ \t:]+[^\n]+",
    ),
    label(
        "ROOM_BED",
        PhiCategory::Location,
        0.8,
        r"\b(?i:Room|Rm|Bed)[ \t:#]*[A-Z]?\d+[A-Z]?\b",
    ),
];

/// Low-confidence shapes compiled only in aggressive mode; their false
/// positive rate is too high for the default profile.
const AGGRESSIVE_PATTERNS: &[PatternSpec] = &[
    shape("ZIP_BARE", PhiCategory::ZipCode, 0.5, r"\b\d{5}(?:-\d{4})?\b"),
    shape("GENDER_BARE", PhiCategory::Gender, 0.5, r"\b(?i:Male|Female)\b"),
    shape(
        "DATE_SHORT_YEAR",
        PhiCategory::Date,
        0.5,
        r"\b(?:0?[1-9]|1[0-2])[/\-.](?:0?[1-9]|[12]\d|3[01])[/\-.]\d{2}\b",
    ),
    shape(
        "CAPITALIZED_PAIR",
        PhiCategory::PossibleName,
        0.5,
        r"\b[A-Z][a-z]{2,}[ \t]+[A-Z][a-z]{2,}\b",
    ),
];

/// Ordered collection of compiled matchers. Compiled once, read-only
/// afterwards; safe to share across documents and threads.
pub struct PatternLibrary {
    matchers: Vec<Box<dyn PhiMatcher>>,
}

impl PatternLibrary {
    /// Compile the full table. Fails fast so a broken library can never
    /// reach the pipeline.
    pub fn compile(config: &RedactionConfig, gazetteer: NameGazetteer) -> Result<Self> {
        if gazetteer.is_empty() {
            return Err(ConfigurationError::EmptyGazetteer.into());
        }

        let mut matchers: Vec<Box<dyn PhiMatcher>> = Vec::new();
        for spec in CORE_PATTERNS {
            matchers.push(Self::build(spec)?);
        }
        if config.aggressive {
            for spec in AGGRESSIVE_PATTERNS {
                matchers.push(Self::build(spec)?);
            }
        }
        matchers.push(Box::new(LookupMatcher::new(gazetteer, config.aggressive)));

        debug!(matchers = matchers.len(), "pattern library compiled");
        Ok(Self { matchers })
    }

    fn build(spec: &PatternSpec) -> Result<Box<dyn PhiMatcher>> {
        Ok(if spec.label_anchored {
            Box::new(LabelMatcher::new(
                spec.name,
                spec.pattern,
                spec.category,
                spec.confidence,
            )?)
        } else {
            Box::new(PatternMatcher::new(
                spec.name,
                spec.pattern,
                spec.category,
                spec.confidence,
            )?)
        })
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Scan the buffer with every matcher and return all raw matches,
    /// overlaps included, sorted by start offset then table order.
    pub fn match_all(&self, text: &str) -> Vec<Match> {
        let mut matches = Vec::new();
        if text.is_empty() {
            return matches;
        }

        for (index, matcher) in self.matchers.iter().enumerate() {
            let mut offset = 0;
            while offset <= text.len() {
                let Some(mut found) = matcher.try_match(text, offset) else {
                    break;
                };
                offset = found.start + 1;
                found.priority = index as u16;
                matches.push(found);
            }
        }

        matches.sort_by(|a, b| a.start.cmp(&b.start).then(a.priority.cmp(&b.priority)));
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> PatternLibrary {
        PatternLibrary::compile(&RedactionConfig::default(), NameGazetteer::new()).unwrap()
    }

    #[test]
    fn full_table_compiles() {
        assert!(library().len() > CORE_PATTERNS.len());
    }

    #[test]
    fn aggressive_table_compiles_and_is_larger() {
        let aggressive = PatternLibrary::compile(
            &RedactionConfig {
                aggressive: true,
                ..Default::default()
            },
            NameGazetteer::new(),
        )
        .unwrap();
        assert_eq!(aggressive.len(), library().len() + AGGRESSIVE_PATTERNS.len());
    }

    #[test]
    fn raw_matches_are_sorted_by_start() {
        let matches = library().match_all("SSN 123-45-6789, call (612) 555-0188");
        assert!(!matches.is_empty());
        assert!(matches.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn specific_shapes_hit_their_categories() {
        let lib = library();
        let text = "MRN: 12345678 reachable at j.doe@clinic.example 10.0.0.12";
        let matches = lib.match_all(text);
        assert!(matches.iter().any(|m| m.category == PhiCategory::Mrn));
        assert!(matches.iter().any(|m| m.category == PhiCategory::Email));
        assert!(matches.iter().any(|m| m.category == PhiCategory::IpAddress));
    }

    #[test]
    fn empty_buffer_yields_no_matches() {
        assert!(library().match_all("").is_empty());
    }
}
