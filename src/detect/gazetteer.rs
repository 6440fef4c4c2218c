//! Static name gazetteer and supporting word lists
//!
//! Free-text name detection from patterns alone has unacceptable
//! precision, so bare-token detection is gated on membership in a fixed
//! list of common given and family names. The trade is deliberate:
//! uncommon names are missed, arbitrary capitalized words are not
//! flagged.

use std::collections::HashSet;

use lazy_static::lazy_static;

const FIRST_NAMES: &[&str] = &[
    "james", "john", "robert", "michael", "william", "david", "richard", "joseph", "thomas",
    "charles", "christopher", "daniel", "matthew", "anthony", "mark", "donald", "steven", "paul",
    "andrew", "joshua", "kenneth", "kevin", "brian", "george", "timothy", "ronald", "edward",
    "jason", "jeffrey", "ryan", "jacob", "nicholas", "gary", "eric", "jonathan", "stephen",
    "larry", "justin", "scott", "brandon", "benjamin", "samuel", "raymond", "gregory", "frank",
    "alexander", "patrick", "jack", "dennis", "jerry", "tyler", "aaron", "jose", "adam", "nathan",
    "henry", "peter", "zachary", "douglas", "harold", "mary", "patricia", "jennifer", "linda",
    "elizabeth", "barbara", "susan", "jessica", "sarah", "karen", "nancy", "margaret", "lisa",
    "betty", "dorothy", "sandra", "ashley", "kimberly", "emily", "donna", "michelle", "carol",
    "amanda", "melissa", "deborah", "stephanie", "rebecca", "sharon", "laura", "cynthia",
    "kathleen", "amy", "angela", "shirley", "anna", "brenda", "pamela", "emma", "nicole", "helen",
    "samantha", "katherine", "christine", "debra", "rachel", "carolyn", "janet", "catherine",
    "maria", "heather", "diane", "ruth", "julie", "olivia", "joyce", "virginia", "victoria",
    "kelly", "lauren", "christina", "joan", "evelyn", "judith", "megan", "andrea", "cheryl",
    "hannah", "jacqueline", "martha", "gloria", "teresa", "ann", "sara", "madison", "frances",
    "kathryn", "janice", "jean", "abigail", "alice", "judy",
];

const LAST_NAMES: &[&str] = &[
    "smith", "johnson", "williams", "brown", "jones", "garcia", "miller", "davis", "rodriguez",
    "martinez", "hernandez", "lopez", "gonzalez", "wilson", "anderson", "thomas", "taylor",
    "moore", "jackson", "martin", "lee", "perez", "thompson", "white", "harris", "sanchez",
    "clark", "ramirez", "lewis", "robinson", "walker", "young", "allen", "king", "wright",
    "scott", "torres", "nguyen", "hill", "flores", "green", "adams", "nelson", "baker", "hall",
    "rivera", "campbell", "mitchell", "carter", "roberts", "gomez", "phillips", "evans",
    "turner", "diaz", "parker", "cruz", "edwards", "collins", "reyes", "stewart", "morris",
    "morales", "murphy", "cook", "rogers", "gutierrez", "ortiz", "morgan", "cooper", "peterson",
    "bailey", "reed", "kelly", "howard", "ramos", "kim", "cox", "ward", "richardson", "watson",
    "brooks", "chavez", "wood", "james", "bennett", "gray", "mendoza", "ruiz", "hughes", "price",
    "alvarez", "castillo", "sanders", "patel", "myers", "long", "ross", "foster", "jimenez",
    "powell", "jenkins", "perry", "russell", "sullivan", "bell", "coleman", "butler",
    "henderson", "barnes", "gonzales", "fisher", "vasquez", "simmons", "griffin", "mcdonald",
];

/// Names that double as common English words. Bare hits need nearby
/// name context unless the caller opted into aggressive mode.
const AMBIGUOUS_NAMES: &[&str] = &[
    "may", "grace", "bill", "art", "mark", "frank", "chase", "heath", "hunter", "mason", "reed",
    "wade", "lane", "grant", "cole", "drew", "dale", "glen", "joy", "hope", "faith", "dawn",
    "eve", "iris", "ivy", "lily", "rose", "ruby", "pearl", "summer", "autumn", "april", "august",
    "cruz", "bishop", "chance", "cash", "sterling", "stone", "fox", "wolf", "hawk", "angel",
    "christian", "trinity", "destiny", "harmony", "melody", "charity", "mercy", "patience",
    "serenity", "page", "clay", "ray", "pat", "terry", "robin", "sandy", "sherry", "jean",
    "will", "bob", "don", "gene", "rick",
];

/// Clinical and geographic phrases that pattern-based name grammars
/// keep tripping over.
const NON_NAME_PHRASES: &[&str] = &[
    "internal medicine", "physical therapy", "occupational therapy", "family medicine",
    "emergency medicine", "general surgery", "orthopedic surgery", "plastic surgery",
    "cardiac surgery", "sports medicine", "pain management", "primary care", "urgent care",
    "intensive care", "critical care", "home health", "public health", "mental health",
    "physical examination", "range of motion", "blood pressure", "heart rate",
    "respiratory rate", "chief complaint", "history of present illness", "review of systems",
    "assessment and plan", "differential diagnosis", "follow up", "no show", "vital signs",
    "united states", "new york", "los angeles", "san francisco", "las vegas", "san diego",
    "san antonio", "el paso", "north carolina", "south carolina", "south dakota",
    "north dakota", "west virginia", "new jersey", "new mexico", "new hampshire",
    "rhode island", "referring clinic", "referring provider", "billing details",
    "patient demographics", "clinical context", "medical history", "diagnosis codes",
    "requested procedures", "insurance details", "intake coordinator", "office staff",
];

/// Titles, role labels and credentials that sit next to names but are
/// not themselves name tokens. Used when pooling tokens for
/// propagation.
const LABEL_WORDS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "miss", "prof", "professor", "patient", "provider", "physician",
    "attending", "referring", "from", "to", "legal", "preferred", "birth", "name", "aka", "also",
    "known", "as", "maiden", "former", "pcp", "surgeon", "therapist", "nurse", "practitioner",
    "assistant", "guarantor", "emergency", "contact", "next", "of", "kin", "guardian",
    "caregiver", "responsible", "party", "admitting", "doctor", "consulting", "ordering",
    "primary", "care", "signed", "authenticated", "verified", "cosigned", "reviewed",
    "approved", "dictated", "transcribed", "by", "md", "do", "dc", "dpt", "pt", "ot", "np",
    "rn", "bsn", "msn", "dnp", "phd", "pharmd", "od", "dds", "dmd", "lcsw", "lmft", "lpc",
    "psyd", "aprn", "faaos", "facp", "facs", "facep",
];

/// Labels whose proximity makes an ambiguous token read as a name
const CONTEXT_LABELS: &[&str] = &[
    "patient", "provider", "physician", "attending", "referring", "dr.", "dr ", "mr.", "mr ",
    "mrs.", "mrs ", "ms.", "ms ", "name:", "name ", "signed by", "authenticated by", "pcp",
    "surgeon", "therapist", "nurse", "guarantor", "emergency contact", "next of kin",
    "guardian", "caregiver", "dictated by", "reviewed by", "approved by", "cosigned by",
];

lazy_static! {
    static ref KNOWN_NAMES: HashSet<&'static str> =
        FIRST_NAMES.iter().chain(LAST_NAMES.iter()).copied().collect();
    static ref AMBIGUOUS: HashSet<&'static str> = AMBIGUOUS_NAMES.iter().copied().collect();
    static ref LABELS: HashSet<&'static str> = LABEL_WORDS.iter().copied().collect();
}

/// O(1) case-insensitive membership testing over the static name list.
/// Loaded once, read-only afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameGazetteer;

impl NameGazetteer {
    pub fn new() -> Self {
        Self
    }

    pub fn len(&self) -> usize {
        KNOWN_NAMES.len()
    }

    pub fn is_empty(&self) -> bool {
        KNOWN_NAMES.is_empty()
    }

    /// Unambiguous membership: the token is a known name and nothing else
    pub fn contains(&self, token: &str) -> bool {
        KNOWN_NAMES.contains(token.to_ascii_lowercase().as_str())
    }

    /// Token is a name that doubles as an ordinary English word
    pub fn is_ambiguous(&self, token: &str) -> bool {
        AMBIGUOUS.contains(token.to_ascii_lowercase().as_str())
    }

    /// Token is a title, role label or credential, not a person token
    pub fn is_label_word(&self, token: &str) -> bool {
        LABELS.contains(token.to_ascii_lowercase().as_str())
    }

    /// Matched text is a known clinical or geographic phrase, veto it
    pub fn is_non_name_phrase(&self, matched: &str) -> bool {
        let lower = matched.to_ascii_lowercase();
        NON_NAME_PHRASES.iter().any(|phrase| lower.contains(phrase))
    }

    /// A clinical name label appears within 80 bytes of `position`
    pub fn has_name_context(&self, text: &str, position: usize) -> bool {
        let start = position.saturating_sub(80);
        let end = (position + 80).min(text.len());
        // Byte window may split a UTF-8 char; widen to boundaries.
        let start = floor_char_boundary(text, start);
        let end = ceil_char_boundary(text, end);
        let window = text[start..end].to_ascii_lowercase();
        CONTEXT_LABELS.iter().any(|label| window.contains(label))
    }
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_case_insensitive() {
        let gazetteer = NameGazetteer::new();
        assert!(gazetteer.contains("Smith"));
        assert!(gazetteer.contains("JOHN"));
        assert!(!gazetteer.contains("Zyzzyva"));
    }

    #[test]
    fn ambiguous_names_are_separate_from_core_set() {
        let gazetteer = NameGazetteer::new();
        assert!(gazetteer.is_ambiguous("Hunter"));
        assert!(!gazetteer.contains("Hunter"));
    }

    #[test]
    fn clinical_phrases_are_vetoed() {
        let gazetteer = NameGazetteer::new();
        assert!(gazetteer.is_non_name_phrase("Internal Medicine"));
        assert!(gazetteer.is_non_name_phrase("referred to Physical Therapy today"));
        assert!(!gazetteer.is_non_name_phrase("John Smith"));
    }

    #[test]
    fn context_window_finds_nearby_labels() {
        let gazetteer = NameGazetteer::new();
        let text = "Patient: Hunter presented with knee pain.";
        assert!(gazetteer.has_name_context(text, 9));
        let bare = "The hunter gatherer diet was discussed.";
        assert!(!gazetteer.has_name_context(bare, 4));
    }
}
