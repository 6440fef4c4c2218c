//! Placeholder substitution over a text buffer

use crate::detect::Match;

/// Replace each match span with its category placeholder. Spans are
/// processed in descending start order so earlier offsets stay valid
/// while later replacements change the buffer length. An empty match
/// list returns the input unchanged.
pub fn redact(text: &str, matches: &[Match]) -> String {
    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = text.to_string();
    for m in ordered {
        if m.end > result.len() || m.start > m.end {
            continue;
        }
        result.replace_range(m.start..m.end, &m.category.placeholder());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::PhiCategory;

    fn m(category: PhiCategory, start: usize, end: usize, text: &str) -> Match {
        Match {
            category,
            start,
            end,
            text: text.into(),
            confidence: 0.9,
            priority: 0,
        }
    }

    #[test]
    fn empty_match_list_is_a_no_op() {
        assert_eq!(redact("no phi here", &[]), "no phi here");
    }

    #[test]
    fn later_replacements_do_not_shift_earlier_spans() {
        let text = "MRN: 12345678 seen 01/15/1980";
        let matches = vec![
            m(PhiCategory::Mrn, 0, 13, "MRN: 12345678"),
            m(PhiCategory::Date, 19, 29, "01/15/1980"),
        ];
        assert_eq!(redact(text, &matches), "[MRN] seen [DATE]");
    }

    #[test]
    fn placeholders_round_trip_their_categories() {
        let text = "John Smith 123-45-6789";
        let matches = vec![
            m(PhiCategory::Name, 0, 10, "John Smith"),
            m(PhiCategory::Ssn, 11, 22, "123-45-6789"),
        ];
        let redacted = redact(text, &matches);
        assert_eq!(redacted, "[NAME] [SSN]");
        for original in &matches {
            assert!(redacted.contains(&original.category.placeholder()));
            assert!(!redacted.contains(&original.text));
        }
    }
}
