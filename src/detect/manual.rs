//! Targeted manual name redaction
//!
//! Independent of the pattern library: given one known full name, scrub
//! every form it commonly appears in. Runs fine before or after
//! automatic detection since placeholder tokens never re-match.

use regex::Regex;
use tracing::debug;

use crate::detect::PhiCategory;
use crate::error::{ConfigurationError, Result};

/// Expand a full name into the surface forms worth scrubbing:
/// the name as given, "Last, First", each part alone, and title + last.
pub fn name_variants(full_name: &str) -> Vec<String> {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    let mut variants: Vec<String> = Vec::new();

    let mut push = |candidate: String| {
        if !candidate.is_empty() && !variants.iter().any(|v| v.eq_ignore_ascii_case(&candidate)) {
            variants.push(candidate);
        }
    };

    push(parts.join(" "));
    if parts.len() >= 2 {
        let first = parts[0];
        let last = parts[parts.len() - 1];
        push(format!("{last}, {first}"));
        for title in ["Mr.", "Ms.", "Mrs.", "Dr."] {
            push(format!("{title} {last}"));
        }
        push(first.to_string());
        push(last.to_string());
    }

    variants
}

/// Replace every case-insensitive whole-word occurrence of the name's
/// variants with the NAME placeholder. Longer variants are applied
/// first so "John Smith" never decays into two half-redactions.
pub fn redact_names(text: &str, full_name: &str) -> Result<String> {
    let variants = name_variants(full_name);
    if variants.is_empty() {
        return Err(ConfigurationError::InvalidValue("empty name for manual redaction".into()).into());
    }

    let mut ordered = variants;
    ordered.sort_by_key(|v| std::cmp::Reverse(v.len()));

    let alternation = ordered
        .iter()
        .map(|v| regex::escape(v))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)\b(?:{alternation})\b");
    let re = Regex::new(&pattern)
        .map_err(|e| ConfigurationError::InvalidPattern {
            category: "MANUAL_NAME",
            source: Box::new(e),
        })?;

    let placeholder = PhiCategory::Name.placeholder();
    let redacted = re.replace_all(text, placeholder.as_str()).into_owned();
    debug!(variants = ordered.len(), "manual name pass applied");
    Ok(redacted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_cover_the_common_forms() {
        let variants = name_variants("Jane Doe");
        assert!(variants.contains(&"Jane Doe".to_string()));
        assert!(variants.contains(&"Doe, Jane".to_string()));
        assert!(variants.contains(&"Jane".to_string()));
        assert!(variants.contains(&"Doe".to_string()));
        assert!(variants.contains(&"Dr. Doe".to_string()));
    }

    #[test]
    fn single_token_name_has_one_variant() {
        assert_eq!(name_variants("Cher"), vec!["Cher".to_string()]);
    }

    #[test]
    fn replaces_all_forms_case_insensitively() {
        let text = "Seen: Jane Doe. DOE, JANE arrived late; dr. doe was notified. \
                    jane called back.";
        let out = redact_names(text, "Jane Doe").unwrap();
        assert!(!out.to_lowercase().contains("jane"));
        assert!(!out.to_lowercase().contains("doe"));
        assert!(out.contains("[NAME]"));
    }

    #[test]
    fn middle_names_keep_first_and_last() {
        let out = redact_names("Mary Beth Miller and Miller, Mary", "Mary Beth Miller").unwrap();
        assert!(!out.contains("Miller"));
        assert!(!out.contains("Mary"));
    }

    #[test]
    fn empty_name_is_a_configuration_error() {
        assert!(redact_names("text", "   ").is_err());
    }
}
