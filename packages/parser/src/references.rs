//! Cross-reference detection in normalized legal text.
//!
//! Patterns are evaluated in priority order, most specific legal phrasing
//! first, so that a designator mentioned both as "as defined in section 162"
//! and as a plain "section 162" is typed as a definition.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{MAX_REFERENCE_CONTEXT_CHARS, REFERENCE_CONTEXT_WINDOW};
use crate::types::{Reference, ReferenceType};

/// Section designator: number with optional letter suffix and any number of
/// parenthesized qualifiers (e.g., "162", "25A", "274(a)(3)").
const DESIGNATOR: &str = r"\d+[A-Za-z]?(?:\([a-z0-9]+\))*";

/// Reference patterns in priority order.
#[allow(clippy::expect_used)] // Static regexes that are guaranteed to be valid
static REFERENCE_PATTERNS: LazyLock<Vec<(Regex, ReferenceType)>> = LazyLock::new(|| {
    let sources = [
        (format!(r"(?i)as defined in section\s+({DESIGNATOR})"), ReferenceType::Definition),
        (
            format!(r"(?i)subject to (?:the provisions of )?section\s+({DESIGNATOR})"),
            ReferenceType::SubjectTo,
        ),
        (
            format!(r"(?i)except as provided in section\s+({DESIGNATOR})"),
            ReferenceType::Exception,
        ),
        (
            r"(?i)\bsections?\s+(\d+[A-Za-z]?)\s+(?:and|or)\s+(\d+[A-Za-z]?)".to_string(),
            ReferenceType::General,
        ),
        (format!(r"(?i)\bsection\s+({DESIGNATOR})"), ReferenceType::General),
        (format!(r"(?i)\bsec\.\s*({DESIGNATOR})"), ReferenceType::General),
        (format!(r"(?i)under section\s+({DESIGNATOR})"), ReferenceType::General),
        (format!(r"(?i)provided in section\s+({DESIGNATOR})"), ReferenceType::General),
        (format!(r"(?i)see section\s+({DESIGNATOR})"), ReferenceType::General),
    ];

    sources
        .into_iter()
        .map(|(pattern, kind)| (Regex::new(&pattern).expect("valid regex"), kind))
        .collect()
});

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Excerpt of `text` around the byte range `start..end`, trimmed and capped.
fn context_window(text: &str, start: usize, end: usize) -> String {
    let from = floor_char_boundary(text, start.saturating_sub(REFERENCE_CONTEXT_WINDOW));
    let to = ceil_char_boundary(text, (end + REFERENCE_CONTEXT_WINDOW).min(text.len()));
    text[from..to]
        .trim()
        .chars()
        .take(MAX_REFERENCE_CONTEXT_CHARS)
        .collect()
}

/// Extract cross-references from normalized text.
///
/// Every captured designator of every match is a candidate; a candidate is
/// kept only the first time its designator is seen in this text. Results
/// follow pattern priority order, then position within the text.
///
/// # Examples
/// ```
/// use taxgraph_parser::references::extract_references;
/// use taxgraph_parser::types::ReferenceType;
///
/// let refs = extract_references("the term as defined in section 7701(a)(1)");
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].target_section, "7701(a)(1)");
/// assert_eq!(refs[0].reference_type, ReferenceType::Definition);
/// ```
pub fn extract_references(text: &str) -> Vec<Reference> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut references = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (pattern, kind) in REFERENCE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            for section in caps.iter().skip(1).flatten() {
                let target = section.as_str();
                if seen.insert(target) {
                    references.push(Reference::new(
                        target,
                        context_window(text, whole.start(), whole.end()),
                        *kind,
                    ));
                }
            }
        }
    }

    references
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(refs: &[Reference]) -> Vec<(&str, ReferenceType)> {
        refs.iter()
            .map(|r| (r.target_section.as_str(), r.reference_type))
            .collect()
    }

    #[test]
    fn test_empty_text() {
        assert!(extract_references("").is_empty());
        assert!(extract_references("There is hereby imposed a tax.").is_empty());
    }

    #[test]
    fn test_higher_priority_type_wins() {
        let text = "section 162 applies. The term has the meaning as defined in section 162. \
                    See also section 162.";
        let refs = extract_references(text);
        assert_eq!(targets(&refs), vec![("162", ReferenceType::Definition)]);
    }

    #[test]
    fn test_typed_phrases() {
        let text = "Subject to the provisions of section 274, and except as provided in \
                    section 280A(c)(1), a deduction is allowed under section 212.";
        let refs = extract_references(text);
        assert_eq!(
            targets(&refs),
            vec![
                ("274", ReferenceType::SubjectTo),
                ("280A(c)(1)", ReferenceType::Exception),
                ("212", ReferenceType::General),
            ]
        );
    }

    #[test]
    fn test_plural_sections_capture_both() {
        let refs = extract_references("the rules of sections 401 and 403 apply");
        assert_eq!(
            targets(&refs),
            vec![("401", ReferenceType::General), ("403", ReferenceType::General)]
        );
    }

    #[test]
    fn test_sec_abbreviation_and_case() {
        let refs = extract_references("Sec. 1 and SECTION 25A(b) apply");
        assert_eq!(
            targets(&refs),
            vec![("25A(b)", ReferenceType::General), ("1", ReferenceType::General)]
        );
    }

    #[test]
    fn test_distinct_designators_kept() {
        let refs = extract_references("section 274 and section 274(a) differ");
        assert_eq!(
            targets(&refs),
            vec![("274", ReferenceType::General), ("274(a)", ReferenceType::General)]
        );
    }

    #[test]
    fn test_context_window() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. For purposes of \
                    section 162, the term includes wages paid during the taxable year to employees.";
        let refs = extract_references(text);
        assert_eq!(refs.len(), 1);
        let context = &refs[0].context;
        assert!(context.contains("section 162"));
        assert!(context.len() <= "section 162".len() + 2 * REFERENCE_CONTEXT_WINDOW);
        assert!(!context.starts_with(' '));
        assert!(!context.ends_with(' '));
    }

    #[test]
    fn test_context_respects_char_boundaries() {
        let text = "§§§§§§§§§§§§§§§§§§§§ section 1 §§§§§§§§§§§§§§§§§§§§";
        let refs = extract_references(text);
        assert_eq!(refs.len(), 1);
        assert!(refs[0].context.contains("section 1"));
    }

    #[test]
    fn test_context_is_capped() {
        let text = format!(
            "section {} follows",
            "1".repeat(MAX_REFERENCE_CONTEXT_CHARS + 50)
        );
        let refs = extract_references(&text);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].context.chars().count(), MAX_REFERENCE_CONTEXT_CHARS);
    }
}
