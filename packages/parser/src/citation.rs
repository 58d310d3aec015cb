//! Canonical citation derivation.
//!
//! USLM identifiers are slash-delimited paths such as
//! `/us/usc/t26/stA/ch1/schA/pt1/s1/a/2`. The citation keeps the section
//! number and wraps every level below it in parentheses:
//!
//! ```text
//! /us/usc/t26/s162/a/1  ->  26 USC 162(a)(1)
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::types::NodeType;

/// Leading "Sec." / "Section" / "§" label on a declared number.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NUM_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:sec(?:tion)?\b\.?|§+)\s*").expect("valid regex")
});

/// Classification of one identifier path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// Title, subtitle, chapter, subchapter, part or subpart marker.
    Structural,
    /// Section marker; carries the section number.
    Section(&'a str),
    /// Anything else (subsection, paragraph, ... designators).
    Other(&'a str),
}

fn has_marker(segment: &str, marker: &str) -> bool {
    segment
        .strip_prefix(marker)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_alphanumeric())
}

fn classify_segment(segment: &str) -> Segment<'_> {
    let is_title = segment
        .strip_prefix('t')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit());
    if is_title || ["sch", "spt", "st", "ch", "pt"].iter().any(|m| has_marker(segment, m)) {
        return Segment::Structural;
    }

    match segment.strip_prefix('s') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => Segment::Section(rest),
        _ => Segment::Other(segment),
    }
}

/// Derives canonical citations for a single code (e.g., "26 USC").
///
/// Derivation is pure: identical inputs always give the identical citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationResolver {
    code: String,
}

impl CitationResolver {
    /// Create a resolver for the given code label.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// The code label this resolver prefixes.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Build the citation for a node.
    ///
    /// # Arguments
    /// * `node_type` - Level of the node
    /// * `num` - Declared number label, if any
    /// * `identifier` - Structural identifier path, empty when absent
    ///
    /// # Examples
    /// ```
    /// use taxgraph_parser::citation::CitationResolver;
    /// use taxgraph_parser::types::NodeType;
    ///
    /// let resolver = CitationResolver::new("26 USC");
    /// assert_eq!(
    ///     resolver.resolve(NodeType::Subsection, Some("(a)"), "/us/usc/t26/s162/a"),
    ///     "26 USC 162(a)"
    /// );
    /// assert_eq!(resolver.resolve(NodeType::Section, None, ""), "26 USC unknown");
    /// ```
    #[must_use]
    pub fn resolve(&self, node_type: NodeType, num: Option<&str>, identifier: &str) -> String {
        if identifier.is_empty() {
            return format!("{} {}", self.code, num.unwrap_or("unknown"));
        }

        if let Some(section_path) = Self::section_path(identifier) {
            return format!("{} {section_path}", self.code);
        }

        if let Some(num) = num {
            let clean = NUM_PREFIX.replace(num.trim(), "");
            tracing::trace!(node_type = %node_type, identifier, "No section marker, using num");
            return format!("{} {clean}", self.code);
        }

        format!("{} {identifier}", self.code)
    }

    /// Walk a well-formed identifier and accumulate the section part.
    ///
    /// Returns `None` when the path is not `/<jurisdiction>/<code>/...` or
    /// contains no section marker.
    fn section_path(identifier: &str) -> Option<String> {
        let parts: Vec<&str> = identifier.trim_matches('/').split('/').collect();
        if parts.len() < 3 || parts[0] != "us" || parts[1] != "usc" {
            return None;
        }

        let mut citation = String::new();
        let mut in_section = false;

        for part in &parts[2..] {
            match classify_segment(part) {
                Segment::Structural if !in_section => {}
                Segment::Section(number) if !in_section => {
                    in_section = true;
                    citation.push_str(number);
                }
                Segment::Structural | Segment::Section(_) | Segment::Other(_) if in_section => {
                    citation.push('(');
                    citation.push_str(part);
                    citation.push(')');
                }
                _ => {}
            }
        }

        (!citation.is_empty()).then_some(citation)
    }
}
