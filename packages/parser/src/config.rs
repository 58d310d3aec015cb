//! Configuration constants and validation functions for the parser.

use crate::error::{ParserError, Result};

/// USLM namespace used by the Office of the Law Revision Counsel.
pub const USLM_NAMESPACE: &str = "http://xml.house.gov/schemas/uslm/1.0";

/// Code label prefixed to every citation (e.g., "26 USC 162").
pub const DEFAULT_CODE: &str = "26 USC";

/// Document label reported on the parse result.
pub const DEFAULT_TITLE: &str = "Title 26 - Internal Revenue Code";

/// Bytes of surrounding text captured on each side of a reference match.
pub const REFERENCE_CONTEXT_WINDOW: usize = 30;

/// Maximum stored length of a reference context, in characters.
pub const MAX_REFERENCE_CONTEXT_CHARS: usize = 200;

/// Maximum structural nesting depth materialized by the tree builder.
///
/// Real USLM documents nest at most a dozen levels; anything deeper is
/// treated as pathological input.
pub const MAX_STRUCTURAL_DEPTH: usize = 128;

/// Number of nodes or relationships written to a graph store per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Characters of node text kept in nested exports.
pub const EXPORT_TEXT_PREVIEW_CHARS: usize = 200;

/// Characters of node text shown in section detail reports.
pub const DETAIL_TEXT_PREVIEW_CHARS: usize = 500;

/// Wrap width for section detail reports.
pub const TEXT_WRAP_WIDTH: usize = 100;

/// Validate a section cutoff.
///
/// # Examples
/// ```
/// use taxgraph_parser::config::validate_max_sections;
///
/// assert!(validate_max_sections(50).is_ok());
/// assert!(validate_max_sections(0).is_err());
/// ```
pub fn validate_max_sections(max_sections: usize) -> Result<()> {
    if max_sections == 0 {
        Err(ParserError::InvalidMaxSections(max_sections))
    } else {
        Ok(())
    }
}

/// Settings consumed by the tree builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of section nodes to materialize; `None` is unbounded.
    pub max_sections: Option<usize>,

    /// Code label used as the citation prefix.
    pub code: String,

    /// Document label reported on the parse result.
    pub title: String,

    /// Maximum structural nesting depth.
    pub max_depth: usize,
}

impl ParserConfig {
    /// Create a configuration with no cutoff and the Title 26 labels.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_sections: None,
            code: DEFAULT_CODE.to_string(),
            title: DEFAULT_TITLE.to_string(),
            max_depth: MAX_STRUCTURAL_DEPTH,
        }
    }

    /// Set the section cutoff.
    #[must_use]
    pub fn with_max_sections(mut self, max_sections: Option<usize>) -> Self {
        self.max_sections = max_sections;
        self
    }

    /// Set the code label.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set the document title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the maximum structural depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check the configuration before a parse starts.
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_sections {
            validate_max_sections(max)?;
        }
        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_max_sections() {
        assert!(validate_max_sections(1).is_ok());
        assert!(validate_max_sections(10_000).is_ok());
        assert!(matches!(
            validate_max_sections(0),
            Err(ParserError::InvalidMaxSections(0))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.max_sections, None);
        assert_eq!(config.code, "26 USC");
        assert_eq!(config.title, "Title 26 - Internal Revenue Code");
        assert_eq!(config.max_depth, MAX_STRUCTURAL_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ParserConfig::new()
            .with_max_sections(Some(5))
            .with_code("42 USC")
            .with_title("Title 42")
            .with_max_depth(8);
        assert_eq!(config.max_sections, Some(5));
        assert_eq!(config.code, "42 USC");
        assert_eq!(config.title, "Title 42");
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn test_config_rejects_zero_cutoff() {
        let config = ParserConfig::new().with_max_sections(Some(0));
        assert!(config.validate().is_err());
    }
}
