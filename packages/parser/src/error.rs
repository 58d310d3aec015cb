//! Error types for the parser.
//!
//! Only document-level failures surface as errors. Anomalies inside a
//! subtree (missing `num`, `heading` or `content`) resolve to defaults and
//! never reach this type.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the parser library.
#[derive(Debug, Error)]
pub enum ParserError {
    /// The input document does not exist.
    #[error("XML file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The markup is not well-formed XML.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// No recognizable top-level structural element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingRootElement { element: String, context: String },

    /// A section cutoff of zero would produce an empty tree.
    #[error("Invalid max sections: {0}. Expected a value of at least 1")]
    InvalidMaxSections(usize),

    /// A report asked for a section that is not in the parsed tree.
    #[error("Section not found: {0}")]
    SectionNotFound(String),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// A graph store rejected a write.
    #[error("Graph store error: {0}")]
    GraphStore(String),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;
