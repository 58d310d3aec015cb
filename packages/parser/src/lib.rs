//! Taxgraph Parser - Convert USLM legal code XML into a typed citation tree.
//!
//! This crate parses a United States Code title published in USLM XML into
//! a tree of [`LegalNode`]s. Every node carries a canonical citation
//! (e.g., "26 USC 162(a)"), its normalized text, a lifecycle status and the
//! cross-references found in that text.
//!
//! # Example
//!
//! ```
//! use taxgraph_parser::{parse_str, ParserConfig};
//!
//! let xml = r#"<title identifier="/us/usc/t26">
//!     <section identifier="/us/usc/t26/s162"><num>§ 162.</num>
//!         <content>Except as provided in section 274, a deduction is allowed.</content>
//!     </section>
//! </title>"#;
//!
//! let parsed = parse_str(xml, &ParserConfig::new()).unwrap();
//! let section = parsed.get_section("162").unwrap();
//! assert_eq!(section.references[0].target_section, "274");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`types`]: Core data types (LegalNode, Reference, ParsedDocument, etc.)
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML utilities
//! - [`text`]: Text extraction, entity decoding and table rendering
//! - [`status`]: Lifecycle status classification
//! - [`references`]: Cross-reference detection
//! - [`citation`]: Canonical citation derivation
//! - [`parser`]: Document loading and tree construction
//! - [`graph`]: Graph export and the in-memory graph store
//! - [`report`]: Statistics, outlines and JSON/YAML export
//! - [`cli`]: Command-line interface

pub mod citation;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod references;
pub mod report;
pub mod status;
pub mod text;
pub mod types;
pub mod xml;

// Re-export main functions
pub use parser::{parse_file, parse_str, parse_tax_code};

// Re-export commonly used items
pub use config::ParserConfig;
pub use error::{ParserError, Result};
pub use types::{LegalNode, NodeStatus, NodeType, ParsedDocument, Reference, ReferenceType};
