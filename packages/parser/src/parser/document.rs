//! Loading a USLM document and locating its root structural element.

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node, ParsingOptions};

use super::builder::TreeBuilder;
use crate::config::{ParserConfig, USLM_NAMESPACE};
use crate::error::{ParserError, Result};
use crate::types::{NodeType, ParsedDocument};
use crate::xml::{find_child, get_tag_name, has_tag, is_in_namespace};

fn is_uslm_element(node: Node<'_, '_>, tag: &str) -> bool {
    has_tag(node, tag) && is_in_namespace(node, USLM_NAMESPACE)
}

/// Locate the top-level structural element of a USLM document.
///
/// Prefers `<main>/<title>`, then the first `<title>` anywhere in the
/// document, then the first structural element of any level (a document
/// holding a single chapter, for instance). Only elements in the USLM
/// namespace or in no namespace qualify, so Dublin Core `<dc:title>`
/// metadata is never picked.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use taxgraph_parser::parser::find_root_element;
///
/// let xml = r#"<uscDoc><meta><title>metadata</title></meta>
///     <main><title identifier="/us/usc/t26"/></main></uscDoc>"#;
/// let doc = Document::parse(xml).unwrap();
/// let title = find_root_element(&doc).unwrap();
/// assert_eq!(title.attribute("identifier"), Some("/us/usc/t26"));
/// ```
pub fn find_root_element<'a, 'input>(doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    let from_main = doc
        .descendants()
        .find(|n| is_uslm_element(*n, "main"))
        .and_then(|main| find_child(main, "title"))
        .filter(|title| is_in_namespace(*title, USLM_NAMESPACE));

    from_main
        .or_else(|| doc.descendants().find(|n| is_uslm_element(*n, "title")))
        .or_else(|| {
            doc.descendants().find(|n| {
                n.is_element()
                    && NodeType::from_tag(get_tag_name(*n)).is_some()
                    && is_in_namespace(*n, USLM_NAMESPACE)
            })
        })
}

/// Parse USLM XML text into a [`ParsedDocument`].
///
/// # Errors
/// Returns `XmlParse` for malformed markup and `MissingRootElement` when no
/// structural element can be found.
pub fn parse_str(xml: &str, config: &ParserConfig) -> Result<ParsedDocument> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)?;

    let root = find_root_element(&doc).ok_or_else(|| ParserError::MissingRootElement {
        element: "title".to_string(),
        context: format!("<{}>", get_tag_name(doc.root_element())),
    })?;

    tracing::info!(
        identifier = root.attribute("identifier").unwrap_or_default(),
        max_sections = ?config.max_sections,
        "Parsing document"
    );

    TreeBuilder::new(config.clone()).build(root)
}

/// Parse a USLM XML file into a [`ParsedDocument`].
///
/// # Errors
/// Returns `FileNotFound` when the file does not exist, plus every error of
/// [`parse_str`].
pub fn parse_file(path: &Path, config: &ParserConfig) -> Result<ParsedDocument> {
    if !path.exists() {
        return Err(ParserError::FileNotFound(path.to_path_buf()));
    }

    let xml = fs::read_to_string(path)?;
    parse_str(&xml, config)
}

/// Parse a Title 26 file with an optional section cutoff.
pub fn parse_tax_code(path: &Path, max_sections: Option<usize>) -> Result<ParsedDocument> {
    let config = ParserConfig::new().with_max_sections(max_sections);
    parse_file(path, &config)
}
