//! XML utility functions for navigating and extracting data from DOM trees.
//!
//! USLM documents are namespaced, but fixtures and older exports often are
//! not, so every lookup here matches on the local tag name only.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use taxgraph_parser::xml::get_tag_name;
///
/// let xml = r#"<uscDoc xmlns="http://xml.house.gov/schemas/uslm/1.0"><main/></uscDoc>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "uscDoc");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Check if an element is in the given namespace or in no namespace at all.
pub fn is_in_namespace(node: Node<'_, '_>, namespace: &str) -> bool {
    match node.tag_name().namespace() {
        None => true,
        Some(ns) => ns == namespace,
    }
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use taxgraph_parser::xml::find_child;
///
/// let xml = r#"<section><num>1</num><heading>Tax imposed</heading></section>"#;
/// let doc = Document::parse(xml).unwrap();
/// let section = doc.root_element();
///
/// assert!(find_child(section, "heading").is_some());
/// assert!(find_child(section, "content").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, tag))
}

/// Find the first descendant element (excluding `node` itself) with the
/// given tag name, in document order.
pub fn find_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants().skip(1).find(|d| has_tag(*d, tag))
}

/// Get an attribute value from a node.
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

/// Get all element children of a node.
///
/// Excludes text nodes, comments and processing instructions.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Concatenate every text node below `node` in document order.
///
/// Unlike `Node::text`, which only returns the leading text, this walks the
/// whole subtree, including text that follows nested elements.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use taxgraph_parser::xml::collect_text;
///
/// let xml = r#"<p>See <ref>section 162</ref> for details.</p>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(collect_text(doc.root_element()), "See section 162 for details.");
/// ```
pub fn collect_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|d| d.is_text())
        .filter_map(|d| d.text())
        .collect()
}
