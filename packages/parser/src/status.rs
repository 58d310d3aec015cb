//! Lifecycle status classification.

use roxmltree::Node;

use crate::types::NodeStatus;
use crate::xml::get_attribute;

/// Classify from an explicit `status` attribute value.
fn from_attribute(value: &str) -> Option<NodeStatus> {
    let value = value.to_lowercase();
    if value.contains("repeal") {
        Some(NodeStatus::Repealed)
    } else if value.contains("expired") {
        Some(NodeStatus::Expired)
    } else if value.contains("reserved") {
        Some(NodeStatus::Reserved)
    } else {
        None
    }
}

/// Classify from markers in the normalized body text.
fn from_text(text: &str) -> Option<NodeStatus> {
    let text = text.to_lowercase();
    if text.contains("[repealed") || text.contains("repealed.") {
        Some(NodeStatus::Repealed)
    } else if text.contains("[expired") {
        Some(NodeStatus::Expired)
    } else {
        None
    }
}

/// Determine the status of an element from its attributes and text.
///
/// Attribute evidence always outranks textual evidence; without either the
/// node is active.
pub fn classify_status(node: Node<'_, '_>, text: &str) -> NodeStatus {
    get_attribute(node, "status")
        .and_then(from_attribute)
        .or_else(|| from_text(text))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn classify(xml: &str, text: &str) -> NodeStatus {
        let doc = Document::parse(xml).unwrap();
        classify_status(doc.root_element(), text)
    }

    #[test]
    fn test_attribute_values() {
        assert_eq!(classify(r#"<section status="repealed"/>"#, ""), NodeStatus::Repealed);
        assert_eq!(classify(r#"<section status="Repealed"/>"#, ""), NodeStatus::Repealed);
        assert_eq!(classify(r#"<section status="expired"/>"#, ""), NodeStatus::Expired);
        assert_eq!(classify(r#"<section status="reserved"/>"#, ""), NodeStatus::Reserved);
    }

    #[test]
    fn test_text_markers() {
        assert_eq!(classify("<section/>", "[Repealed]"), NodeStatus::Repealed);
        assert_eq!(
            classify("<section/>", "Repealed. Pub. L. 94-455, title XIX"),
            NodeStatus::Repealed
        );
        assert_eq!(classify("<section/>", "[Expired]"), NodeStatus::Expired);
    }

    #[test]
    fn test_attribute_outranks_text() {
        assert_eq!(
            classify(r#"<section status="reserved"/>"#, "[Repealed]"),
            NodeStatus::Reserved
        );
    }

    #[test]
    fn test_unrecognized_attribute_falls_through_to_text() {
        assert_eq!(
            classify(r#"<section status="operational"/>"#, "[Repealed]"),
            NodeStatus::Repealed
        );
    }

    #[test]
    fn test_default_is_active() {
        assert_eq!(classify("<section/>", "There is hereby imposed a tax."), NodeStatus::Active);
        assert_eq!(
            classify("<section/>", "the amount repealed under this title"),
            NodeStatus::Active
        );
    }
}
