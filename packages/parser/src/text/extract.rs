//! Prose extraction from structural elements.

use roxmltree::Node;

use super::normalize::clean_text;
use super::table::table_to_text;
use crate::types::NodeType;
use crate::xml::{collect_text, element_children, find_child, find_descendant, get_tag_name};

/// Child tags whose text is surfaced as node metadata rather than body text.
pub const METADATA_TAGS: [&str; 3] = ["num", "heading", "meta"];

/// Get the cleaned text of a metadata child such as `num` or `heading`.
///
/// Returns `None` when the child is missing or has no text.
pub fn extract_label(node: Node<'_, '_>, tag: &str) -> Option<String> {
    let child = find_child(node, tag)?;
    let text = clean_text(&collect_text(child));
    (!text.is_empty()).then_some(text)
}

/// Extract the normalized body text of a structural element.
///
/// A `<content>` child, when present, is the sole source of text. Otherwise
/// the element's leading text and every non-structural, non-metadata child
/// are concatenated in document order. Nested structural children become
/// separate nodes and contribute nothing here.
pub fn extract_text(node: Node<'_, '_>) -> String {
    if let Some(content) = find_child(node, "content") {
        return clean_text(&element_to_text(content));
    }

    let mut parts: Vec<String> = Vec::new();

    if let Some(leading) = node.text() {
        parts.push(leading.trim().to_string());
    }

    for child in element_children(node) {
        let tag = get_tag_name(child);
        if NodeType::from_tag(tag).is_some() || METADATA_TAGS.contains(&tag) {
            continue;
        }
        parts.push(element_to_text(child));
    }

    let joined = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    clean_text(&joined)
}

/// Convert an element to raw (not yet normalized) text, rendering tables.
///
/// Prose before, between and after embedded tables is kept; prose segments
/// and table blocks are joined with line breaks.
pub fn element_to_text(node: Node<'_, '_>) -> String {
    if get_tag_name(node) == "table" {
        return table_to_text(node);
    }

    if find_descendant(node, "table").is_none() {
        return collect_text(node);
    }

    let mut blocks: Vec<String> = Vec::new();
    let mut prose = String::new();
    push_segments(node, &mut prose, &mut blocks);
    flush_prose(&mut prose, &mut blocks);
    blocks.join("\n")
}

fn flush_prose(prose: &mut String, blocks: &mut Vec<String>) {
    let trimmed = prose.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_string());
    }
    prose.clear();
}

fn push_segments(node: Node<'_, '_>, prose: &mut String, blocks: &mut Vec<String>) {
    for child in node.children() {
        if child.is_text() {
            if let Some(text) = child.text() {
                prose.push_str(text);
            }
        } else if child.is_element() {
            if get_tag_name(child) == "table" {
                flush_prose(prose, blocks);
                let table = table_to_text(child);
                if !table.is_empty() {
                    blocks.push(table);
                }
            } else {
                push_segments(child, prose, blocks);
            }
        }
    }
}
