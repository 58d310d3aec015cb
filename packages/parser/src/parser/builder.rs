//! Document tree builder.
//!
//! Walks the structural elements of a USLM document in strict pre-order and
//! turns each one into a [`LegalNode`]. A node's own fields are resolved
//! before any of its children are visited; children are appended in source
//! order.

use std::collections::HashSet;

use roxmltree::Node;

use crate::citation::CitationResolver;
use crate::config::ParserConfig;
use crate::error::{ParserError, Result};
use crate::references::extract_references;
use crate::status::classify_status;
use crate::text::{extract_label, extract_text};
use crate::types::{LegalNode, NodeStatus, NodeType, ParsedDocument};
use crate::xml::{element_children, get_attribute, get_tag_name};

/// Counters threaded through a single traversal.
#[derive(Debug, Default)]
struct Traversal {
    sections_parsed: usize,
    total_nodes: usize,
    repealed_sections: Vec<String>,
    seen_ids: HashSet<String>,
    duplicate_ids: Vec<String>,
    skipped_deep_elements: usize,
}

impl Traversal {
    fn record(&mut self, id: &str, node_type: NodeType, status: NodeStatus) {
        self.total_nodes += 1;

        if node_type == NodeType::Section {
            self.sections_parsed += 1;
            if status == NodeStatus::Repealed {
                self.repealed_sections.push(id.to_string());
            }
        }

        if !self.seen_ids.insert(id.to_string()) && !self.duplicate_ids.iter().any(|d| d == id) {
            tracing::warn!(id, "Duplicate citation id");
            self.duplicate_ids.push(id.to_string());
        }
    }
}

/// Position of an element in the tree being built.
#[derive(Debug, Clone, Copy, Default)]
struct Parent<'p> {
    path: &'p str,
    id: Option<&'p str>,
    depth: usize,
}

/// Build the breadcrumb for a node from its parent's breadcrumb.
fn breadcrumb(
    parent_path: &str,
    node_type: NodeType,
    num: Option<&str>,
    heading: Option<&str>,
) -> String {
    let own = match (heading, num) {
        (Some(heading), _) => Some(format!("{}: {heading}", node_type.label())),
        (None, Some(num)) => Some(format!("{} {num}", node_type.label())),
        (None, None) => None,
    };

    match own {
        Some(own) if !parent_path.is_empty() => format!("{parent_path} > {own}"),
        Some(own) => own,
        None => parent_path.to_string(),
    }
}

/// Builds a [`ParsedDocument`] from a root structural element.
///
/// Every call to [`TreeBuilder::build`] starts from fresh counters, so one
/// builder can parse any number of documents.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    config: ParserConfig,
    resolver: CitationResolver,
}

impl TreeBuilder {
    /// Create a builder for the given configuration.
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        let resolver = CitationResolver::new(config.code.clone());
        Self { config, resolver }
    }

    /// The configuration this builder applies.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Build the tree rooted at `root`.
    ///
    /// # Errors
    /// Returns `InvalidMaxSections` for a zero cutoff and
    /// `MissingRootElement` when `root` is not a structural element.
    pub fn build(&self, root: Node<'_, '_>) -> Result<ParsedDocument> {
        self.config.validate()?;

        let mut traversal = Traversal::default();
        let root_node = self
            .build_node(root, Parent::default(), &mut traversal)
            .ok_or_else(|| ParserError::MissingRootElement {
                element: "title".to_string(),
                context: format!("<{}>", get_tag_name(root)),
            })?;

        tracing::info!(
            total_nodes = traversal.total_nodes,
            total_sections = traversal.sections_parsed,
            repealed = traversal.repealed_sections.len(),
            "Parsed document tree"
        );

        Ok(ParsedDocument {
            title: self.config.title.clone(),
            code: self.config.code.clone(),
            root: root_node,
            total_nodes: traversal.total_nodes,
            total_sections: traversal.sections_parsed,
            repealed_sections: traversal.repealed_sections,
            duplicate_ids: traversal.duplicate_ids,
            skipped_deep_elements: traversal.skipped_deep_elements,
        })
    }

    /// Check the section cutoff before each candidate element. Once reached,
    /// no further element of any level is materialized, including the
    /// sub-levels of the section that reached it.
    fn blocked_by_cutoff(&self, traversal: &Traversal) -> bool {
        self.config
            .max_sections
            .is_some_and(|max| traversal.sections_parsed >= max)
    }

    fn build_node(
        &self,
        elem: Node<'_, '_>,
        parent: Parent<'_>,
        traversal: &mut Traversal,
    ) -> Option<LegalNode> {
        let node_type = NodeType::from_tag(get_tag_name(elem))?;

        if self.blocked_by_cutoff(traversal) {
            return None;
        }

        if parent.depth >= self.config.max_depth {
            tracing::warn!(
                node_type = %node_type,
                depth = parent.depth,
                "Structural element nested too deep, skipping"
            );
            traversal.skipped_deep_elements += 1;
            return None;
        }

        let identifier = get_attribute(elem, "identifier").unwrap_or_default();
        let num = extract_label(elem, "num");
        let heading = extract_label(elem, "heading");
        let text = extract_text(elem);
        let status = classify_status(elem, &text);
        let hierarchical_path =
            breadcrumb(parent.path, node_type, num.as_deref(), heading.as_deref());
        let id = self.resolver.resolve(node_type, num.as_deref(), identifier);
        let references = extract_references(&text);

        traversal.record(&id, node_type, status);
        if node_type == NodeType::Section {
            tracing::debug!(id = %id, status = %status, references = references.len(), "Parsed section");
        }

        let mut children = Vec::new();
        for child in element_children(elem) {
            let position = Parent {
                path: &hierarchical_path,
                id: Some(&id),
                depth: parent.depth + 1,
            };
            if let Some(node) = self.build_node(child, position, traversal) {
                children.push(node);
            }
        }

        Some(LegalNode {
            id,
            identifier: identifier.to_string(),
            node_type,
            num,
            heading,
            text,
            status,
            parent_id: parent.id.map(str::to_string),
            hierarchical_path,
            references,
            children,
        })
    }
}
