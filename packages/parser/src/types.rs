//! Core data types for the parser.
//!
//! These types represent a US Code title as a tree of typed nodes. All of
//! them are created once during a single traversal and are read-only
//! afterwards.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Levels of the legal-code hierarchy, in nesting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Title,
    Subtitle,
    Chapter,
    Subchapter,
    Part,
    Subpart,
    Section,
    Subsection,
    Paragraph,
    Subparagraph,
    Clause,
}

impl NodeType {
    /// Every node type, outermost first.
    pub const ALL: [NodeType; 11] = [
        Self::Title,
        Self::Subtitle,
        Self::Chapter,
        Self::Subchapter,
        Self::Part,
        Self::Subpart,
        Self::Section,
        Self::Subsection,
        Self::Paragraph,
        Self::Subparagraph,
        Self::Clause,
    ];

    /// Map a structural tag name (without namespace) to its node type.
    ///
    /// # Examples
    /// ```
    /// use taxgraph_parser::types::NodeType;
    ///
    /// assert_eq!(NodeType::from_tag("section"), Some(NodeType::Section));
    /// assert_eq!(NodeType::from_tag("content"), None);
    /// ```
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "title" => Some(Self::Title),
            "subtitle" => Some(Self::Subtitle),
            "chapter" => Some(Self::Chapter),
            "subchapter" => Some(Self::Subchapter),
            "part" => Some(Self::Part),
            "subpart" => Some(Self::Subpart),
            "section" => Some(Self::Section),
            "subsection" => Some(Self::Subsection),
            "paragraph" => Some(Self::Paragraph),
            "subparagraph" => Some(Self::Subparagraph),
            "clause" => Some(Self::Clause),
            _ => None,
        }
    }

    /// Tag name and serialized value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Chapter => "chapter",
            Self::Subchapter => "subchapter",
            Self::Part => "part",
            Self::Subpart => "subpart",
            Self::Section => "section",
            Self::Subsection => "subsection",
            Self::Paragraph => "paragraph",
            Self::Subparagraph => "subparagraph",
            Self::Clause => "clause",
        }
    }

    /// Capitalized label used in breadcrumbs (e.g., "Subchapter").
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Subtitle => "Subtitle",
            Self::Chapter => "Chapter",
            Self::Subchapter => "Subchapter",
            Self::Part => "Part",
            Self::Subpart => "Subpart",
            Self::Section => "Section",
            Self::Subsection => "Subsection",
            Self::Paragraph => "Paragraph",
            Self::Subparagraph => "Subparagraph",
            Self::Clause => "Clause",
        }
    }

    /// Container types group other nodes and carry no legal text of their own.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Title
                | Self::Subtitle
                | Self::Chapter
                | Self::Subchapter
                | Self::Part
                | Self::Subpart
        )
    }

    /// Content types may carry legal text.
    #[must_use]
    pub fn is_content(&self) -> bool {
        !self.is_container()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a legal node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Active,
    Repealed,
    Expired,
    Reserved,
}

impl NodeStatus {
    /// Serialized value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Repealed => "repealed",
            Self::Expired => "expired",
            Self::Reserved => "reserved",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legal relationship expressed by a cross-reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Definition,
    Exception,
    SubjectTo,
    #[default]
    General,
}

impl ReferenceType {
    /// Serialized value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Exception => "exception",
            Self::SubjectTo => "subject_to",
            Self::General => "general",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cross-reference from a node's text to another section.
///
/// Two references are equal when target and type match; the context is
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Referenced section designator (e.g., "162", "274(a)").
    pub target_section: String,

    /// Excerpt of the text surrounding the match.
    pub context: String,

    /// Relationship type.
    pub reference_type: ReferenceType,
}

impl Reference {
    /// Create a new reference.
    #[must_use]
    pub fn new(
        target_section: impl Into<String>,
        context: impl Into<String>,
        reference_type: ReferenceType,
    ) -> Self {
        Self {
            target_section: target_section.into(),
            context: context.into(),
            reference_type,
        }
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.target_section == other.target_section && self.reference_type == other.reference_type
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target_section.hash(state);
        self.reference_type.hash(state);
    }
}

/// A node in the legal-code hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalNode {
    /// Canonical citation (e.g., "26 USC 162(a)").
    pub id: String,

    /// Raw structural identifier path (e.g., "/us/usc/t26/s162/a").
    pub identifier: String,

    /// Level of this node in the hierarchy.
    pub node_type: NodeType,

    /// Declared number label (e.g., "§ 162.", "(a)").
    pub num: Option<String>,

    /// Heading label.
    pub heading: Option<String>,

    /// Normalized body text; empty for pure containers.
    pub text: String,

    pub status: NodeStatus,

    /// Citation of the parent node, `None` for the root.
    pub parent_id: Option<String>,

    /// Breadcrumb of ancestor labels (e.g., "Chapter: Normal Taxes > Section 1").
    pub hierarchical_path: String,

    /// Cross-references found in this node's own text.
    pub references: Vec<Reference>,

    /// Child nodes in document order.
    pub children: Vec<LegalNode>,
}

impl LegalNode {
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.node_type.is_container()
    }

    #[must_use]
    pub fn is_content(&self) -> bool {
        self.node_type.is_content()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Heading and text joined for display.
    #[must_use]
    pub fn full_text(&self) -> String {
        [self.heading.as_deref(), Some(self.text.as_str())]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" - ")
    }

    /// Text used for semantic embedding: breadcrumb and heading for context,
    /// followed by the body text.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        let parts: Vec<&str> = [
            Some(self.hierarchical_path.as_str()),
            self.heading.as_deref(),
            Some(self.text.as_str()),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

        let prefix = parts.iter().take(2).copied().collect::<Vec<_>>().join(" > ");
        let body = parts.get(2).copied().unwrap_or_default();
        format!("{prefix}: {body}")
    }

    /// Iterate this node and all descendants in pre-order.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// All section nodes in the subtree, in pre-order.
    #[must_use]
    pub fn sections(&self) -> Vec<&LegalNode> {
        self.iter()
            .filter(|n| n.node_type == NodeType::Section)
            .collect()
    }

    /// All leaf nodes in the subtree, in pre-order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&LegalNode> {
        self.iter().filter(|n| n.is_leaf()).collect()
    }

    /// Find a node in the subtree by citation.
    #[must_use]
    pub fn find_by_id(&self, target_id: &str) -> Option<&LegalNode> {
        self.iter().find(|n| n.id == target_id)
    }

    /// Flat copy of this node without its children, for storage.
    #[must_use]
    pub fn to_flat(&self) -> FlatNode {
        FlatNode {
            id: self.id.clone(),
            identifier: self.identifier.clone(),
            node_type: self.node_type,
            num: self.num.clone(),
            heading: self.heading.clone(),
            text: self.text.clone(),
            status: self.status,
            parent_id: self.parent_id.clone(),
            hierarchical_path: self.hierarchical_path.clone(),
            is_container: self.is_container(),
            is_content: self.is_content(),
            references: self.references.clone(),
            child_ids: self.children.iter().map(|c| c.id.clone()).collect(),
        }
    }
}

/// Pre-order iterator over a node subtree.
pub struct PreOrder<'a> {
    stack: Vec<&'a LegalNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a LegalNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A node without its children, as handed to a graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatNode {
    pub id: String,
    pub identifier: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub num: Option<String>,
    pub heading: Option<String>,
    pub text: String,
    pub status: NodeStatus,
    pub parent_id: Option<String>,
    pub hierarchical_path: String,
    pub is_container: bool,
    pub is_content: bool,
    pub references: Vec<Reference>,
    pub child_ids: Vec<String>,
}

/// The result of parsing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Document label.
    pub title: String,

    /// Code label used as the citation prefix.
    pub code: String,

    pub root: LegalNode,

    /// Number of nodes materialized, containers included.
    pub total_nodes: usize,

    /// Number of section nodes materialized.
    pub total_sections: usize,

    /// Citations of repealed sections, in discovery order.
    pub repealed_sections: Vec<String>,

    /// Citations produced by more than one node, in discovery order.
    pub duplicate_ids: Vec<String>,

    /// Structural elements dropped for exceeding the depth bound.
    pub skipped_deep_elements: usize,
}

impl ParsedDocument {
    /// Look up a section by its number (e.g., "162", "274").
    #[must_use]
    pub fn get_section(&self, section_num: &str) -> Option<&LegalNode> {
        let target_id = format!("{} {}", self.code, section_num);
        self.root.find_by_id(&target_id)
    }

    /// All section nodes, in pre-order.
    #[must_use]
    pub fn sections(&self) -> Vec<&LegalNode> {
        self.root.sections()
    }

    /// Every reference paired with the citation of the node it was found in.
    #[must_use]
    pub fn all_references(&self) -> Vec<(String, Reference)> {
        self.root
            .iter()
            .flat_map(|node| {
                node.references
                    .iter()
                    .map(move |r| (node.id.clone(), r.clone()))
            })
            .collect()
    }
}
