//! Graph export of a parsed document.
//!
//! A parsed tree maps onto a property graph: one node per [`LegalNode`],
//! a `PARENT_OF` edge per parent/child pair and a `REFERENCES` edge per
//! cross-reference whose target section exists in the store. Storage sits
//! behind the [`GraphStore`] trait; [`MemoryGraph`] is the in-process
//! implementation.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::Result;
use crate::types::{FlatNode, LegalNode, ParsedDocument, Reference, ReferenceType};

/// All nodes of a subtree, in pre-order.
#[must_use]
pub fn flatten_nodes(root: &LegalNode) -> Vec<&LegalNode> {
    root.iter().collect()
}

/// `(parent_id, child_id)` for every edge of the subtree, in pre-order.
#[must_use]
pub fn extract_parent_relationships(root: &LegalNode) -> Vec<(String, String)> {
    root.iter()
        .flat_map(|node| {
            node.children
                .iter()
                .map(move |child| (node.id.clone(), child.id.clone()))
        })
        .collect()
}

/// `(source_id, reference)` for every reference of the subtree, in pre-order.
#[must_use]
pub fn extract_all_references(root: &LegalNode) -> Vec<(String, Reference)> {
    root.iter()
        .flat_map(|node| {
            node.references
                .iter()
                .map(move |r| (node.id.clone(), r.clone()))
        })
        .collect()
}

/// Citation a reference target points at.
///
/// # Examples
/// ```
/// use taxgraph_parser::graph::resolve_target;
///
/// assert_eq!(resolve_target("26 USC", "162(a)"), "26 USC 162(a)");
/// ```
#[must_use]
pub fn resolve_target(code: &str, target_section: &str) -> String {
    format!("{code} {target_section}")
}

/// Outcome of linking a batch of references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceLinks {
    /// Edges created.
    pub created: usize,
    /// Resolved target citations with no node in the store.
    pub not_found: Vec<String>,
}

/// Storage backend for the legal graph.
///
/// Writes are idempotent: upserting a node twice keeps one node and
/// linking the same edge twice keeps one edge.
pub trait GraphStore {
    /// Insert or replace nodes by citation. Returns the number written.
    fn upsert_nodes(&mut self, nodes: &[FlatNode]) -> Result<usize>;

    /// Create `PARENT_OF` edges between stored nodes. Returns the number of
    /// edges created.
    fn link_parents(&mut self, edges: &[(String, String)]) -> Result<usize>;

    /// Create `REFERENCES` edges. Targets are resolved against `code`;
    /// targets without a stored node are reported, never created.
    fn link_references(
        &mut self,
        code: &str,
        references: &[(String, Reference)],
    ) -> Result<ReferenceLinks>;

    /// Number of stored nodes.
    fn node_count(&self) -> usize;

    /// Remove every node and edge.
    fn clear(&mut self) -> Result<()>;
}

/// A stored `REFERENCES` edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReferenceEdge {
    pub source: String,
    pub target: String,
    pub reference_type: ReferenceType,
    pub context: String,
}

/// A section together with its surroundings in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionContext<'a> {
    pub node: &'a FlatNode,
    /// Ancestors from the root down to the direct parent.
    pub ancestors: Vec<&'a FlatNode>,
    pub children: Vec<&'a FlatNode>,
    pub references: Vec<&'a ReferenceEdge>,
}

/// Number of stored edges per relationship type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipCounts {
    #[serde(rename = "PARENT_OF")]
    pub parent_of: usize,
    #[serde(rename = "REFERENCES")]
    pub references: usize,
}

/// In-memory [`GraphStore`] keyed by citation.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    nodes: HashMap<String, FlatNode>,
    parents: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,
    references: Vec<ReferenceEdge>,
    reference_keys: HashSet<(String, String, ReferenceType)>,
}

impl MemoryGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by citation.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FlatNode> {
        self.nodes.get(id)
    }

    /// Number of `PARENT_OF` edges.
    #[must_use]
    pub fn parent_edge_count(&self) -> usize {
        self.parents.len()
    }

    /// Edge counts by relationship type.
    #[must_use]
    pub fn relationship_counts(&self) -> RelationshipCounts {
        RelationshipCounts {
            parent_of: self.parents.len(),
            references: self.references.len(),
        }
    }

    /// All `REFERENCES` edges, in creation order.
    #[must_use]
    pub fn reference_edges(&self) -> &[ReferenceEdge] {
        &self.references
    }

    /// A node with its ancestor chain, children and outgoing references.
    #[must_use]
    pub fn section_with_context(&self, id: &str) -> Option<SectionContext<'_>> {
        let node = self.nodes.get(id)?;

        let mut ancestors = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut current = self.parents.get(id);
        // Duplicate citations can close a cycle; stop at the first repeat.
        while let Some(parent_id) = current.filter(|p| visited.insert(p.as_str())) {
            if let Some(parent) = self.nodes.get(parent_id) {
                ancestors.push(parent);
            }
            current = self.parents.get(parent_id);
        }
        ancestors.reverse();

        let children = self
            .children
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.nodes.get(child))
            .collect();

        let references = self.references.iter().filter(|r| r.source == id).collect();

        Some(SectionContext {
            node,
            ancestors,
            children,
            references,
        })
    }

    /// Nodes with a `REFERENCES` edge to `id`, sorted by citation.
    #[must_use]
    pub fn sections_referencing(&self, id: &str) -> Vec<&FlatNode> {
        let mut sources: Vec<&FlatNode> = self
            .references
            .iter()
            .filter(|r| r.target == id)
            .filter_map(|r| self.nodes.get(&r.source))
            .collect();
        sources.sort_by(|a, b| a.id.cmp(&b.id));
        sources.dedup_by(|a, b| a.id == b.id);
        sources
    }
}

impl GraphStore for MemoryGraph {
    fn upsert_nodes(&mut self, nodes: &[FlatNode]) -> Result<usize> {
        for node in nodes {
            self.nodes.insert(node.id.clone(), node.clone());
        }
        Ok(nodes.len())
    }

    fn link_parents(&mut self, edges: &[(String, String)]) -> Result<usize> {
        let mut created = 0;
        for (parent, child) in edges {
            if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
                tracing::debug!(parent = %parent, child = %child, "Skipping edge to unknown node");
                continue;
            }
            if parent == child || self.parents.get(child) == Some(parent) {
                continue;
            }
            // A repeated citation moves under its latest parent.
            if let Some(previous) = self.parents.insert(child.clone(), parent.clone()) {
                if let Some(siblings) = self.children.get_mut(&previous) {
                    siblings.retain(|c| c != child);
                }
            }
            self.children
                .entry(parent.clone())
                .or_default()
                .push(child.clone());
            created += 1;
        }
        Ok(created)
    }

    fn link_references(
        &mut self,
        code: &str,
        references: &[(String, Reference)],
    ) -> Result<ReferenceLinks> {
        let mut links = ReferenceLinks::default();

        for (source, reference) in references {
            let target = resolve_target(code, &reference.target_section);
            if !self.nodes.contains_key(source) || !self.nodes.contains_key(&target) {
                links.not_found.push(target);
                continue;
            }

            let key = (source.clone(), target.clone(), reference.reference_type);
            if !self.reference_keys.insert(key) {
                continue;
            }
            self.references.push(ReferenceEdge {
                source: source.clone(),
                target,
                reference_type: reference.reference_type,
                context: reference.context.clone(),
            });
            links.created += 1;
        }

        Ok(links)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn clear(&mut self) -> Result<()> {
        *self = Self::default();
        Ok(())
    }
}

/// Summary of a graph ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub nodes_created: usize,
    pub parent_relationships: usize,
    pub reference_relationships: usize,
    pub references_not_found: usize,
    /// Node count of the store after ingestion.
    pub total_nodes: usize,
    /// Distinct unresolved target citations, in first-seen order.
    pub unresolved_targets: Vec<String>,
}

/// Write a parsed document into a graph store.
///
/// Nodes are written first, then hierarchy edges, then references, each in
/// batches of `batch_size`. References whose target is not in the store
/// are counted in `references_not_found` and listed in
/// `unresolved_targets`.
///
/// # Errors
/// Propagates any error returned by the store.
pub fn ingest<S: GraphStore>(
    parsed: &ParsedDocument,
    store: &mut S,
    batch_size: usize,
    clear_existing: bool,
) -> Result<IngestStats> {
    let batch_size = batch_size.max(1);
    let mut stats = IngestStats::default();

    if clear_existing {
        tracing::info!("Clearing existing graph");
        store.clear()?;
    }

    let nodes: Vec<FlatNode> = flatten_nodes(&parsed.root)
        .into_iter()
        .map(LegalNode::to_flat)
        .collect();
    for (i, batch) in nodes.chunks(batch_size).enumerate() {
        stats.nodes_created += store.upsert_nodes(batch)?;
        tracing::debug!(batch = i + 1, size = batch.len(), "Wrote node batch");
    }

    let edges = extract_parent_relationships(&parsed.root);
    for batch in edges.chunks(batch_size) {
        stats.parent_relationships += store.link_parents(batch)?;
    }

    let references = extract_all_references(&parsed.root);
    let mut seen_unresolved = HashSet::new();
    for batch in references.chunks(batch_size) {
        let links = store.link_references(&parsed.code, batch)?;
        stats.reference_relationships += links.created;
        stats.references_not_found += links.not_found.len();
        for target in links.not_found {
            if seen_unresolved.insert(target.clone()) {
                stats.unresolved_targets.push(target);
            }
        }
    }

    stats.total_nodes = store.node_count();

    tracing::info!(
        nodes = stats.nodes_created,
        parents = stats.parent_relationships,
        references = stats.reference_relationships,
        not_found = stats.references_not_found,
        "Graph ingestion complete"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::error::ParserError;
    use crate::parser::parse_str;
    use pretty_assertions::assert_eq;

    const XML: &str = r#"<title identifier="/us/usc/t26">
        <chapter identifier="/us/usc/t26/stA/ch1"><num>CHAPTER 1—</num>
            <section identifier="/us/usc/t26/s1"><num>§ 1.</num><heading>Tax imposed</heading>
                <subsection identifier="/us/usc/t26/s1/a"><content>See section 2 and section 9999.</content></subsection>
            </section>
            <section identifier="/us/usc/t26/s2"><num>§ 2.</num><heading>Definitions</heading>
                <content>The term is as defined in section 1.</content>
            </section>
        </chapter>
    </title>"#;

    fn parsed() -> ParsedDocument {
        parse_str(XML, &ParserConfig::new()).unwrap()
    }

    #[test]
    fn test_flatten_and_relationships() {
        let doc = parsed();
        let ids: Vec<_> = flatten_nodes(&doc.root).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), doc.total_nodes);
        assert_eq!(ids[2], "26 USC 1");
        assert_eq!(ids[3], "26 USC 1(a)");

        let edges = extract_parent_relationships(&doc.root);
        assert_eq!(edges.len(), doc.total_nodes - 1);
        assert!(edges.contains(&("26 USC 1".to_string(), "26 USC 1(a)".to_string())));

        let refs = extract_all_references(&doc.root);
        let pairs: Vec<_> = refs
            .iter()
            .map(|(source, r)| (source.as_str(), r.target_section.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("26 USC 1(a)", "2"), ("26 USC 1(a)", "9999"), ("26 USC 2", "1")]
        );
    }

    #[test]
    fn test_ingest_counts() {
        let doc = parsed();
        let mut graph = MemoryGraph::new();
        let stats = ingest(&doc, &mut graph, 2, false).unwrap();

        assert_eq!(stats.nodes_created, 5);
        assert_eq!(stats.parent_relationships, 4);
        assert_eq!(stats.reference_relationships, 2);
        assert_eq!(stats.references_not_found, 1);
        assert_eq!(stats.unresolved_targets, vec!["26 USC 9999"]);
        assert_eq!(stats.total_nodes, 5);
        assert_eq!(graph.parent_edge_count(), 4);
    }

    #[test]
    fn test_ingest_is_idempotent() {
        let doc = parsed();
        let mut graph = MemoryGraph::new();
        ingest(&doc, &mut graph, 100, false).unwrap();
        let stats = ingest(&doc, &mut graph, 100, false).unwrap();

        assert_eq!(stats.total_nodes, 5);
        assert_eq!(stats.parent_relationships, 0);
        assert_eq!(stats.reference_relationships, 0);
        assert_eq!(graph.reference_edges().len(), 2);
    }

    #[test]
    fn test_ingest_clear_existing() {
        let doc = parsed();
        let mut graph = MemoryGraph::new();
        ingest(&doc, &mut graph, 100, false).unwrap();
        let stats = ingest(&doc, &mut graph, 100, true).unwrap();
        assert_eq!(stats.parent_relationships, 4);
        assert_eq!(stats.reference_relationships, 2);
    }

    #[test]
    fn test_section_with_context() {
        let doc = parsed();
        let mut graph = MemoryGraph::new();
        ingest(&doc, &mut graph, 100, false).unwrap();

        let ctx = graph.section_with_context("26 USC 1(a)").unwrap();
        let ancestors: Vec<_> = ctx.ancestors.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ancestors, vec![doc.root.id.as_str(), "26 USC CHAPTER 1—", "26 USC 1"]);
        assert!(ctx.children.is_empty());
        assert_eq!(ctx.references.len(), 1);
        assert_eq!(ctx.references[0].target, "26 USC 2");

        let section = graph.section_with_context("26 USC 1").unwrap();
        assert_eq!(section.children.len(), 1);
        assert!(graph.section_with_context("26 USC 404").is_none());
    }

    #[test]
    fn test_sections_referencing() {
        let doc = parsed();
        let mut graph = MemoryGraph::new();
        ingest(&doc, &mut graph, 100, false).unwrap();

        let sources: Vec<_> = graph
            .sections_referencing("26 USC 1")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(sources, vec!["26 USC 2"]);
        assert!(graph.sections_referencing("26 USC 9999").is_empty());
    }

    #[test]
    fn test_relationship_counts() {
        let doc = parsed();
        let mut graph = MemoryGraph::new();
        assert_eq!(graph.relationship_counts(), RelationshipCounts::default());

        ingest(&doc, &mut graph, 100, false).unwrap();
        assert_eq!(
            graph.relationship_counts(),
            RelationshipCounts {
                parent_of: 4,
                references: 2,
            }
        );
    }

    #[test]
    fn test_relinked_child_leaves_previous_parent() {
        let doc = parsed();
        let mut graph = MemoryGraph::new();
        ingest(&doc, &mut graph, 100, false).unwrap();

        let moved = graph
            .link_parents(&[("26 USC 2".to_string(), "26 USC 1(a)".to_string())])
            .unwrap();
        assert_eq!(moved, 1);

        let old_parent = graph.section_with_context("26 USC 1").unwrap();
        assert!(old_parent.children.is_empty());
        let new_parent = graph.section_with_context("26 USC 2").unwrap();
        let children: Vec<_> = new_parent.children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, vec!["26 USC 1(a)"]);
        assert_eq!(graph.relationship_counts().parent_of, 4);
    }

    struct FailingStore;

    impl GraphStore for FailingStore {
        fn upsert_nodes(&mut self, _nodes: &[FlatNode]) -> Result<usize> {
            Err(ParserError::GraphStore("connection refused".to_string()))
        }

        fn link_parents(&mut self, _edges: &[(String, String)]) -> Result<usize> {
            Ok(0)
        }

        fn link_references(
            &mut self,
            _code: &str,
            _references: &[(String, Reference)],
        ) -> Result<ReferenceLinks> {
            Ok(ReferenceLinks::default())
        }

        fn node_count(&self) -> usize {
            0
        }

        fn clear(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_store_errors_propagate() {
        let err = ingest(&parsed(), &mut FailingStore, 100, false).unwrap_err();
        assert_eq!(err.to_string(), "Graph store error: connection refused");
    }
}
