//! Human-readable reports and structured exports of a parsed document.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use textwrap::{fill, Options};

use crate::config::{DETAIL_TEXT_PREVIEW_CHARS, EXPORT_TEXT_PREVIEW_CHARS, TEXT_WRAP_WIDTH};
use crate::error::Result;
use crate::graph::IngestStats;
use crate::types::{LegalNode, NodeStatus, ParsedDocument, ReferenceType};

const RULE_WIDTH: usize = 60;
const MAX_REPEALED_EXAMPLES: usize = 5;
const MAX_HIERARCHY_REFERENCES: usize = 3;

/// Truncate to `max_chars` characters, marking the cut with "...".
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Write document totals, reference counts by type and node counts by type.
pub fn write_statistics(out: &mut impl Write, parsed: &ParsedDocument) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "PARSING STATISTICS")?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "Total nodes parsed: {}", parsed.total_nodes)?;
    writeln!(out, "Total sections parsed: {}", parsed.total_sections)?;
    writeln!(out, "Repealed sections: {}", parsed.repealed_sections.len())?;
    if !parsed.repealed_sections.is_empty() {
        let examples: Vec<&str> = parsed
            .repealed_sections
            .iter()
            .take(MAX_REPEALED_EXAMPLES)
            .map(String::as_str)
            .collect();
        writeln!(out, "  Examples: {}", examples.join(", "))?;
    }
    if !parsed.duplicate_ids.is_empty() {
        writeln!(out, "Duplicate citations: {}", parsed.duplicate_ids.len())?;
    }

    let references = parsed.all_references();
    writeln!(out, "Total cross-references found: {}", references.len())?;
    if !references.is_empty() {
        let mut by_type: HashMap<ReferenceType, usize> = HashMap::new();
        for (_, reference) in &references {
            *by_type.entry(reference.reference_type).or_default() += 1;
        }
        let mut by_type: Vec<_> = by_type.into_iter().collect();
        by_type.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

        writeln!(out, "Reference types:")?;
        for (kind, count) in by_type {
            writeln!(out, "  - {kind}: {count}")?;
        }
    }

    let mut by_node_type: BTreeMap<&str, usize> = BTreeMap::new();
    for node in parsed.root.iter() {
        *by_node_type.entry(node.node_type.as_str()).or_default() += 1;
    }
    writeln!(out)?;
    writeln!(out, "Nodes by type:")?;
    for (node_type, count) in by_node_type {
        writeln!(out, "  - {node_type}: {count}")?;
    }

    Ok(())
}

/// Write an indented outline of the tree down to `max_depth` levels below
/// `node`.
pub fn write_hierarchy(out: &mut impl Write, node: &LegalNode, max_depth: usize) -> Result<()> {
    write_hierarchy_level(out, node, 0, max_depth)
}

fn write_hierarchy_level(
    out: &mut impl Write,
    node: &LegalNode,
    depth: usize,
    max_depth: usize,
) -> Result<()> {
    if depth > max_depth {
        return Ok(());
    }

    let prefix = "  ".repeat(depth);
    let marker = if node.status == NodeStatus::Repealed {
        " [REPEALED]"
    } else {
        ""
    };
    match &node.heading {
        Some(heading) => writeln!(
            out,
            "{prefix}{}: {} - {heading}{marker}",
            node.node_type,
            node.num.as_deref().unwrap_or_default()
        )?,
        None => writeln!(
            out,
            "{prefix}{}: {}{marker}",
            node.node_type,
            node.num.as_deref().unwrap_or(&node.id)
        )?,
    }

    for reference in node.references.iter().take(MAX_HIERARCHY_REFERENCES) {
        writeln!(
            out,
            "{prefix}  -> References: Section {} ({})",
            reference.target_section, reference.reference_type
        )?;
    }

    for child in &node.children {
        write_hierarchy_level(out, child, depth + 1, max_depth)?;
    }

    Ok(())
}

/// Write the full detail view of one node.
pub fn write_section_details(out: &mut impl Write, node: &LegalNode) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "SECTION: {}", node.id)?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "Heading: {}", node.heading.as_deref().unwrap_or("(none)"))?;
    writeln!(out, "Path: {}", node.hierarchical_path)?;
    writeln!(out, "Status: {}", node.status)?;

    if !node.text.is_empty() {
        let text = preview(&node.text, DETAIL_TEXT_PREVIEW_CHARS);
        writeln!(out)?;
        writeln!(out, "Text:")?;
        writeln!(out, "{}", fill(&text, Options::new(TEXT_WRAP_WIDTH)))?;
    }

    if !node.references.is_empty() {
        writeln!(out)?;
        writeln!(out, "Cross-references ({}):", node.references.len())?;
        for reference in &node.references {
            writeln!(
                out,
                "  - Section {} ({})",
                reference.target_section, reference.reference_type
            )?;
            writeln!(out, "    Context: {}", reference.context)?;
        }
    }

    if !node.children.is_empty() {
        writeln!(out)?;
        writeln!(out, "Subsections ({}):", node.children.len())?;
        for child in &node.children {
            writeln!(
                out,
                "  - {}: {}",
                child.num.as_deref().unwrap_or(&child.id),
                child.heading.as_deref().unwrap_or("(no heading)")
            )?;
        }
    }

    Ok(())
}

/// Write a graph ingestion summary.
pub fn write_ingest_stats(
    out: &mut impl Write,
    stats: &IngestStats,
    show_unresolved: bool,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "GRAPH INGESTION")?;
    writeln!(out, "{}", rule())?;
    writeln!(out, "Nodes created: {}", stats.nodes_created)?;
    writeln!(out, "Parent relationships: {}", stats.parent_relationships)?;
    writeln!(out, "Reference relationships: {}", stats.reference_relationships)?;
    writeln!(out, "References not found: {}", stats.references_not_found)?;
    writeln!(out, "Total nodes in graph: {}", stats.total_nodes)?;

    if show_unresolved && !stats.unresolved_targets.is_empty() {
        writeln!(out)?;
        writeln!(out, "Unresolved targets ({}):", stats.unresolved_targets.len())?;
        for target in &stats.unresolved_targets {
            writeln!(out, "  - {target}")?;
        }
    }

    Ok(())
}

/// Reference representation for export.
#[derive(Debug, Serialize)]
struct ExportReference<'a> {
    target: &'a str,
    #[serde(rename = "type")]
    reference_type: ReferenceType,
}

/// Node representation for export.
#[derive(Debug, Serialize)]
struct ExportNode<'a> {
    id: &'a str,
    identifier: &'a str,
    #[serde(rename = "type")]
    node_type: &'static str,
    num: Option<&'a str>,
    heading: Option<&'a str>,
    text: String,
    status: NodeStatus,
    hierarchical_path: &'a str,
    references: Vec<ExportReference<'a>>,
    children: Vec<ExportNode<'a>>,
}

impl<'a> From<&'a LegalNode> for ExportNode<'a> {
    fn from(node: &'a LegalNode) -> Self {
        Self {
            id: &node.id,
            identifier: &node.identifier,
            node_type: node.node_type.as_str(),
            num: node.num.as_deref(),
            heading: node.heading.as_deref(),
            text: preview(&node.text, EXPORT_TEXT_PREVIEW_CHARS),
            status: node.status,
            hierarchical_path: &node.hierarchical_path,
            references: node
                .references
                .iter()
                .map(|r| ExportReference {
                    target: &r.target_section,
                    reference_type: r.reference_type,
                })
                .collect(),
            children: node.children.iter().map(ExportNode::from).collect(),
        }
    }
}

/// Document representation for export.
#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    title: &'a str,
    code: &'a str,
    total_sections: usize,
    total_nodes: usize,
    repealed_sections: &'a [String],
    root: ExportNode<'a>,
}

impl<'a> From<&'a ParsedDocument> for ExportDocument<'a> {
    fn from(parsed: &'a ParsedDocument) -> Self {
        Self {
            title: &parsed.title,
            code: &parsed.code,
            total_sections: parsed.total_sections,
            total_nodes: parsed.total_nodes,
            repealed_sections: &parsed.repealed_sections,
            root: ExportNode::from(&parsed.root),
        }
    }
}

/// Write `content` next to `path` first, then rename into place.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_file = path.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_file, path)?;
    Ok(())
}

/// Export the document as pretty-printed JSON.
///
/// # Errors
/// Returns an error when serialization or the file write fails.
pub fn export_json(parsed: &ParsedDocument, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(&ExportDocument::from(parsed))?;
    write_atomic(path, &content)?;
    tracing::info!(path = %path.display(), "Exported JSON");
    Ok(())
}

/// Export the document as YAML.
///
/// # Errors
/// Returns an error when serialization or the file write fails.
pub fn export_yaml(parsed: &ParsedDocument, path: &Path) -> Result<()> {
    let content = serde_yaml_ng::to_string(&ExportDocument::from(parsed))?;
    write_atomic(path, &content)?;
    tracing::info!(path = %path.display(), "Exported YAML");
    Ok(())
}
