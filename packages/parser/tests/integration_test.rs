//! End-to-end integration tests for the parser pipeline.
//!
//! Tests the complete pipeline from USLM XML to the citation tree, the
//! graph export and the structured exports, using a trimmed Title 26
//! fixture.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use taxgraph_parser::graph::{extract_parent_relationships, ingest, MemoryGraph};
use taxgraph_parser::report::export_json;
use taxgraph_parser::{
    parse_file, parse_str, parse_tax_code, NodeStatus, NodeType, ParsedDocument, ParserConfig,
    ParserError, ReferenceType,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn parse_fixture(max_sections: Option<usize>) -> ParsedDocument {
    parse_tax_code(&fixture_path("sample_usc26.xml"), max_sections)
        .unwrap_or_else(|e| panic!("Failed to parse fixture: {e}"))
}

#[test]
fn test_fixture_totals() {
    let parsed = parse_fixture(None);

    assert_eq!(parsed.total_nodes, 9);
    assert_eq!(parsed.total_sections, 3);
    assert_eq!(parsed.repealed_sections, vec!["26 USC 3"]);
    assert!(parsed.duplicate_ids.is_empty());
    assert_eq!(parsed.skipped_deep_elements, 0);
    assert_eq!(parsed.total_nodes, parsed.root.iter().count());
}

#[test]
fn test_fixture_root_is_main_title() {
    let parsed = parse_fixture(None);

    assert_eq!(parsed.root.node_type, NodeType::Title);
    assert_eq!(parsed.root.identifier, "/us/usc/t26");
    assert_eq!(parsed.root.heading.as_deref(), Some("INTERNAL REVENUE CODE"));
    assert_eq!(parsed.root.parent_id, None);
}

#[test]
fn test_fixture_citations_and_paths() {
    let parsed = parse_fixture(None);

    let ids: Vec<&str> = parsed.sections().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["26 USC 1", "26 USC 2", "26 USC 3"]);

    let section = parsed.get_section("1").unwrap();
    let child_ids: Vec<&str> = section.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(child_ids, vec!["26 USC 1(a)", "26 USC 1(b)"]);
    assert_eq!(
        section.hierarchical_path,
        "Title: INTERNAL REVENUE CODE > Subtitle: Income Taxes > \
         Chapter: NORMAL TAXES AND SURTAXES > Section: Tax imposed"
    );

    for node in parsed.root.iter().skip(1) {
        let parent_id = node.parent_id.as_deref().unwrap();
        let parent = parsed.root.find_by_id(parent_id).unwrap();
        assert!(parent.children.iter().any(|c| c.id == node.id));
    }
}

#[test]
fn test_fixture_text_and_table() {
    let parsed = parse_fixture(None);

    let married = parsed.root.find_by_id("26 USC 1(a)").unwrap();
    assert!(married
        .text
        .starts_with("There is hereby imposed on the taxable income of every married individual"));
    assert!(married.text.contains("| If taxable income is: | The tax is: |"));
    assert!(married.text.contains("| --- | --- |"));
    assert!(married.text.contains("| Not over $36,900 | 15% of taxable income. |"));

    let heads = parsed.root.find_by_id("26 USC 1(b)").unwrap();
    assert_eq!(
        heads.text,
        "Subject to section 2, there is hereby imposed a tax & surtax."
    );
}

#[test]
fn test_fixture_references() {
    let parsed = parse_fixture(None);

    let married = parsed.root.find_by_id("26 USC 1(a)").unwrap();
    assert_eq!(married.references.len(), 1);
    assert_eq!(married.references[0].target_section, "7703");
    assert_eq!(married.references[0].reference_type, ReferenceType::Definition);

    let definitions = parsed.root.find_by_id("26 USC 2(a)").unwrap();
    let refs: Vec<(&str, ReferenceType)> = definitions
        .references
        .iter()
        .map(|r| (r.target_section.as_str(), r.reference_type))
        .collect();
    assert_eq!(
        refs,
        vec![
            ("3", ReferenceType::Exception),
            ("151", ReferenceType::General),
            ("152", ReferenceType::General),
            ("1", ReferenceType::General),
        ]
    );

    assert_eq!(parsed.all_references().len(), 6);
}

#[test]
fn test_fixture_status() {
    let parsed = parse_fixture(None);

    assert_eq!(parsed.get_section("3").unwrap().status, NodeStatus::Repealed);
    assert_eq!(parsed.get_section("1").unwrap().status, NodeStatus::Active);
}

#[test]
fn test_section_cutoff_is_a_prefix() {
    let full = parse_fixture(None);

    for k in 1..=4 {
        let parsed = parse_fixture(Some(k));
        assert_eq!(parsed.total_sections, k.min(3));

        let expected: Vec<&str> = full
            .sections()
            .iter()
            .take(k)
            .map(|n| n.id.as_str())
            .collect();
        let actual: Vec<&str> = parsed.sections().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(actual, expected);
    }

    let one = parse_fixture(Some(1));
    assert_eq!(one.total_nodes, 4);
    assert!(one.get_section("1").unwrap().children.is_empty());

    let two = parse_fixture(Some(2));
    assert_eq!(two.get_section("1").unwrap().children.len(), 2);
    assert!(two.get_section("2").unwrap().children.is_empty());
}

#[test]
fn test_zero_cutoff_rejected() {
    let err = parse_tax_code(&fixture_path("sample_usc26.xml"), Some(0)).unwrap_err();
    assert!(matches!(err, ParserError::InvalidMaxSections(0)));
}

#[test]
fn test_parse_is_deterministic() {
    let first = parse_fixture(None);
    let second = parse_fixture(None);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_minimal_chapter_end_to_end() {
    let xml = r#"<chapter identifier="/us/usc/t26/stA/ch1">
        <section identifier="/us/usc/t26/s1">
            <subsection identifier="/us/usc/t26/s1/a">
                <content>Amounts referencing section 162 are deductible.</content>
            </subsection>
        </section>
    </chapter>"#;
    let parsed = parse_str(xml, &ParserConfig::new()).unwrap();

    assert_eq!(parsed.total_nodes, 3);
    assert_eq!(extract_parent_relationships(&parsed.root).len(), 2);

    let refs = parsed.all_references();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].0, "26 USC 1(a)");
    assert_eq!(refs[0].1.target_section, "162");
    assert_eq!(refs[0].1.reference_type, ReferenceType::General);
}

#[test]
fn test_graph_ingest_fixture() {
    let parsed = parse_fixture(None);
    let mut graph = MemoryGraph::new();
    let stats = ingest(&parsed, &mut graph, 4, true).unwrap();

    assert_eq!(stats.nodes_created, 9);
    assert_eq!(stats.parent_relationships, 8);
    assert_eq!(stats.reference_relationships, 3);
    assert_eq!(stats.references_not_found, 3);
    assert_eq!(
        stats.unresolved_targets,
        vec!["26 USC 7703", "26 USC 151", "26 USC 152"]
    );

    let referencing: Vec<&str> = graph
        .sections_referencing("26 USC 1")
        .iter()
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(referencing, vec!["26 USC 2(a)"]);

    let context = graph.section_with_context("26 USC 2(a)").unwrap();
    assert_eq!(context.ancestors.len(), 4);
    assert_eq!(context.references.len(), 2);
}

#[test]
fn test_export_json_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usc26.json");
    export_json(&parse_fixture(None), &path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["total_nodes"], 9);
    assert_eq!(value["root"]["type"], "title");
    assert_eq!(value["root"]["children"][0]["type"], "subtitle");
}

#[test]
fn test_missing_file() {
    let err = parse_file(Path::new("does/not/exist.xml"), &ParserConfig::new()).unwrap_err();
    assert!(matches!(err, ParserError::FileNotFound(_)));
}

#[test]
fn test_document_without_title() {
    let err = parse_str(
        r#"<uscDoc xmlns="http://xml.house.gov/schemas/uslm/1.0"><main/></uscDoc>"#,
        &ParserConfig::new(),
    )
    .unwrap_err();
    assert!(matches!(err, ParserError::MissingRootElement { .. }));
}
