//! Conversion of embedded tables to a pipe-delimited row/column block.
//!
//! ```text
//! | Taxable income | Tax |
//! | --- | --- |
//! | Not over $19,050 | 10% of taxable income |
//! ```

use roxmltree::Node;

use crate::xml::{collect_text, element_children, get_tag_name, has_tag};

/// Escape pipes so cell content cannot be read as a column delimiter.
fn escape_cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Check that `row` belongs to `table` and not to a table nested inside it.
fn owned_by<'a, 'input>(row: Node<'a, 'input>, table: Node<'a, 'input>) -> bool {
    row.ancestors()
        .skip(1)
        .find(|a| has_tag(*a, "table"))
        .is_some_and(|nearest| nearest == table)
}

fn collect_rows(table: Node<'_, '_>) -> Vec<Vec<String>> {
    table
        .descendants()
        .filter(|n| has_tag(*n, "tr") && owned_by(*n, table))
        .map(|tr| {
            element_children(tr)
                .filter(|cell| matches!(get_tag_name(*cell), "th" | "td"))
                .map(|cell| escape_cell(&collect_text(cell)))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn render_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

/// Render a table element as a pipe-delimited block.
///
/// The first row becomes the header line, followed by a `---` separator
/// line and the remaining rows. Rows are right-padded with empty cells to
/// the widest row so every rendered line has the same column count. Returns
/// an empty string for a table without cells.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use taxgraph_parser::text::table_to_text;
///
/// let xml = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td></tr></table>";
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(
///     table_to_text(doc.root_element()),
///     "| A | B |\n| --- | --- |\n| 1 |  |"
/// );
/// ```
pub fn table_to_text(table: Node<'_, '_>) -> String {
    let mut rows = collect_rows(table);
    let Some(width) = rows.iter().map(Vec::len).max() else {
        return String::new();
    };

    for row in &mut rows {
        row.resize(width, String::new());
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    let mut iter = rows.iter();
    if let Some(header) = iter.next() {
        lines.push(render_row(header));
        lines.push(render_row(&vec!["---".to_string(); width]));
    }
    lines.extend(iter.map(|row| render_row(row)));

    lines.join("\n")
}
