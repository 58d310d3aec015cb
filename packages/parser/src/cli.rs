//! Command-line interface for the parser.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{ParserConfig, DEFAULT_BATCH_SIZE};
use crate::error::{ParserError, Result};
use crate::graph::{ingest, MemoryGraph};
use crate::parser::parse_file;
use crate::report::{
    export_json, export_yaml, write_hierarchy, write_ingest_stats, write_section_details,
    write_statistics,
};
use crate::types::ParsedDocument;

/// Taxgraph Parser - Convert USLM legal code XML into a citation tree.
#[derive(Parser)]
#[command(name = "taxgraph-parser")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Export format for `parse --output`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a USLM XML file and print statistics.
    Parse {
        /// Path to the USLM XML file (e.g., usc26.xml)
        xml_path: PathBuf,

        /// Stop after this many sections (default: all)
        #[arg(short, long)]
        max_sections: Option<usize>,

        /// Export the parsed tree to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Print the node hierarchy
        #[arg(long)]
        show_hierarchy: bool,

        /// Maximum depth of the printed hierarchy
        #[arg(long, default_value_t = 4)]
        max_depth: usize,

        /// Print details for a section number (e.g., 162)
        #[arg(long)]
        show_section: Option<String>,
    },

    /// Parse a USLM XML file and load it into an in-memory graph.
    Graph {
        /// Path to the USLM XML file (e.g., usc26.xml)
        xml_path: PathBuf,

        /// Stop after this many sections (default: all)
        #[arg(short, long)]
        max_sections: Option<usize>,

        /// Number of records written per batch
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// List reference targets that were not found
        #[arg(long)]
        show_unresolved: bool,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            xml_path,
            max_sections,
            output,
            format,
            show_hierarchy,
            max_depth,
            show_section,
        } => parse_command(
            &xml_path,
            max_sections,
            output.as_deref(),
            format,
            show_hierarchy.then_some(max_depth),
            show_section.as_deref(),
        ),
        Commands::Graph {
            xml_path,
            max_sections,
            batch_size,
            show_unresolved,
        } => graph_command(&xml_path, max_sections, batch_size, show_unresolved),
    }
}

/// Parse with a spinner on stderr.
fn parse_with_progress(xml_path: &Path, max_sections: Option<usize>) -> Result<ParsedDocument> {
    let config = ParserConfig::new().with_max_sections(max_sections);
    // Validate before touching the file
    config.validate()?;

    println!("{} {}", style("Parsing").bold(), style(xml_path.display()).cyan());
    match max_sections {
        Some(max) => println!("  Max sections: {}", style(max).green()),
        None => println!("  Max sections: {}", style("all").green()),
    }

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Parsing XML...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let parsed = parse_file(xml_path, &config);
    pb.finish_and_clear();
    parsed
}

/// Execute the parse command.
fn parse_command(
    xml_path: &Path,
    max_sections: Option<usize>,
    output: Option<&Path>,
    format: ExportFormat,
    hierarchy_depth: Option<usize>,
    show_section: Option<&str>,
) -> Result<()> {
    let parsed = parse_with_progress(xml_path, max_sections)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    write_statistics(&mut out, &parsed)?;
    if !parsed.duplicate_ids.is_empty() {
        writeln!(
            out,
            "  {} duplicate citations found, run with RUST_LOG=warn for details",
            style("Warning:").yellow().bold()
        )?;
    }

    if let Some(max_depth) = hierarchy_depth {
        writeln!(out)?;
        writeln!(out, "{}", style("HIERARCHY").bold())?;
        write_hierarchy(&mut out, &parsed.root, max_depth)?;
    }

    if let Some(section_num) = show_section {
        let section = parsed
            .get_section(section_num)
            .ok_or_else(|| ParserError::SectionNotFound(section_num.to_string()))?;
        write_section_details(&mut out, section)?;
    }

    if let Some(output_path) = output {
        match format {
            ExportFormat::Json => export_json(&parsed, output_path)?,
            ExportFormat::Yaml => export_yaml(&parsed, output_path)?,
        }
        writeln!(out)?;
        writeln!(
            out,
            "{} {}",
            style("Exported to:").green().bold(),
            output_path.display()
        )?;
    }

    Ok(())
}

/// Execute the graph command.
fn graph_command(
    xml_path: &Path,
    max_sections: Option<usize>,
    batch_size: usize,
    show_unresolved: bool,
) -> Result<()> {
    let parsed = parse_with_progress(xml_path, max_sections)?;

    let mut graph = MemoryGraph::new();
    let stats = ingest(&parsed, &mut graph, batch_size, true)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_ingest_stats(&mut out, &stats, show_unresolved)?;

    Ok(())
}
