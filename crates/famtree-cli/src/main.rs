//! Family tree export CLI.
//!
//! Provides the `famtree-export` binary, which reads the hand-authored YAML
//! family tree under a project directory and writes the browsing client's
//! SQLite database next to it. Every argument has a default, so running the
//! binary from the project root with no arguments performs the standard
//! build.
//!
//! A failed run may leave a partial database behind; delete it before
//! retrying (the next successful run replaces it anyway).

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use famtree_core::{Anchor, AttributeCatalog, YamlFileSource};
use famtree_storage::{export_from_source, ExportOptions, StorageError, DEFAULT_ANCHOR_ID, DEFAULT_LOCALE};

/// Key of the node the browsing client opens on.
const DEFAULT_ANCHOR_KEY: &str = "(Sofía Cristina Chaves Chen,1995)";

/// Builds the family browser database from a YAML family tree.
#[derive(Parser)]
#[command(name = "famtree-export", about = "Export a YAML family tree to the family browser database")]
struct Cli {
    /// Directory the input and output paths are relative to.
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Family tree YAML file.
    #[arg(short, long, default_value = "familyTree.yaml")]
    input: PathBuf,

    /// Database file to (re)create.
    #[arg(short, long, default_value = "familyTree.db")]
    output: PathBuf,

    /// Key of the node that receives the anchor id.
    #[arg(long, default_value = DEFAULT_ANCHOR_KEY)]
    anchor_key: String,

    /// Identifier given to the anchor node.
    #[arg(long, default_value_t = DEFAULT_ANCHOR_ID, allow_negative_numbers = true)]
    anchor_id: i64,

    /// Locale row written to the metadata table.
    #[arg(long, default_value = DEFAULT_LOCALE)]
    locale: String,
}

fn main() {
    // Logs go to stderr; stdout carries the JSON summary.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    process::exit(run_export(cli));
}

/// Execute the export.
///
/// Returns exit code: 0 = success, 1 = input or graph error,
/// 3 = storage or I/O error.
fn run_export(cli: Cli) -> i32 {
    let input = cli.project_dir.join(&cli.input);
    let output = cli.project_dir.join(&cli.output);

    let mut options = ExportOptions::new(output, Anchor::new(cli.anchor_key, cli.anchor_id));
    options.locale = cli.locale;

    let source = YamlFileSource::new(input);
    let catalog = AttributeCatalog::standard();

    match export_from_source(&source, &catalog, &options) {
        Ok(summary) => {
            // Print ExportSummary as JSON to stdout for machine-readable output
            let json = serde_json::to_string_pretty(&summary).unwrap_or_else(|e| {
                format!("{{\"error\": \"failed to serialize summary: {}\"}}", e)
            });
            println!("{}", json);
            0
        }
        Err(StorageError::Graph(e)) => {
            eprintln!("Error: {}", e);
            1
        }
        Err(e) => {
            eprintln!("Storage error: {}", e);
            eprintln!(
                "'{}' is incomplete and must be deleted",
                options.output.display()
            );
            3
        }
    }
}
