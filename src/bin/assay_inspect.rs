//! assay-inspect: Show the nested field structure of a record stream
//!
//! Reads the first few records, describes every top-level field of the first
//! one, and prints the result as a table.
//!
//! Usage:
//!   # Inspect a file (NDJSON or a JSON array)
//!   assay-inspect data.jsonl
//!
//!   # Read from stdin, print the hierarchy as JSON
//!   cat data.jsonl | assay-inspect --json
//!
//!   # List only the selectable field names
//!   assay-inspect --names data.jsonl

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use assay::inspect::{analyze_with, divergent_records, render_table};
use assay::logging::{init_logging, LoggingConfig};
use assay::{InspectConfig, JsonFileSource, RecordSource};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "assay-inspect")]
#[command(about = "Infer the nested field structure of a record stream", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Number of records to sample (default: 5)
    #[arg(long, short = 'n')]
    sample_size: Option<usize>,

    /// Maximum nesting depth to describe (default: 32)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Print the hierarchy as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Print only the top-level field names, one per line
    #[arg(long, conflicts_with = "json")]
    names: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&LoggingConfig::from_verbosity(args.verbose))?;

    let mut config = InspectConfig::default();
    if let Some(n) = args.sample_size {
        config.sample_size = n;
    }
    if let Some(depth) = args.max_depth {
        config.max_depth = depth;
    }

    let source = match &args.input {
        Some(path) => JsonFileSource::from_path(path),
        None => JsonFileSource::stdin(),
    };

    let sample = source
        .sample(config.sample_size)
        .context("Failed to read sample records")?;
    tracing::debug!(records = sample.len(), "Sample loaded");

    if sample.is_empty() {
        eprintln!("Warning: No records found in input");
    }

    let hierarchy = analyze_with(&sample, &config);

    let divergent = divergent_records(&sample, &hierarchy, &config);
    if !divergent.is_empty() {
        tracing::warn!(
            records = ?divergent,
            "Sample records differ in shape from the first; structure may be incomplete"
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hierarchy.to_json())?);
    } else if args.names {
        for name in hierarchy.field_names() {
            println!("{}", name);
        }
    } else {
        print!("{}", render_table(&hierarchy));
    }

    Ok(())
}
