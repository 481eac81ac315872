//! assay-extract: Pull selected fields out of a record stream and export them
//!
//! Fields are chosen by dotted path and may be renamed with `path=name`.
//!
//! Usage:
//!   # Keep two fields, rename a nested one, write JSONL
//!   assay-extract data.jsonl -f text -f meta.id=id -o out.jsonl
//!
//!   # Write CSV to the default path data/extracted_<dataset>.csv
//!   assay-extract data.jsonl --dataset tatsu-lab/alpaca -f instruction --format csv
//!
//!   # Keep every top-level field seen in the sample, show the structure first
//!   cat data.jsonl | assay-extract --all --show-structure -o all.json --format json

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use assay::export::default_output_path;
use assay::inspect::{analyze, render_table};
use assay::logging::{init_logging, LoggingConfig};
use assay::source::{take_sample, RecordStream};
use assay::{
    export_to_path, ExportConfig, ExportFormat, ExtraKeys, FieldMap, JsonFileSource, PathExtractor,
    RecordSource,
};
use clap::Parser;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "assay-extract")]
#[command(about = "Select, rename and export fields from a record stream", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Field to keep, as `path` or `path=new_name` (repeatable)
    #[arg(long = "field", short = 'f', value_name = "PATH[=NAME]")]
    fields: Vec<String>,

    /// JSON file with an object of `path -> new_name`, applied before --field
    #[arg(long, value_name = "FILE")]
    fields_file: Option<PathBuf>,

    /// Keep every top-level field of the first sampled record
    #[arg(long)]
    all: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = ExportFormat::Jsonl)]
    format: ExportFormat,

    /// Output path (default: data/extracted_<dataset>.<ext>)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Dataset name used for the default output path
    #[arg(long)]
    dataset: Option<String>,

    /// How CSV export treats records with fields outside the header
    #[arg(long, value_enum, default_value_t = ExtraKeys::Fail)]
    on_extra_keys: ExtraKeys,

    /// Stop after this many records
    #[arg(long)]
    limit: Option<usize>,

    /// Print the inferred structure to stderr before exporting
    #[arg(long)]
    show_structure: bool,

    /// Number of records sampled for --all and --show-structure (default: 5)
    #[arg(long)]
    sample_size: Option<usize>,

    /// Print export statistics as JSON to stdout
    #[arg(long)]
    print_stats: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&LoggingConfig::from_verbosity(args.verbose))?;

    let source = match &args.input {
        Some(path) => JsonFileSource::from_path(path),
        None => JsonFileSource::stdin(),
    };
    let mut stream = source.records().context("Failed to open input")?;

    // Sampled records are put back in front of the stream, so stdin is read once
    let sample = if args.all || args.show_structure {
        let sample_size = args.sample_size.unwrap_or(5);
        take_sample(stream.by_ref(), sample_size).context("Failed to read sample records")?
    } else {
        Vec::new()
    };
    let hierarchy = analyze(&sample);

    if args.show_structure {
        eprint!("{}", render_table(&hierarchy));
    }

    let fields = build_field_map(&args, &hierarchy.field_names())?;
    if fields.is_empty() {
        eprintln!("No fields selected. Exiting.");
        return Ok(());
    }

    let output = match &args.output {
        Some(path) => path.clone(),
        None => default_output_path(&dataset_name(&args), args.format),
    };
    ensure_parent_dir(&output)?;

    let config = ExportConfig {
        format: args.format,
        extra_keys: args.on_extra_keys,
        limit: args.limit,
    };

    let records: RecordStream = Box::new(sample.into_iter().map(Ok).chain(stream));
    let extractor = PathExtractor::new(fields);

    eprintln!("Extracting data to {}...", output.display());
    let stats = export_to_path(extractor.extract(records), &output, &config)
        .with_context(|| format!("Export to {} failed", output.display()))?;
    eprintln!("Success! {} records saved to {}", stats.records_written, output.display());

    if args.print_stats {
        println!("{}", serde_json::to_string(&stats)?);
    }

    Ok(())
}

/// Selection order: --all, then --fields-file, then each --field
fn build_field_map(args: &Args, available: &[String]) -> Result<FieldMap> {
    let mut fields = if args.all {
        FieldMap::identity(available)?
    } else {
        FieldMap::new()
    };

    if let Some(path) = &args.fields_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fields file: {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse fields file: {}", path.display()))?;
        for (source_path, target) in FieldMap::from_json_object(&value)?.iter() {
            fields.insert(source_path.as_str(), target)?;
        }
    }

    for spec in &args.fields {
        let (path, target) = FieldMap::parse_pair(spec)?;
        fields.insert(&path, &target)?;
    }

    Ok(fields)
}

fn dataset_name(args: &Args) -> String {
    if let Some(name) = &args.dataset {
        return name.clone();
    }

    args.input
        .as_deref()
        .and_then(|input| Path::new(input).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stdin".to_string())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
    }
    Ok(())
}
