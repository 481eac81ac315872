//! Streaming export of records to JSONL, CSV or a JSON array
//!
//! ## Memory
//!
//! - `Jsonl` and `Csv` write as they pull: one record in memory at a time.
//! - `Json` collects the whole input first and writes one document at the end,
//!   so memory grows with the input. Nothing is written if the input fails
//!   part way.

pub mod writer;

pub use writer::{write_csv, write_json, write_jsonl};

use crate::error::{ExportError, ExportResult};
use crate::types::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;

static HUB_DATASET_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"huggingface\.co/datasets/([^?]*)").unwrap()
});

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One compact JSON object per line, fully streaming
    Jsonl,
    /// Comma-separated values, header from the first record
    Csv,
    /// A single pretty-printed JSON array; buffers every record in memory
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jsonl => "jsonl",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" | "ndjson" => Ok(ExportFormat::Jsonl),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

/// What to do with CSV records carrying keys outside the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtraKeys {
    /// Stop the export with `ExportError::SchemaDrift`
    #[default]
    Fail,
    /// Drop the extra fields and log a warning
    Warn,
}

impl fmt::Display for ExtraKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraKeys::Fail => f.write_str("fail"),
            ExtraKeys::Warn => f.write_str("warn"),
        }
    }
}

/// Configuration for an export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub format: ExportFormat,

    /// CSV schema drift policy
    pub extra_keys: ExtraKeys,

    /// Stop pulling after this many records
    pub limit: Option<usize>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            format: ExportFormat::Jsonl,
            extra_keys: ExtraKeys::Fail,
            limit: None,
        }
    }
}

/// Summary of a finished export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    pub records_written: usize,

    /// CSV header columns; empty for other formats
    pub columns: Vec<String>,
}

/// Export a record stream to a file.
///
/// The parent directory must already exist. For `Csv` the first record is
/// pulled before the file is created; for `Json` the whole input is collected
/// first, so an upstream failure leaves no file behind.
pub fn export_to_path<I, E, P>(records: I, path: P, config: &ExportConfig) -> ExportResult<ExportStats>
where
    I: IntoIterator<Item = Result<Record, E>>,
    ExportError: From<E>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut records = records
        .into_iter()
        .take(config.limit.unwrap_or(usize::MAX));

    tracing::debug!(path = %path.display(), format = %config.format, "Starting export");

    let stats = match config.format {
        ExportFormat::Jsonl => writer::write_jsonl(records, create(path)?)?,
        ExportFormat::Csv => match records.next() {
            None => {
                create(path)?;
                ExportStats::default()
            }
            Some(first) => {
                let first = first?;
                writer::write_csv_from(first, records, create(path)?, config.extra_keys)?
            }
        },
        ExportFormat::Json => {
            let collected = writer::collect_records(records)?;
            writer::write_json_document(&collected, create(path)?)?
        }
    };

    tracing::info!(
        path = %path.display(),
        format = %config.format,
        records = stats.records_written,
        "Export finished"
    );
    Ok(stats)
}

fn create(path: &Path) -> ExportResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Strip a hub dataset URL down to its `owner/name` id
pub fn normalize_dataset_id(input: &str) -> String {
    let input = input.trim();
    match HUB_DATASET_URL.captures(input).and_then(|c| c.get(1)) {
        Some(id) => id.as_str().to_string(),
        None => input.to_string(),
    }
}

/// `data/extracted_<dataset>.<ext>`, with `/` in the dataset name replaced by `_`
pub fn default_output_path(dataset: &str, format: ExportFormat) -> PathBuf {
    let name = normalize_dataset_id(dataset).replace('/', "_");
    Path::new("data").join(format!("extracted_{}.{}", name, format.extension()))
}
