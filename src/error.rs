//! Error types for reading, selecting and exporting records

use std::io;
use std::path::PathBuf;

/// Failure while pulling records from a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse JSON at record {index}: {source}")]
    Parse {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse JSON document: {0}")]
    Document(#[from] simd_json::Error),

    #[error("Record {index} is not a JSON object (found {found})")]
    NotARecord { index: usize, found: &'static str },
}

/// Invalid field selection
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldMapError {
    #[error("Field path must not be empty")]
    EmptyPath,

    #[error("Target name for '{path}' must not be empty")]
    EmptyTarget { path: String },

    #[error("Field selection must be a JSON object of path -> target")]
    NotAnObject,

    #[error("Target for '{path}' must be a string")]
    TargetNotString { path: String },
}

/// Failure while exporting records to a destination
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to open destination {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record {record} has fields not in the CSV header: {}", keys.join(", "))]
    SchemaDrift { record: usize, keys: Vec<String> },

    #[error("Record source failed: {0}")]
    Upstream(#[from] SourceError),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;
