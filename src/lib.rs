//! # Assay - Dataset Inspection and Field Extraction
//!
//! Looks at the head of a record stream to show its nested structure, then
//! pulls a chosen set of (possibly nested) fields out of every record and
//! streams them to JSONL, CSV or a JSON array.
//!
//! ## Modules
//!
//! - **inspect**: infer a type hierarchy from a small sample and render it
//! - **extractor**: select and rename fields by dotted path, lazily
//! - **export**: write the extracted stream in one of several formats
//! - **source**: read records from NDJSON or JSON array documents
//!
//! ## Quick Start
//!
//! ```rust
//! use assay::{analyze, FieldMap, PathExtractor};
//! use serde_json::json;
//!
//! let sample = vec![json!({"a": 1, "b": {"c": "x"}}).as_object().unwrap().clone()];
//!
//! let hierarchy = analyze(&sample);
//! assert_eq!(hierarchy.to_json(), json!({"a": "int", "b": {"c": "str"}}));
//!
//! let mut fields = FieldMap::new();
//! fields.insert("b.c", "out").unwrap();
//! let extractor = PathExtractor::new(fields);
//! assert_eq!(extractor.extract_one(&sample[0]).get("out"), Some(&json!("x")));
//! ```

use std::path::Path;

pub mod error;
pub mod export;
pub mod extractor;
pub mod inspect;
pub mod logging;
pub mod source;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{ExportError, FieldMapError, SourceError};
pub use export::{export_to_path, ExportConfig, ExportFormat, ExportStats, ExtraKeys};
pub use extractor::PathExtractor;
pub use inspect::{analyze, analyze_with, render_table, Hierarchy};
pub use source::{JsonFileSource, MemorySource, RecordSource};
pub use types::{FieldMap, FieldPath, InspectConfig, Kind, Record, TypeDescriptor};

/// Main entry point: extract `fields` from every record of `source` into `path`.
///
/// An empty field selection skips the export and returns `None`.
pub fn extract_to_path<S, P>(
    source: S,
    fields: FieldMap,
    path: P,
    config: &ExportConfig,
) -> Result<Option<ExportStats>, ExportError>
where
    S: RecordSource,
    P: AsRef<Path>,
{
    if fields.is_empty() {
        tracing::info!("No fields selected, skipping export");
        return Ok(None);
    }

    let extractor = PathExtractor::new(fields);
    let records = source.records()?;
    let stats = export_to_path(extractor.extract(records), path, config)?;

    Ok(Some(stats))
}
