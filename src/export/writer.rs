//! Format writers
//!
//! Each writer pulls records from an iterator and writes them to any
//! `io::Write`. On failure, whatever was already written is flushed before the
//! error is returned, so line-delimited and CSV outputs are left truncated but
//! consistent.

use crate::error::{ExportError, ExportResult};
use crate::export::{ExportStats, ExtraKeys};
use crate::types::Record;
use serde_json::Value;
use std::io::Write;

/// Write one compact JSON object per line. Holds one record at a time.
pub fn write_jsonl<W, I, E>(records: I, mut writer: W) -> ExportResult<ExportStats>
where
    W: Write,
    I: IntoIterator<Item = Result<Record, E>>,
    ExportError: From<E>,
{
    let mut stats = ExportStats::default();

    let result = (|| -> ExportResult<()> {
        for record in records {
            let record = record?;
            serde_json::to_writer(&mut writer, &record)?;
            writer.write_all(b"\n")?;
            stats.records_written += 1;
        }
        Ok(())
    })();

    finish(result, || writer.flush().map_err(ExportError::Io))?;
    Ok(stats)
}

/// Write records as CSV with a header taken from the first record's keys.
///
/// Nothing at all is written for an empty input. Later records missing a
/// header column get an empty cell; keys outside the header are handled by
/// `extra_keys`.
pub fn write_csv<W, I, E>(records: I, writer: W, extra_keys: ExtraKeys) -> ExportResult<ExportStats>
where
    W: Write,
    I: IntoIterator<Item = Result<Record, E>>,
    ExportError: From<E>,
{
    let mut records = records.into_iter();
    match records.next() {
        None => Ok(ExportStats::default()),
        Some(first) => write_csv_from(first?, records, writer, extra_keys),
    }
}

/// CSV body once the first record has been pulled
pub(crate) fn write_csv_from<W, I, E>(
    first: Record,
    rest: I,
    writer: W,
    extra_keys: ExtraKeys,
) -> ExportResult<ExportStats>
where
    W: Write,
    I: Iterator<Item = Result<Record, E>>,
    ExportError: From<E>,
{
    let columns: Vec<String> = first.keys().cloned().collect();
    let mut stats = ExportStats {
        records_written: 0,
        columns: columns.clone(),
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    let result = (|| -> ExportResult<()> {
        csv_writer.write_record(&columns)?;
        csv_writer.write_record(row(&first, &columns))?;
        stats.records_written += 1;

        for (index, record) in rest.enumerate() {
            let record = record?;
            // the first record is index 0
            let index = index + 1;

            let extra: Vec<String> = record
                .keys()
                .filter(|k| !columns.contains(k))
                .cloned()
                .collect();
            if !extra.is_empty() {
                match extra_keys {
                    ExtraKeys::Fail => {
                        return Err(ExportError::SchemaDrift { record: index, keys: extra });
                    }
                    ExtraKeys::Warn => {
                        tracing::warn!(
                            record = index,
                            keys = ?extra,
                            "Dropping fields not present in the CSV header"
                        );
                    }
                }
            }

            csv_writer.write_record(row(&record, &columns))?;
            stats.records_written += 1;
        }
        Ok(())
    })();

    finish(result, || csv_writer.flush().map_err(ExportError::Io))?;
    Ok(stats)
}

/// Write all records as one pretty-printed JSON array.
///
/// The whole input is collected in memory before anything is written, so
/// memory use grows with the number of records.
pub fn write_json<W, I, E>(records: I, writer: W) -> ExportResult<ExportStats>
where
    W: Write,
    I: IntoIterator<Item = Result<Record, E>>,
    ExportError: From<E>,
{
    let records = collect_records(records)?;
    write_json_document(&records, writer)
}

pub(crate) fn collect_records<I, E>(records: I) -> ExportResult<Vec<Record>>
where
    I: IntoIterator<Item = Result<Record, E>>,
    ExportError: From<E>,
{
    records
        .into_iter()
        .map(|r| r.map_err(ExportError::from))
        .collect()
}

pub(crate) fn write_json_document<W: Write>(records: &[Record], mut writer: W) -> ExportResult<ExportStats> {
    let result = serde_json::to_writer_pretty(&mut writer, records).map_err(ExportError::from);
    finish(result, || writer.flush().map_err(ExportError::from))?;

    Ok(ExportStats {
        records_written: records.len(),
        columns: Vec::new(),
    })
}

/// Render one CSV row in header order
fn row(record: &Record, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|col| record.get(col).map(cell).unwrap_or_default())
        .collect()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flush after the body ran; a body error wins over a flush error
fn finish<F>(result: ExportResult<()>, flush: F) -> ExportResult<()>
where
    F: FnOnce() -> ExportResult<()>,
{
    match result {
        Ok(()) => flush(),
        Err(e) => {
            if let Err(flush_err) = flush() {
                tracing::debug!(error = %flush_err, "Flush after failed export also failed");
            }
            Err(e)
        }
    }
}
