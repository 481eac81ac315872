//! Record sources
//!
//! A source yields a bounded sample for inspection and a full lazy stream for
//! export. `JsonFileSource` reads newline-delimited JSON line by line, or a
//! whole JSON array document when the input starts with `[`.

use crate::error::SourceError;
use crate::types::Record;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

/// Lazy, non-restartable stream of records
pub type RecordStream = Box<dyn Iterator<Item = Result<Record, SourceError>>>;

/// Access to a dataset's records
pub trait RecordSource {
    /// Up to `n` records from the head of the stream
    fn sample(&self, n: usize) -> Result<Vec<Record>, SourceError>;

    /// The full stream, consumed once
    fn records(self) -> Result<RecordStream, SourceError>;
}

/// Pull at most `n` records from a stream; a short stream is not an error
pub fn take_sample<I>(records: I, n: usize) -> Result<Vec<Record>, SourceError>
where
    I: IntoIterator<Item = Result<Record, SourceError>>,
{
    records.into_iter().take(n).collect()
}

/// Where a file source reads from
#[derive(Debug, Clone)]
pub enum Input {
    Path(PathBuf),
    Stdin,
}

/// Records stored as JSON on disk or piped through stdin
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    input: Input,
}

impl JsonFileSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        JsonFileSource {
            input: Input::Path(path.as_ref().to_path_buf()),
        }
    }

    pub fn stdin() -> Self {
        JsonFileSource { input: Input::Stdin }
    }

    fn open(&self) -> Result<Box<dyn BufRead>, SourceError> {
        match &self.input {
            Input::Path(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            Input::Stdin => Ok(Box::new(BufReader::new(std::io::stdin()))),
        }
    }
}

impl RecordSource for JsonFileSource {
    fn sample(&self, n: usize) -> Result<Vec<Record>, SourceError> {
        take_sample(stream_from_reader(self.open()?)?, n)
    }

    fn records(self) -> Result<RecordStream, SourceError> {
        stream_from_reader(self.open()?)
    }
}

/// Decide between array document and NDJSON by the first non-blank byte
pub fn stream_from_reader(mut reader: Box<dyn BufRead>) -> Result<RecordStream, SourceError> {
    let is_array = loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break false;
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                let first = buf[pos];
                reader.consume(pos);
                break first == b'[';
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    };

    if is_array {
        array_stream(reader)
    } else {
        Ok(Box::new(NdjsonStream {
            lines: reader.lines(),
            index: 0,
        }))
    }
}

/// Whole-array documents are parsed in one go with simd-json
fn array_stream(mut reader: Box<dyn BufRead>) -> Result<RecordStream, SourceError> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;

    let values: Vec<Value> = simd_json::serde::from_slice(&mut content)?;
    tracing::debug!(records = values.len(), "Parsed JSON array document");

    Ok(Box::new(
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| into_record(index, value)),
    ))
}

struct NdjsonStream<R> {
    lines: std::io::Lines<R>,
    index: usize,
}

impl<R: BufRead> Iterator for NdjsonStream<R> {
    type Item = Result<Record, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(SourceError::Io(e))),
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let index = self.index;
            self.index += 1;

            return Some(
                serde_json::from_str::<Value>(line)
                    .map_err(|source| SourceError::Parse { index, source })
                    .and_then(|value| into_record(index, value)),
            );
        }
    }
}

fn into_record(index: usize, value: Value) -> Result<Record, SourceError> {
    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(SourceError::NotARecord {
            index,
            found: value_kind(&other),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// In-memory records, handy for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
}

impl MemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        MemorySource { records }
    }
}

impl RecordSource for MemorySource {
    fn sample(&self, n: usize) -> Result<Vec<Record>, SourceError> {
        Ok(self.records.iter().take(n).cloned().collect())
    }

    fn records(self) -> Result<RecordStream, SourceError> {
        Ok(Box::new(self.records.into_iter().map(Ok)))
    }
}
