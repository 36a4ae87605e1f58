//! Storage of gridded fields as record streams
//!
//! A stored file is an ordered stream of [`GridField`] records. [`GridStore`] is the seam
//! between the emission calculation and a gridded-data format: it reads the records of a
//! file and creates fresh streams that records are appended to.
//!
//! [`JsonLinesStore`] keeps one JSON-encoded field per line.

use crate::errors::{GfasError, GfasResult};
use crate::grid::GridField;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends records to a single output stream
pub trait GridWriter {
    /// Append one record to the end of the stream
    fn append(&mut self, field: &GridField) -> GfasResult<()>;

    /// Number of records appended so far
    fn records(&self) -> usize;

    /// Flush buffered records and close the stream
    fn finish(self) -> GfasResult<()>;
}

/// A gridded-data format
pub trait GridStore {
    type Writer: GridWriter;

    /// File extension used for streams of this format
    fn extension(&self) -> &str;

    /// Read every record of a stream, in order
    fn read(&self, path: &Path) -> GfasResult<Vec<GridField>>;

    /// Create (or truncate) a stream ready for appending
    fn create(&self, path: &Path) -> GfasResult<Self::Writer>;

    /// Read the first record of a stream
    fn read_first(&self, path: &Path) -> GfasResult<GridField> {
        self.read(path)?.into_iter().next().ok_or_else(|| {
            GfasError::InputValidation(format!("{} contains no grid records", path.display()))
        })
    }

    /// Write `fields` to a fresh stream at `path`, returning the number of records written
    fn write_stream(&self, path: &Path, fields: &[GridField]) -> GfasResult<usize> {
        let mut writer = self.create(path)?;
        for field in fields {
            writer.append(field)?;
        }
        let records = writer.records();
        writer.finish()?;
        Ok(records)
    }
}

/// Newline-delimited JSON grid records
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesStore;

impl GridStore for JsonLinesStore {
    type Writer = JsonLinesWriter;

    fn extension(&self) -> &str {
        "jsonl"
    }

    fn read(&self, path: &Path) -> GfasResult<Vec<GridField>> {
        let file = File::open(path).map_err(|e| GfasError::io(path, e))?;
        let mut fields = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| GfasError::io(path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let field = serde_json::from_str(&line).map_err(|source| GfasError::Record {
                path: path.to_path_buf(),
                line: i + 1,
                source,
            })?;
            fields.push(field);
        }
        debug!("read {} records from {}", fields.len(), path.display());
        Ok(fields)
    }

    fn create(&self, path: &Path) -> GfasResult<JsonLinesWriter> {
        let file = File::create(path).map_err(|e| GfasError::io(path, e))?;
        Ok(JsonLinesWriter {
            path: path.to_path_buf(),
            inner: BufWriter::new(file),
            records: 0,
        })
    }
}

/// Buffered writer for a JSON-lines stream
///
/// Dropping the writer without calling [`finish`](GridWriter::finish) still flushes,
/// but any flush error is lost.
#[derive(Debug)]
pub struct JsonLinesWriter {
    path: PathBuf,
    inner: BufWriter<File>,
    records: usize,
}

impl GridWriter for JsonLinesWriter {
    fn append(&mut self, field: &GridField) -> GfasResult<()> {
        serde_json::to_writer(&mut self.inner, field)?;
        self.inner
            .write_all(b"\n")
            .map_err(|e| GfasError::io(&self.path, e))?;
        self.records += 1;
        Ok(())
    }

    fn records(&self) -> usize {
        self.records
    }

    fn finish(mut self) -> GfasResult<()> {
        self.inner
            .flush()
            .map_err(|e| GfasError::io(&self.path, e))?;
        debug!("wrote {} records to {}", self.records, self.path.display());
        Ok(())
    }
}
