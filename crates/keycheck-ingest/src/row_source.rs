//! Streaming row source for delimited submission files.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::error::{IngestError, Result};

/// A single data row: 1-based line number plus raw column values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub line_number: u64,
    pub values: Vec<String>,
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Streams data rows from one submission file.
///
/// Line 1 is the header and is consumed on open; the first data row carries
/// line number 2. Cells are trimmed and BOM-stripped. Decoding and framing
/// failures are hard errors, never data-quality findings. One row is held in
/// memory at a time.
#[derive(Debug)]
pub struct RowReader {
    path: PathBuf,
    reader: Reader<File>,
    headers: Vec<String>,
    line: u64,
}

impl RowReader {
    pub fn open(path: &Path, delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)
            .map_err(|source| IngestError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        let mut header_record = StringRecord::new();
        let found = reader
            .read_record(&mut header_record)
            .map_err(|source| IngestError::Malformed {
                path: path.to_path_buf(),
                line: 1,
                source,
            })?;
        let headers = if found {
            header_record.iter().map(normalize_cell).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            headers,
            line: 1,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header column names from line 1.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Reads the next data row, or `None` at end of file. Blank lines are
    /// skipped.
    pub fn next_row(&mut self) -> Option<Result<Row>> {
        let mut record = StringRecord::new();
        loop {
            match self.reader.read_record(&mut record) {
                Ok(false) => return None,
                Ok(true) => {
                    self.line = record
                        .position()
                        .map_or(self.line + 1, |position| position.line());
                    let values: Vec<String> = record.iter().map(normalize_cell).collect();
                    if values.iter().all(String::is_empty) {
                        continue;
                    }
                    return Some(Ok(Row {
                        line_number: self.line,
                        values,
                    }));
                }
                Err(source) => {
                    return Some(Err(IngestError::Malformed {
                        path: self.path.clone(),
                        line: self.line + 1,
                        source,
                    }));
                }
            }
        }
    }
}

impl Iterator for RowReader {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row()
    }
}
