//! Lazy row stream over the charge CSV
//!
//! The reader yields `(row_index, record)` pairs in file order. Index 0 is the
//! header row; the caller decides what to do with it. Headers are not validated
//! against the expected column count, so records are read in flexible mode.

use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Sequential record stream producing one row per `next()` call
pub struct ChargeCsvReader<R: Read> {
    reader: csv::Reader<R>,
    source_name: String,
    next_index: usize,
    finished: bool,
}

impl ChargeCsvReader<File> {
    /// Open a file on disk; failure to open is a fatal stream failure
    pub fn from_path(path: &Path) -> Result<Self> {
        info!("Opening charge file: {}", path.display());

        let file = File::open(path).map_err(|e| {
            Error::stream_failure(
                path.display().to_string(),
                format!("Failed to open input: {}", e),
                None,
            )
        })?;

        Ok(Self::from_reader(file, path.display().to_string()))
    }
}

impl<R: Read> ChargeCsvReader<R> {
    /// Wrap any reader, e.g. an in-memory fixture
    pub fn from_reader(reader: R, source_name: impl Into<String>) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        Self {
            reader,
            source_name: source_name.into(),
            next_index: 0,
            finished: false,
        }
    }

    /// Number of rows yielded so far, header included
    pub fn rows_read(&self) -> usize {
        self.next_index
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

impl<R: Read> Iterator for ChargeCsvReader<R> {
    type Item = Result<(usize, StringRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                let index = self.next_index;
                self.next_index += 1;
                Some(Ok((index, record)))
            }
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(e) => {
                // A read error ends the stream; the run cannot continue past it
                self.finished = true;
                Some(Err(Error::stream_failure(
                    self.source_name.clone(),
                    format!("Read failed after row {}", self.next_index),
                    Some(e),
                )))
            }
        }
    }
}
