//! JSON artifact writer
//!
//! Each artifact is written to its own file in the output directory. Writes are
//! independent: a failure on one artifact is recorded as a diagnostic and the
//! caller moves on to the next.

use super::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes serializable values as JSON files below one directory
pub struct ArtifactWriter {
    /// Output directory
    output_dir: PathBuf,
    /// Artifacts persisted so far, in write order
    written: Vec<PathBuf>,
}

impl ArtifactWriter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            written: Vec::new(),
        }
    }

    /// Serialize `value` to `<output_dir>/<name>`
    pub fn write<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        debug!("Writing artifact {}", path.display());

        let file = File::create(&path)
            .map_err(|e| Error::artifact_write(name, format!("cannot create file: {}", e)))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer(&mut writer, value)
            .map_err(|e| Error::artifact_write(name, format!("cannot serialize: {}", e)))?;
        writer
            .flush()
            .map_err(|e| Error::artifact_write(name, format!("cannot flush: {}", e)))?;

        info!("Wrote {}", path.display());
        self.written.push(path.clone());
        Ok(path)
    }

    /// Write one artifact, recording a failure in `log` instead of returning it
    pub fn write_or_report<T: Serialize + ?Sized>(
        &mut self,
        name: &str,
        value: &T,
        log: &mut DiagnosticLog,
    ) -> Option<PathBuf> {
        match self.write(name, value) {
            Ok(path) => Some(path),
            Err(e) => {
                log.report(DiagnosticKind::ArtifactWriteFailure, e.to_string());
                None
            }
        }
    }

    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}
