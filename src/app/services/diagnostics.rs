//! Diagnostic collection for data quality problems
//!
//! Inconsistent source data never aborts the row loop. Each problem becomes a
//! [`Diagnostic`] appended to the run's [`DiagnosticLog`], logged at `warn`
//! level as it is recorded, and summarised in the final report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Kinds of non-fatal problems found while processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A required field was empty
    MissingValue,
    /// A DRG label did not match `<digits> - <description>`
    SplitFailure,
    /// A DRG code was seen again with a different description
    DescriptionConflict,
    /// A provider id was seen again with a different street
    AddressConflict,
    /// A charge fact identical to an earlier one was appended
    DuplicateFact,
    /// The geocoder returned no usable location for an address
    GeocodeQualityFailure,
    /// The geocoder returned nothing for a provider
    GeocodeMissing,
    /// One output artifact could not be persisted
    ArtifactWriteFailure,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingValue => "missing_value",
            DiagnosticKind::SplitFailure => "split_failure",
            DiagnosticKind::DescriptionConflict => "description_conflict",
            DiagnosticKind::AddressConflict => "address_conflict",
            DiagnosticKind::DuplicateFact => "duplicate_fact",
            DiagnosticKind::GeocodeQualityFailure => "geocode_quality_failure",
            DiagnosticKind::GeocodeMissing => "geocode_missing",
            DiagnosticKind::ArtifactWriteFailure => "artifact_write_failure",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Source row index, when the problem is tied to a row
    pub row: Option<usize>,
    pub message: String,
    pub detected_at: chrono::DateTime<chrono::Utc>,
}

/// Ordered log of every diagnostic raised during one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem tied to a source row
    pub fn report_row(&mut self, kind: DiagnosticKind, row: usize, message: impl Into<String>) {
        self.push(kind, Some(row), message.into());
    }

    /// Record a problem not tied to any row
    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(kind, None, message.into());
    }

    fn push(&mut self, kind: DiagnosticKind, row: Option<usize>, message: String) {
        match row {
            Some(row) => warn!(kind = %kind, row, "{}", message),
            None => warn!(kind = %kind, "{}", message),
        }

        self.entries.push(Diagnostic {
            kind,
            row,
            message,
            detected_at: chrono::Utc::now(),
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// Counts per kind, in kind order, for reporting
    pub fn counts_by_kind(&self) -> BTreeMap<DiagnosticKind, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }
        counts
    }
}
