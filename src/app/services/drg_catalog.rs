//! DRG catalog builder
//!
//! Splits the composite `"<code> - <description>"` label of every row into a
//! code and a description and keeps one description per code. The first
//! description seen for a code wins; later conflicting ones are reported and
//! never overwrite it.

use super::diagnostics::{DiagnosticKind, DiagnosticLog};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Leading run of digits followed by the literal `" - "` separator
const DRG_LABEL_PATTERN: &str = r"(?s)^([0-9]+) - (.*)$";

/// Registry of DRG code to canonical description
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct DrgCatalog {
    entries: BTreeMap<String, String>,
    #[serde(skip)]
    label_pattern: Regex,
}

impl Default for DrgCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DrgCatalog {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            label_pattern: Regex::new(DRG_LABEL_PATTERN).expect("DRG label pattern is valid"),
        }
    }

    /// Register the DRG named by `label` and return its code for downstream keying
    ///
    /// An empty code is returned when the label cannot be split; nothing is
    /// registered in that case.
    pub fn ingest(&mut self, label: &str, row_index: usize, log: &mut DiagnosticLog) -> String {
        if label.is_empty() {
            log.report_row(
                DiagnosticKind::MissingValue,
                row_index,
                format!("DRG value is not found on row: {}", row_index),
            );
        }

        let (code, description) = self.split_label(label);

        if code.is_empty() || description.is_empty() {
            log.report_row(
                DiagnosticKind::SplitFailure,
                row_index,
                format!("DRG split failure on: '{}'", label),
            );
        }

        if code.is_empty() {
            return code;
        }

        match self.entries.get(&code) {
            None => {
                debug!("Registered DRG {}: {}", code, description);
                self.entries.insert(code.clone(), description);
            }
            Some(existing) if existing.to_lowercase() != description.to_lowercase() => {
                log.report_row(
                    DiagnosticKind::DescriptionConflict,
                    row_index,
                    format!(
                        "DRG Description mismatch on: {} | {} | {}",
                        code, existing, description
                    ),
                );
            }
            Some(_) => {}
        }

        code
    }

    /// Split a label into `(code, trimmed description)`; both empty when it does not match
    pub fn split_label(&self, label: &str) -> (String, String) {
        match self.label_pattern.captures(label) {
            Some(captures) => {
                let code = captures.get(1).map_or("", |m| m.as_str()).trim();
                let description = captures.get(2).map_or("", |m| m.as_str()).trim();
                (code.to_string(), description.to_string())
            }
            None => (String::new(), String::new()),
        }
    }

    pub fn description(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}
