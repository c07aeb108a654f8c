//! Provider registry builder
//!
//! Keeps one record per provider identifier for the rows of the filter state.
//! The first record seen for an id is retained; a later row with a different
//! street is reported as an address conflict and otherwise ignored. The
//! registry is also the target of geocoding reconciliation, which fills in
//! coordinates once the batch lookup completes.

use super::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::app::models::{ChargeRow, Provider};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;

/// Provider records indexed by provider identifier
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Provider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the provider of `row` and return its identifier
    ///
    /// A row with an empty identifier is reported and not registered.
    pub fn ingest(&mut self, row: &ChargeRow, row_index: usize, log: &mut DiagnosticLog) -> String {
        let candidate = Provider::from_row(row);

        if candidate.id.is_empty() {
            log.report_row(
                DiagnosticKind::MissingValue,
                row_index,
                format!("Provider ID value is not found on row: {}", row_index),
            );
            return candidate.id;
        }

        let id = candidate.id.clone();
        match self.providers.entry(id.clone()) {
            Entry::Vacant(entry) => {
                debug!("Registered provider {}: {}", id, candidate.name);
                entry.insert(candidate);
            }
            Entry::Occupied(entry) => {
                let existing = entry.get();
                if existing.street.to_lowercase() != candidate.street.to_lowercase() {
                    log.report_row(
                        DiagnosticKind::AddressConflict,
                        row_index,
                        format!(
                            "Provider address mismatch on: {} | {} | {}",
                            id, existing.street, candidate.street
                        ),
                    );
                }
            }
        }

        id
    }

    pub fn get(&self, id: &str) -> Option<&Provider> {
        self.providers.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Provider> {
        self.providers.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.providers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Provider> {
        self.providers.values_mut()
    }

    /// Number of providers that have coordinates
    pub fn geocoded_count(&self) -> usize {
        self.providers.values().filter(|p| p.is_geocoded()).count()
    }
}
