//! Charge ledger builder
//!
//! Appends one [`ChargeFact`] per filter-state row in source order. A fact that
//! is field-wise identical to an earlier one is reported as a duplicate but is
//! still appended.
//!
//! Duplicate detection uses a hash index over the full fact tuple instead of a
//! scan of the ledger. Floats are keyed by their bit pattern with `-0.0` folded
//! into `0.0`; facts containing `NaN` are never equal to anything, exactly as
//! with `==`, so they are left out of the index.

use super::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::app::models::{ChargeFact, ChargeRow};
use serde::Serialize;
use std::collections::HashSet;

type FactKey = (String, String, u64, u64, u64);

/// Ordered, append-only sequence of charge facts
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ChargeLedger {
    facts: Vec<ChargeFact>,
    #[serde(skip)]
    seen: HashSet<FactKey>,
}

impl ChargeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the fact for `row` and append it
    pub fn ingest(
        &mut self,
        drg_code: &str,
        provider_id: &str,
        row: &ChargeRow,
        row_index: usize,
        log: &mut DiagnosticLog,
    ) {
        if row.total_discharges.is_empty() {
            log.report_row(
                DiagnosticKind::MissingValue,
                row_index,
                format!("Total discharges value is not found on row: {}", row_index),
            );
        }

        let fact = ChargeFact::new(drg_code, provider_id, row);

        if let Some(key) = fact_key(&fact) {
            if !self.seen.insert(key) {
                log.report_row(
                    DiagnosticKind::DuplicateFact,
                    row_index,
                    format!(
                        "Duplicate charge on row {}: DRG {} at provider {}",
                        row_index, fact.drg_code, fact.provider_id
                    ),
                );
            }
        }

        self.facts.push(fact);
    }

    pub fn facts(&self) -> &[ChargeFact] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

fn fact_key(fact: &ChargeFact) -> Option<FactKey> {
    let values = [
        fact.total_discharges,
        fact.avg_covered_charge,
        fact.avg_total_payment,
    ];
    if values.iter().any(|v| v.is_nan()) {
        return None;
    }

    let bits = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
    Some((
        fact.drg_code.clone(),
        fact.provider_id.clone(),
        bits(values[0]),
        bits(values[1]),
        bits(values[2]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charge_row(discharges: &str, covered: &str, paid: &str) -> ChargeRow {
        ChargeRow {
            provider_id: "240010".to_string(),
            state: "MN".to_string(),
            total_discharges: discharges.to_string(),
            avg_covered_charges: covered.to_string(),
            avg_total_payments: paid.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ingest_appends_parsed_fact() {
        let mut ledger = ChargeLedger::new();
        let mut log = DiagnosticLog::new();

        ledger.ingest("039", "240010", &charge_row("51", "$32963.07", "$5777.24"), 1, &mut log);

        assert_eq!(ledger.len(), 1);
        let fact = &ledger.facts()[0];
        assert_eq!(fact.drg_code, "039");
        assert_eq!(fact.total_discharges, 51.0);
        assert_eq!(fact.avg_covered_charge, 32963.07);
        assert_eq!(fact.avg_total_payment, 5777.24);
        assert!(log.is_empty());
    }

    #[test]
    fn test_exact_duplicate_is_reported_once_and_still_appended() {
        let mut ledger = ChargeLedger::new();
        let mut log = DiagnosticLog::new();
        let row = charge_row("51", "$32963.07", "$5777.24");

        ledger.ingest("039", "240010", &row, 1, &mut log);
        assert_eq!(log.count(DiagnosticKind::DuplicateFact), 0);

        ledger.ingest("039", "240010", &row, 2, &mut log);

        assert_eq!(ledger.len(), 2);
        assert_eq!(log.count(DiagnosticKind::DuplicateFact), 1);
        assert_eq!(log.entries()[0].row, Some(2));
    }

    #[test]
    fn test_differing_field_is_not_a_duplicate() {
        let mut ledger = ChargeLedger::new();
        let mut log = DiagnosticLog::new();

        ledger.ingest("039", "240010", &charge_row("51", "100", "50"), 1, &mut log);
        ledger.ingest("039", "240010", &charge_row("52", "100", "50"), 2, &mut log);
        ledger.ingest("057", "240010", &charge_row("51", "100", "50"), 3, &mut log);
        ledger.ingest("039", "240020", &charge_row("51", "100", "50"), 4, &mut log);

        assert_eq!(ledger.len(), 4);
        assert_eq!(log.count(DiagnosticKind::DuplicateFact), 0);
    }

    #[test]
    fn test_missing_discharges_is_reported_and_nan_propagates() {
        let mut ledger = ChargeLedger::new();
        let mut log = DiagnosticLog::new();

        ledger.ingest("039", "240010", &charge_row("", "100", "50"), 3, &mut log);
        ledger.ingest("039", "240010", &charge_row("", "100", "50"), 4, &mut log);

        assert_eq!(ledger.len(), 2);
        assert!(ledger.facts()[0].total_discharges.is_nan());
        assert_eq!(log.count(DiagnosticKind::MissingValue), 2);
        // NaN never compares equal, so these are not duplicates
        assert_eq!(log.count(DiagnosticKind::DuplicateFact), 0);
    }

    #[test]
    fn test_serializes_in_append_order() {
        let mut ledger = ChargeLedger::new();
        let mut log = DiagnosticLog::new();
        ledger.ingest("057", "240010", &charge_row("12", "100", "50"), 1, &mut log);
        ledger.ingest("039", "240010", &charge_row("51", "200", "80"), 2, &mut log);

        let json = serde_json::to_value(&ledger).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["drg"], "057");
        assert_eq!(entries[1]["avgCovChg"], 200.0);
    }
}
