//! Tests for statistics aggregation
//!
//! Row fixtures shared by the aggregation and summary test suites.

use crate::app::models::ChargeRow;

mod summary_tests;

/// Row with the given state and charge values
pub fn stat_row(state: &str, discharges: &str, covered: &str, paid: &str) -> ChargeRow {
    ChargeRow {
        drg_definition: "039 - EXTRACRANIAL PROCEDURES W/O CC/MCC".to_string(),
        provider_id: "240010".to_string(),
        state: state.to_string(),
        total_discharges: discharges.to_string(),
        avg_covered_charges: covered.to_string(),
        avg_total_payments: paid.to_string(),
        ..Default::default()
    }
}
