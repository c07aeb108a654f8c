//! Data models for Medicare charge processing
//!
//! This module contains the record types that flow through the pipeline: the
//! named-field source row, the provider registry entry, the charge fact and the
//! pipeline stage marker.

use crate::app::services::charge_csv_parser::field_parsers::parse_amount;
use crate::constants::columns;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Source Row
// =============================================================================

/// One normalized data row of the source file, addressed by field name
///
/// Populated by column position at the normalizer boundary so nothing downstream
/// indexes the raw record. Missing trailing columns become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChargeRow {
    /// Composite label such as `039 - EXTRACRANIAL PROCEDURES W/O CC/MCC`
    pub drg_definition: String,
    pub provider_id: String,
    pub provider_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Hospital referral region description
    pub referral_region: String,
    pub total_discharges: String,
    pub avg_covered_charges: String,
    pub avg_total_payments: String,
}

impl ChargeRow {
    /// Build a row from an already-trimmed CSV record
    pub fn from_record(record: &StringRecord) -> Self {
        let field = |index: usize| record.get(index).unwrap_or_default().to_string();

        Self {
            drg_definition: field(columns::DRG_DEFINITION),
            provider_id: field(columns::PROVIDER_ID),
            provider_name: field(columns::PROVIDER_NAME),
            street: field(columns::STREET),
            city: field(columns::CITY),
            state: field(columns::STATE),
            zip: field(columns::ZIP),
            referral_region: field(columns::REFERRAL_REGION),
            total_discharges: field(columns::TOTAL_DISCHARGES),
            avg_covered_charges: field(columns::AVG_COVERED_CHARGES),
            avg_total_payments: field(columns::AVG_TOTAL_PAYMENTS),
        }
    }

    /// Whether this row belongs to the given (upper-case) filter state
    pub fn is_in_state(&self, state_filter: &str) -> bool {
        self.state.to_uppercase() == state_filter
    }

    pub fn total_discharges_value(&self) -> f64 {
        parse_amount(&self.total_discharges)
    }

    pub fn avg_covered_charges_value(&self) -> f64 {
        parse_amount(&self.avg_covered_charges)
    }

    pub fn avg_total_payments_value(&self) -> f64 {
        parse_amount(&self.avg_total_payments)
    }
}

// =============================================================================
// Provider
// =============================================================================

/// A hospital in the provider registry
///
/// Serialized with the short field names the front-end reads. Coordinates stay
/// absent until geocoding places the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Hospital referral region description
    pub hrr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Provider {
    /// Candidate record taken from the provider columns of a row
    pub fn from_row(row: &ChargeRow) -> Self {
        Self {
            id: row.provider_id.clone(),
            name: row.provider_name.clone(),
            street: row.street.clone(),
            city: row.city.clone(),
            state: row.state.clone(),
            zip: row.zip.clone(),
            hrr: row.referral_region.clone(),
            lat: None,
            lng: None,
        }
    }

    pub fn set_coordinates(&mut self, lat: f64, lng: f64) {
        self.lat = Some(lat);
        self.lng = Some(lng);
    }

    pub fn is_geocoded(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

// =============================================================================
// Charge Fact
// =============================================================================

/// Charges billed and paid for one DRG at one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeFact {
    #[serde(rename = "drg")]
    pub drg_code: String,
    #[serde(rename = "provider")]
    pub provider_id: String,
    #[serde(rename = "totDischg")]
    pub total_discharges: f64,
    #[serde(rename = "avgCovChg")]
    pub avg_covered_charge: f64,
    #[serde(rename = "avgTotPay")]
    pub avg_total_payment: f64,
}

impl ChargeFact {
    pub fn new(drg_code: &str, provider_id: &str, row: &ChargeRow) -> Self {
        Self {
            drg_code: drg_code.to_string(),
            provider_id: provider_id.to_string(),
            total_discharges: row.total_discharges_value(),
            avg_covered_charge: row.avg_covered_charges_value(),
            avg_total_payment: row.avg_total_payments_value(),
        }
    }
}

// =============================================================================
// Pipeline Stage
// =============================================================================

/// Lifecycle of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Start,
    Streaming,
    Aggregating,
    Reconciling,
    Serializing,
    Done,
    /// Terminal; reached only from `Streaming` on a stream-level read failure
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Start => "start",
            PipelineStage::Streaming => "streaming",
            PipelineStage::Aggregating => "aggregating",
            PipelineStage::Reconciling => "reconciling",
            PipelineStage::Serializing => "serializing",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> StringRecord {
        StringRecord::from(vec![
            "039 - EXTRACRANIAL PROCEDURES W/O CC/MCC",
            "240010",
            "SAINT MARYS HOSPITAL",
            "1216 SECOND STREET SW",
            "ROCHESTER",
            "MN",
            "55902",
            "MN - Rochester",
            "51",
            "$32963.07",
            "$5777.24",
        ])
    }

    #[test]
    fn test_charge_row_from_record() {
        let row = ChargeRow::from_record(&sample_record());

        assert_eq!(row.provider_id, "240010");
        assert_eq!(row.city, "ROCHESTER");
        assert_eq!(row.referral_region, "MN - Rochester");
        assert_eq!(row.total_discharges_value(), 51.0);
        assert_eq!(row.avg_covered_charges_value(), 32963.07);
    }

    #[test]
    fn test_charge_row_short_record_fills_empty() {
        let record = StringRecord::from(vec!["039 - X", "240010"]);
        let row = ChargeRow::from_record(&record);

        assert_eq!(row.provider_id, "240010");
        assert!(row.state.is_empty());
        assert!(row.total_discharges_value().is_nan());
    }

    #[test]
    fn test_is_in_state_ignores_case() {
        let mut row = ChargeRow::from_record(&sample_record());
        assert!(row.is_in_state("MN"));

        row.state = "mn".to_string();
        assert!(row.is_in_state("MN"));

        row.state = "WI".to_string();
        assert!(!row.is_in_state("MN"));
    }

    #[test]
    fn test_provider_serialization_omits_missing_coordinates() {
        let row = ChargeRow::from_record(&sample_record());
        let mut provider = Provider::from_row(&row);

        let json = serde_json::to_value(&provider).unwrap();
        assert_eq!(json["hrr"], "MN - Rochester");
        assert!(json.get("lat").is_none());

        provider.set_coordinates(44.02, -92.48);
        let json = serde_json::to_value(&provider).unwrap();
        assert_eq!(json["lat"], 44.02);
        assert!(provider.is_geocoded());
    }

    #[test]
    fn test_charge_fact_field_names() {
        let row = ChargeRow::from_record(&sample_record());
        let fact = ChargeFact::new("039", "240010", &row);

        let json = serde_json::to_value(&fact).unwrap();
        assert_eq!(json["drg"], "039");
        assert_eq!(json["provider"], "240010");
        assert_eq!(json["totDischg"], 51.0);
        assert_eq!(json["avgTotPay"], 5777.24);
    }
}
