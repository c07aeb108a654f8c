//! Row normalization
//!
//! Every field is trimmed of surrounding whitespace before any builder sees the
//! row. The operation is pure and cannot fail.

use crate::app::models::ChargeRow;
use csv::StringRecord;

/// Trim leading and trailing whitespace from every field, keeping the shape
pub fn normalize_record(record: &StringRecord) -> StringRecord {
    record.iter().map(str::trim).collect()
}

/// Normalize a raw record and map it onto named fields by column position
pub fn normalize_row(record: &StringRecord) -> ChargeRow {
    ChargeRow::from_record(&normalize_record(record))
}
