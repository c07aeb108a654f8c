//! CSV reader for the Medicare inpatient charge file
//!
//! This module turns the source file into a lazy, ordered stream of rows and
//! provides the normalization applied to every record before it reaches the
//! builders.
//!
//! ## Architecture
//!
//! - [`reader`] - Lazy row stream over any `Read` source, one record at a time
//! - [`normalizer`] - Whitespace trimming and conversion into a named-field [`ChargeRow`]
//! - [`field_parsers`] - Numeric parsing of the charge columns
//!
//! ## Usage
//!
//! ```rust
//! use charge_processor::app::services::charge_csv_parser::{ChargeCsvReader, normalize_row};
//!
//! # fn example() -> charge_processor::Result<()> {
//! let data = "DRG Definition,Provider Id\n039 - EXTRACRANIAL PROCEDURES W/O CC/MCC , 10001\n";
//! for item in ChargeCsvReader::from_reader(data.as_bytes(), "inline") {
//!     let (index, record) = item?;
//!     if index > 0 {
//!         let row = normalize_row(&record);
//!         assert_eq!(row.provider_id, "10001");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ChargeRow`]: crate::app::models::ChargeRow

pub mod field_parsers;
pub mod normalizer;
pub mod reader;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use normalizer::{normalize_record, normalize_row};
pub use reader::ChargeCsvReader;
