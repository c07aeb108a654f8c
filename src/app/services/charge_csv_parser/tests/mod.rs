//! Test utilities for the charge CSV reader
//!
//! Fixture builders shared by the reader and normalizer tests.

use std::io::Write;
use tempfile::NamedTempFile;


/// Header line of the CMS inpatient charge file
pub const HEADER_LINE: &str = "DRG Definition,Provider Id,Provider Name,Provider Street Address,\
Provider City,Provider State,Provider Zip Code,Hospital Referral Region Description,\
 Total Discharges , Average Covered Charges , Average Total Payments ";

/// Build a data line with the given DRG, provider and state
pub fn data_line(drg: &str, provider_id: &str, state: &str) -> String {
    format!(
        "{drg},{provider_id},TEST HOSPITAL,100 MAIN ST,ROCHESTER,{state},55902,{state} - Rochester,20,$1000.00,$400.00"
    )
}

/// Write a CSV file with the standard header followed by `lines`
pub fn create_test_csv(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "{}", HEADER_LINE).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}
