//! Field parsing utilities for charge records

/// Parse a numeric charge column
///
/// The CMS file prints money as `$32963.07` and may use thousands separators;
/// both are stripped first. Anything that still fails to parse yields `NaN`,
/// which is carried through statistics and serialized as `null`.
pub fn parse_amount(value: &str) -> f64 {
    let cleaned: String = value
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}
